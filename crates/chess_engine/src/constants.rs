//! Board dimensions and movement offsets
//!
//! Offsets are `(file_delta, rank_delta)` pairs.

use crate::types::PieceVariant;

/// Number of files and ranks
pub const BOARD_SIZE: i8 = 8;

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

pub const QUEEN_DIRS: [(i8, i8); 8] = KING_OFFSETS;

/// Back-rank order from the `a` file to the `h` file
pub const BACK_RANK: [PieceVariant; 8] = [
    PieceVariant::Rook,
    PieceVariant::Knight,
    PieceVariant::Bishop,
    PieceVariant::Queen,
    PieceVariant::King,
    PieceVariant::Bishop,
    PieceVariant::Knight,
    PieceVariant::Rook,
];
