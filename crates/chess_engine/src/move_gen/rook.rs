//! Rook move generation
//!
//! Rooks slide along files and ranks until blocked by another piece or the
//! board edge.

use super::sliding;
use crate::board::BoardState;
use crate::constants::ROOK_DIRS;
use crate::types::{Piece, Square};

/// Generate rook moves for `piece`
pub fn generate_rook_moves(piece: &Piece, board: &BoardState, moves: &mut Vec<Square>) {
    sliding::generate_sliding_moves(piece, board, &ROOK_DIRS, moves);
}
