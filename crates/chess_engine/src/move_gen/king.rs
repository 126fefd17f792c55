//! King move generation
//!
//! Kings move one square in any direction. Whether the destination is attacked
//! is not considered here; the legality filter removes such squares.
//!
//! Castling is not part of this engine's rule set.

use super::generate_offset_moves;
use crate::board::BoardState;
use crate::constants::KING_OFFSETS;
use crate::types::{Piece, Square};

/// Generate king moves for `piece`
pub fn generate_king_moves(piece: &Piece, board: &BoardState, moves: &mut Vec<Square>) {
    generate_offset_moves(piece, board, &KING_OFFSETS, moves);
}
