//! Bishop move generation
//!
//! Bishops slide diagonally until blocked by another piece or the board edge.

use super::sliding;
use crate::board::BoardState;
use crate::constants::BISHOP_DIRS;
use crate::types::{Piece, Square};

/// Generate bishop moves for `piece`
pub fn generate_bishop_moves(piece: &Piece, board: &BoardState, moves: &mut Vec<Square>) {
    sliding::generate_sliding_moves(piece, board, &BISHOP_DIRS, moves);
}
