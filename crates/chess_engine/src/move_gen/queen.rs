//! Queen move generation
//!
//! The queen combines rook and bishop movement: eight rays.

use super::sliding;
use crate::board::BoardState;
use crate::constants::QUEEN_DIRS;
use crate::types::{Piece, Square};

/// Generate queen moves for `piece`
pub fn generate_queen_moves(piece: &Piece, board: &BoardState, moves: &mut Vec<Square>) {
    sliding::generate_sliding_moves(piece, board, &QUEEN_DIRS, moves);
}
