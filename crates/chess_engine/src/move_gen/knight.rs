//! Knight move generation
//!
//! Knights jump in an L-shape: two squares in one direction, then one square
//! perpendicular. They ignore pieces in between and may land on any on-board
//! square not held by a friendly piece.

use super::generate_offset_moves;
use crate::board::BoardState;
use crate::constants::KNIGHT_OFFSETS;
use crate::types::{Piece, Square};

/// Generate knight moves for `piece`
///
/// # Examples
///
/// ```rust,ignore
/// let mut moves = Vec::new();
/// generate_knight_moves(&knight_on_g1, &board, &mut moves);
/// // From the starting position: f3 and h3
/// ```
pub fn generate_knight_moves(piece: &Piece, board: &BoardState, moves: &mut Vec<Square>) {
    generate_offset_moves(piece, board, &KNIGHT_OFFSETS, moves);
}
