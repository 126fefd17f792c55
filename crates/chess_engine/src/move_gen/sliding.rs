//! Sliding piece move generation
//!
//! Common ray casting for bishops, rooks and queens.
//!
//! ## Algorithm
//!
//! For each direction the ray steps one square at a time:
//! 1. Stop at the board edge
//! 2. Empty square: candidate, keep going
//! 3. Opponent piece: candidate (capture), then stop
//! 4. Own piece: stop without adding it

use crate::board::BoardState;
use crate::types::{Piece, Square};

/// Cast one ray per direction from `piece`'s square
pub fn generate_sliding_moves(
    piece: &Piece,
    board: &BoardState,
    directions: &[(i8, i8)],
    moves: &mut Vec<Square>,
) {
    for &(file_delta, rank_delta) in directions {
        let mut current = piece.square.offset(file_delta, rank_delta);

        while board.is_on_board(current) {
            match board.occupant(current) {
                None => moves.push(current),
                Some(occupant) => {
                    if occupant.team != piece.team {
                        moves.push(current);
                    }
                    break;
                }
            }
            current = current.offset(file_delta, rank_delta);
        }
    }
}
