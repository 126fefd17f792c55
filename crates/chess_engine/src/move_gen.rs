//! Pseudo-legal move generation
//!
//! [`candidate_moves`] is a pure function from a piece and the board to the
//! piece's candidate destinations. It ignores whether a move would expose the
//! mover's own king; [`crate::legality`] removes those afterwards.
//!
//! Every generator treats "on the board" as the first filter for each
//! candidate, so no lookup ever indexes past the grid.

pub mod bishop;
pub mod king;
pub mod knight;
pub mod pawn;
pub mod queen;
pub mod rook;
pub mod sliding;

pub use pawn::en_passant_victim;

use crate::board::BoardState;
use crate::types::{Piece, PieceVariant, Square};

/// Candidate destinations for `piece`, dispatched on its variant
pub fn candidate_moves(piece: &Piece, board: &BoardState) -> Vec<Square> {
    let mut moves = Vec::new();

    match piece.variant {
        PieceVariant::Pawn => pawn::generate_pawn_moves(piece, board, &mut moves),
        PieceVariant::Knight => knight::generate_knight_moves(piece, board, &mut moves),
        PieceVariant::Bishop => bishop::generate_bishop_moves(piece, board, &mut moves),
        PieceVariant::Rook => rook::generate_rook_moves(piece, board, &mut moves),
        PieceVariant::Queen => queen::generate_queen_moves(piece, board, &mut moves),
        PieceVariant::King => king::generate_king_moves(piece, board, &mut moves),
    }

    moves
}

/// Fixed-offset generation shared by knights and kings
///
/// Each offset is a candidate if it stays on the board and is not occupied by
/// a friendly piece.
pub(crate) fn generate_offset_moves(
    piece: &Piece,
    board: &BoardState,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Square>,
) {
    for &(file_delta, rank_delta) in offsets {
        let target = piece.square.offset(file_delta, rank_delta);
        if !board.is_on_board(target) {
            continue;
        }
        if board.team_at(target) != Some(piece.team) {
            moves.push(target);
        }
    }
}
