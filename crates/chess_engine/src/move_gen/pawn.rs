//! Pawn move generation
//!
//! Handles pawn-specific move generation including:
//! - Single and double forward advances
//! - Diagonal captures
//! - En passant
//!
//! Promotion is a side effect of executing a move onto the last rank and is
//! handled by [`crate::game::GameStateMachine`], not here.
//!
//! ## Pawn Movement Rules
//!
//! - **Advance**: one square toward the opponent; two before the pawn's first
//!   move. Any occupant, friend or foe, blocks the advance.
//! - **Capture**: one square diagonally forward, only onto an opposing piece.
//! - **En passant**: if the pawn on an adjacent file is an opposing pawn that
//!   completed the immediately preceding move with a two-square advance, the
//!   square diagonally forward behind it is a candidate.

use crate::board::BoardState;
use crate::types::{Piece, PieceVariant, Square};

/// Generate pawn moves for `piece`
///
/// # Examples
///
/// ```rust,ignore
/// let mut moves = Vec::new();
/// generate_pawn_moves(&pawn_on_e2, &board, &mut moves);
/// // From the starting position: e3 and e4
/// ```
pub fn generate_pawn_moves(piece: &Piece, board: &BoardState, moves: &mut Vec<Square>) {
    let forward = piece.team.forward();
    let range = if piece.has_moved { 1 } else { 2 };

    for step in 1..=range {
        let next = piece.square.offset(0, forward * step);
        if !board.is_on_board(next) || !board.is_empty(next) {
            break;
        }
        moves.push(next);
    }

    for file_delta in [1, -1] {
        let target = piece.square.offset(file_delta, forward);
        if !board.is_on_board(target) {
            continue;
        }
        if board.team_at(target).is_some_and(|team| team != piece.team) {
            moves.push(target);
        }
    }

    for file_delta in [1, -1] {
        let target = piece.square.offset(file_delta, forward);
        if board.is_on_board(target) && en_passant_victim(piece, board, target).is_some() {
            moves.push(target);
            break;
        }
    }
}

/// Square of the pawn captured en passant if `piece` moves to `to`
///
/// Returns `None` unless `to` is an empty square diagonally forward of the
/// pawn, beside which stands an opposing pawn that was the last piece to move
/// and did so with a two-square advance.
pub fn en_passant_victim(piece: &Piece, board: &BoardState, to: Square) -> Option<Square> {
    if piece.variant != PieceVariant::Pawn {
        return None;
    }

    let file_delta = to.file - piece.square.file;
    let rank_delta = to.rank - piece.square.rank;
    if file_delta.abs() != 1 || rank_delta != piece.team.forward() || !board.is_empty(to) {
        return None;
    }

    let beside = Square::new(to.file, piece.square.rank);
    let victim = board.occupant(beside)?;
    let last = board.last_moved()?;

    let eligible = victim.variant == PieceVariant::Pawn
        && victim.team != piece.team
        && last.id == victim.id
        && last.double_step;

    eligible.then_some(beside)
}
