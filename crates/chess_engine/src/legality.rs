//! King-safety filtering by simulation
//!
//! A candidate move is legal when, after playing it on the board, no opposing
//! piece's pseudo-legal candidate set contains the square of the mover's
//! guarded piece (the king). Because attack sets depend on positions, the
//! check is done by temporary mutation:
//!
//! 1. Remember the captured piece, if any (including an en passant victim)
//! 2. Apply the move to the [`BoardState`]
//! 3. Ask whether any opposing piece still on the board attacks the guarded square
//! 4. Restore the squares from the [`UndoInfo`]
//! 5. Keep the move only if the guarded square was safe
//!
//! Only the two or three affected squares are snapshotted; the board is never
//! copied. Callers hold `&mut BoardState` for the whole simulation, so nothing
//! else can observe the board mid-move.
//!
//! Cost is O(pieces × candidates × opponent pieces × opponent candidates),
//! which is fine at 32 pieces on 64 squares.

use tracing::trace;

use crate::board::{BoardState, Placement};
use crate::move_gen::{candidate_moves, en_passant_victim};
use crate::player::ChessPlayer;
use crate::types::{Piece, PieceId, PieceVariant, Square};

/// Squares touched by a simulated move and what stood on them
#[derive(Debug, Clone, Copy)]
pub struct UndoInfo {
    from: Square,
    to: Square,
    moved: Option<Placement>,
    captured: Option<Placement>,
    en_passant: Option<(Square, Option<Placement>)>,
}

/// Apply `piece` moving to `to`; returns what is needed to revert it
pub fn make_move(board: &mut BoardState, piece: &Piece, to: Square) -> UndoInfo {
    let victim = en_passant_victim(piece, board, to);
    let undo = UndoInfo {
        from: piece.square,
        to,
        moved: board.occupant(piece.square),
        captured: board.occupant(to),
        en_passant: victim.map(|square| (square, board.occupant(square))),
    };

    if let Some(square) = victim {
        board.place(square, None);
    }
    board.place(piece.square, None);
    board.place(to, Some(Placement::of(piece)));

    undo
}

/// Revert a move made by [`make_move`]
pub fn unmake_move(board: &mut BoardState, undo: UndoInfo) {
    board.place(undo.to, undo.captured);
    board.place(undo.from, undo.moved);
    if let Some((square, placement)) = undo.en_passant {
        board.place(square, placement);
    }
}

/// Whether any of `attacker`'s pieces still on the board can reach `target`
///
/// Pieces whose square no longer holds them (captured during a simulation)
/// are skipped.
pub fn is_attacked_by(board: &BoardState, target: Square, attacker: &ChessPlayer) -> bool {
    attacker
        .pieces()
        .iter()
        .filter(|p| board.occupant(p.square).map(|o| o.id) == Some(p.id))
        .any(|p| candidate_moves(p, board).contains(&target))
}

/// Whether moving `piece` to `to` leaves `guarded` unattacked by `opponent`
///
/// `guarded` names the protected piece and its current square; when the
/// protected piece is the mover itself, its destination is checked instead.
pub fn is_move_safe(
    board: &mut BoardState,
    piece: &Piece,
    to: Square,
    guarded: Option<(PieceId, Square)>,
    opponent: &ChessPlayer,
) -> bool {
    let Some((guarded_id, guarded_square)) = guarded else {
        return true;
    };
    let target = if piece.id == guarded_id { to } else { guarded_square };

    let undo = make_move(board, piece, to);
    let attacked = is_attacked_by(board, target, opponent);
    unmake_move(board, undo);

    !attacked
}

/// Keep only the candidates of `piece` that leave `guarded` safe
pub fn filter_moves(
    board: &mut BoardState,
    piece: &Piece,
    candidates: &[Square],
    guarded: Option<(PieceId, Square)>,
    opponent: &ChessPlayer,
) -> Vec<Square> {
    let legal: Vec<Square> = candidates
        .iter()
        .copied()
        .filter(|&to| is_move_safe(board, piece, to, guarded, opponent))
        .collect();

    if legal.len() != candidates.len() {
        trace!(
            "[LEGALITY] {:?} {} on {}: {} of {} candidates expose the king",
            piece.team,
            piece.id,
            piece.square,
            candidates.len() - legal.len(),
            candidates.len()
        );
    }

    legal
}

/// Whether some piece of `player` other than its `target` piece has a move
/// after which `target` is no longer attacked by `opponent`
///
/// Answers whether a checked king can be shielded by a blocking or capturing
/// move from another piece, not only by moving itself.
pub fn can_remove_attack(
    board: &mut BoardState,
    player: &ChessPlayer,
    target: PieceVariant,
    opponent: &ChessPlayer,
) -> bool {
    let Some(guarded) = player.first_of(target).map(|p| (p.id, p.square)) else {
        return false;
    };

    player
        .pieces()
        .iter()
        .filter(|p| p.id != guarded.0)
        .any(|p| {
            candidate_moves(p, board)
                .into_iter()
                .any(|to| is_move_safe(board, p, to, Some(guarded), opponent))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Team;

    fn setup(pieces: &[(PieceVariant, Team, &str)]) -> (BoardState, ChessPlayer, ChessPlayer) {
        let mut board = BoardState::new();
        let mut white = ChessPlayer::new(Team::White);
        let mut black = ChessPlayer::new(Team::Black);
        for (i, &(variant, team, square)) in pieces.iter().enumerate() {
            let square: Square = square.parse().unwrap();
            let piece = Piece::new(PieceId(i as u32), variant, team, square);
            board.place(square, Some(Placement::of(&piece)));
            match team {
                Team::White => white.add_piece(piece),
                Team::Black => black.add_piece(piece),
            }
        }
        (board, white, black)
    }

    #[test]
    fn test_make_unmake_restores_board() {
        let (mut board, white, _) = setup(&[
            (PieceVariant::Rook, Team::White, "a1"),
            (PieceVariant::Knight, Team::Black, "a8"),
        ]);
        let before = board.clone();
        let rook = &white.pieces()[0];

        let undo = make_move(&mut board, rook, "a8".parse().unwrap());
        assert_eq!(board.occupant("a8".parse().unwrap()).map(|p| p.id), Some(rook.id));
        unmake_move(&mut board, undo);

        assert_eq!(board, before);
    }

    #[test]
    fn test_pinned_piece_cannot_leave_line() {
        //! A bishop pinned against its king by a rook may only move along
        //! the pin, and a bishop cannot, so it has no legal moves
        let (mut board, white, black) = setup(&[
            (PieceVariant::King, Team::White, "e1"),
            (PieceVariant::Bishop, Team::White, "e2"),
            (PieceVariant::Rook, Team::Black, "e8"),
        ]);
        let king = white.first_of(PieceVariant::King).map(|k| (k.id, k.square));
        let bishop = &white.pieces()[1];
        let candidates = candidate_moves(bishop, &board);
        assert!(!candidates.is_empty());

        let legal = filter_moves(&mut board, bishop, &candidates, king, &black);
        assert!(legal.is_empty(), "pinned bishop should have no legal moves");
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let (mut board, white, black) = setup(&[
            (PieceVariant::King, Team::White, "e1"),
            (PieceVariant::Rook, Team::Black, "d8"),
        ]);
        let king_piece = &white.pieces()[0];
        let guarded = Some((king_piece.id, king_piece.square));
        let candidates = candidate_moves(king_piece, &board);

        let legal = filter_moves(&mut board, king_piece, &candidates, guarded, &black);
        assert!(!legal.contains(&"d1".parse().unwrap()));
        assert!(!legal.contains(&"d2".parse().unwrap()));
        assert!(legal.contains(&"f1".parse().unwrap()));
    }

    #[test]
    fn test_capturing_the_checker_removes_attack() {
        let (mut board, white, black) = setup(&[
            (PieceVariant::King, Team::White, "h1"),
            (PieceVariant::Pawn, Team::White, "g2"),
            (PieceVariant::Pawn, Team::White, "h2"),
            (PieceVariant::Rook, Team::White, "a8"),
            (PieceVariant::Rook, Team::Black, "b1"),
        ]);
        // Back-rank check, rook on a8 cannot reach b1 but nothing else helps
        assert!(is_attacked_by(&board, "h1".parse().unwrap(), &black));
        assert!(!can_remove_attack(&mut board, &white, PieceVariant::King, &black));

        let (mut board, white, black) = setup(&[
            (PieceVariant::King, Team::White, "h1"),
            (PieceVariant::Pawn, Team::White, "g2"),
            (PieceVariant::Pawn, Team::White, "h2"),
            (PieceVariant::Rook, Team::White, "b8"),
            (PieceVariant::Rook, Team::Black, "b1"),
        ]);
        assert!(can_remove_attack(&mut board, &white, PieceVariant::King, &black));
    }

    #[test]
    fn test_interposing_piece_removes_attack() {
        let (mut board, white, black) = setup(&[
            (PieceVariant::King, Team::White, "e1"),
            (PieceVariant::Knight, Team::White, "c3"),
            (PieceVariant::Rook, Team::Black, "e8"),
        ]);
        assert!(can_remove_attack(&mut board, &white, PieceVariant::King, &black));
    }
}
