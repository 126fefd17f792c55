//! One team's live pieces
//!
//! [`ChessPlayer`] owns the [`Piece`] entities of its team and aggregates
//! move generation and legality filtering across them.

use tracing::debug;

use crate::board::BoardState;
use crate::legality;
use crate::move_gen::candidate_moves;
use crate::types::{Piece, PieceId, PieceVariant, Team};

#[derive(Debug, Clone)]
pub struct ChessPlayer {
    team: Team,
    pieces: Vec<Piece>,
}

impl ChessPlayer {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            pieces: Vec::new(),
        }
    }

    pub fn team(&self) -> Team {
        self.team
    }

    /// Owned pieces in creation order
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|p| p.id == id)
    }

    /// First owned piece of `variant`
    pub fn first_of(&self, variant: PieceVariant) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.variant == variant)
    }

    pub fn add_piece(&mut self, piece: Piece) {
        debug_assert_eq!(piece.team, self.team);
        self.pieces.push(piece);
    }

    /// Remove and destroy the piece `id`; returns it for reporting
    pub fn remove_piece(&mut self, id: PieceId) -> Option<Piece> {
        let index = self.pieces.iter().position(|p| p.id == id)?;
        Some(self.pieces.remove(index))
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
    }

    /// Regenerate every owned piece's candidate and legal move lists
    ///
    /// Must be called for both teams after every applied move: a move can
    /// change either side's king safety and either side's captures.
    pub fn generate_all_moves(&mut self, board: &mut BoardState, opponent: &ChessPlayer) {
        let guarded = self
            .first_of(PieceVariant::King)
            .map(|king| (king.id, king.square));

        for piece in self.pieces.iter_mut() {
            let candidates = candidate_moves(piece, board);
            let legal = legality::filter_moves(board, piece, &candidates, guarded, opponent);
            piece.candidate_moves = candidates;
            piece.available_moves = legal;
        }

        debug!(
            "[GAME] {} has {} legal moves",
            self.team,
            self.legal_move_count()
        );
    }

    /// Pieces attacking an opposing piece of `variant`
    ///
    /// Uses the pseudo-legal candidate sets, so a piece pinned to its own king
    /// still counts as giving check.
    pub fn pieces_attacking(&self, variant: PieceVariant, board: &BoardState) -> Vec<PieceId> {
        self.pieces
            .iter()
            .filter(|p| {
                p.candidate_moves.iter().any(|&square| {
                    board
                        .occupant(square)
                        .is_some_and(|o| o.team != self.team && o.variant == variant)
                })
            })
            .map(|p| p.id)
            .collect()
    }

    /// Whether another piece can block or capture an attack on our `variant`
    pub fn can_shield(
        &self,
        variant: PieceVariant,
        board: &mut BoardState,
        opponent: &ChessPlayer,
    ) -> bool {
        legality::can_remove_attack(board, self, variant, opponent)
    }

    pub fn legal_move_count(&self) -> usize {
        self.pieces.iter().map(|p| p.available_moves.len()).sum()
    }

    pub fn has_legal_moves(&self) -> bool {
        self.pieces.iter().any(|p| !p.available_moves.is_empty())
    }
}
