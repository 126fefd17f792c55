//! Error types for chess engine
//!
//! Rule violations are typed here so callers and logs can name the reason, but
//! the public move entry points of [`crate::game::GameStateMachine`] turn every
//! one of them into a silent no-op.

use thiserror::Error;

use crate::game::GameState;
use crate::types::{PieceId, Square, Team};

/// Errors that can occur in the chess engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessEngineError {
    /// Square outside the 8×8 board
    #[error("Invalid square: {square}")]
    InvalidSquare { square: Square },

    /// Unparseable algebraic square
    #[error("Invalid square notation: {notation:?}")]
    InvalidNotation { notation: String },

    /// No piece at source square
    #[error("No piece at square {square}")]
    NoPieceAtSquare { square: Square },

    /// Piece id not owned by any player
    #[error("Unknown piece {id}")]
    UnknownPiece { id: PieceId },

    /// Piece does not belong to the team whose turn it is
    #[error("Piece at {square} does not belong to {team}")]
    WrongTeam { square: Square, team: Team },

    /// Destination is not among the piece's legal moves
    #[error("Illegal move: {from} to {to}")]
    IllegalMove { from: Square, to: Square },

    /// Moves are accepted only while playing
    #[error("Game is not in progress (state {state:?})")]
    GameNotInProgress { state: GameState },

    /// The authority refused the move for the local participant
    #[error("Not the local participant's turn ({active} to move)")]
    NotYourTurn { active: Team },
}

/// Result type alias for chess engine operations
pub type ChessEngineResult<T> = Result<T, ChessEngineError>;
