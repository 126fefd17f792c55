//! Notifications produced by the game state machine
//!
//! Rendering and UI collaborators consume these; they never mutate engine
//! state directly.

use serde::{Deserialize, Serialize};

use crate::game::GameState;
use crate::types::{PieceId, PieceVariant, Square, Team};

/// How a finished game ended
///
/// Checkmate is the only terminal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// The defender's king is attacked and nothing can move it or shield it
    Checkmate { winner: Team },
}

impl GameOutcome {
    pub fn winner(&self) -> Team {
        match self {
            GameOutcome::Checkmate { winner } => *winner,
        }
    }

    pub fn message(&self) -> String {
        match self {
            GameOutcome::Checkmate { winner } => format!("{} wins by checkmate!", winner),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPiece {
    pub id: PieceId,
    pub variant: PieceVariant,
    pub square: Square,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    StateChanged {
        state: GameState,
    },
    Selected {
        piece: PieceId,
        square: Square,
        moves: Vec<Square>,
    },
    Deselected,
    MoveApplied {
        piece: PieceId,
        team: Team,
        from: Square,
        to: Square,
        captured: Option<CapturedPiece>,
    },
    Promoted {
        old: PieceId,
        new: PieceId,
        team: Team,
        square: Square,
    },
    /// `team`'s king is attacked
    Check {
        team: Team,
    },
    TurnChanged {
        active: Team,
    },
    /// `team` is to move, is not in check, and has no legal move; play continues
    NoLegalMoves {
        team: Team,
    },
    GameFinished {
        outcome: GameOutcome,
    },
}

/// One applied move, as kept in the game history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Full-move number; increments after Black moves
    pub move_number: u32,
    pub team: Team,
    pub variant: PieceVariant,
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceVariant>,
    pub is_en_passant: bool,
    pub is_promotion: bool,
    pub is_check: bool,
}
