//! Initial piece layouts
//!
//! A layout is a plain list of `(square, team, variant)` records handed to
//! [`crate::game::GameStateMachine::start_new_game`]. Tests and puzzles build
//! their own; [`standard`] gives the usual starting position.

use serde::{Deserialize, Serialize};

use crate::constants::{BACK_RANK, BOARD_SIZE};
use crate::types::{PieceVariant, Square, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementInput {
    pub square: Square,
    pub team: Team,
    pub variant: PieceVariant,
}

impl PlacementInput {
    pub const fn new(square: Square, team: Team, variant: PieceVariant) -> Self {
        Self {
            square,
            team,
            variant,
        }
    }
}

/// The standard 32-piece starting position
pub fn standard() -> Vec<PlacementInput> {
    let mut layout = Vec::with_capacity(32);

    for (team, back, pawns) in [(Team::White, 0, 1), (Team::Black, 7, 6)] {
        for file in 0..BOARD_SIZE {
            layout.push(PlacementInput::new(
                Square::new(file, back),
                team,
                BACK_RANK[file as usize],
            ));
            layout.push(PlacementInput::new(
                Square::new(file, pawns),
                team,
                PieceVariant::Pawn,
            ));
        }
    }

    layout
}
