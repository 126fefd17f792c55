//! # Core Types - Squares, Teams, and Pieces
//!
//! ## Overview
//!
//! The engine models the board as an 8×8 grid addressed by [`Square`] values
//! `(file, rank)`, both zero-based. File 0 is the `a` file, rank 0 is White's
//! back rank. A `Square` can temporarily hold an off-board value while a move
//! generator walks an offset or a ray; such values are always rejected by
//! [`crate::board::BoardState::is_on_board`] before any lookup and are never
//! stored on the board.
//!
//! ## Ownership
//!
//! A [`Piece`] is owned by the [`crate::player::ChessPlayer`] of its team. The
//! board only holds a [`crate::board::Placement`], a small copyable record
//! naming the piece id, team and variant. A piece's `available_moves` list is a
//! cache refreshed on every regeneration; it is never authoritative on its own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::BOARD_SIZE;
use crate::error::ChessEngineError;

/// A board coordinate, `file` and `rank` each in `[0, 8)` when on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub file: i8,
    pub rank: i8,
}

impl Square {
    pub const fn new(file: i8, rank: i8) -> Self {
        Self { file, rank }
    }

    /// Square displaced by `(file_delta, rank_delta)`; may land off the board
    #[inline]
    pub const fn offset(self, file_delta: i8, rank_delta: i8) -> Self {
        Self {
            file: self.file + file_delta,
            rank: self.rank + rank_delta,
        }
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.file >= 0 && self.file < BOARD_SIZE && self.rank >= 0 && self.rank < BOARD_SIZE
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "({}, {})", self.file, self.rank);
        }
        write!(f, "{}{}", (b'a' + self.file as u8) as char, self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = ChessEngineError;

    /// Parses algebraic notation such as `"e4"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        let invalid = || ChessEngineError::InvalidNotation {
            notation: s.to_string(),
        };

        if bytes.len() != 2 {
            return Err(invalid());
        }

        let file = bytes[0].to_ascii_lowercase().wrapping_sub(b'a') as i8;
        let rank = bytes[1].wrapping_sub(b'1') as i8;
        let square = Square::new(file, rank);

        if square.is_valid() {
            Ok(square)
        } else {
            Err(invalid())
        }
    }
}

/// One of the two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    White,
    Black,
}

impl Team {
    pub const fn opponent(self) -> Self {
        match self {
            Team::White => Team::Black,
            Team::Black => Team::White,
        }
    }

    /// Rank delta of a pawn advance
    pub const fn forward(self) -> i8 {
        match self {
            Team::White => 1,
            Team::Black => -1,
        }
    }

    /// Rank on which this team's pawns promote
    pub const fn promotion_rank(self) -> i8 {
        match self {
            Team::White => BOARD_SIZE - 1,
            Team::Black => 0,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::White => write!(f, "White"),
            Team::Black => write!(f, "Black"),
        }
    }
}

/// Move-generation rule of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceVariant {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceVariant {
    /// Single-letter symbol, uppercase for White
    pub fn symbol(self, team: Team) -> char {
        let c = match self {
            PieceVariant::Pawn => 'p',
            PieceVariant::Knight => 'n',
            PieceVariant::Bishop => 'b',
            PieceVariant::Rook => 'r',
            PieceVariant::Queen => 'q',
            PieceVariant::King => 'k',
        };
        match team {
            Team::White => c.to_ascii_uppercase(),
            Team::Black => c,
        }
    }
}

/// Stable identity of a piece entity for the lifetime of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A live piece owned by a [`crate::player::ChessPlayer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub variant: PieceVariant,
    pub team: Team,
    pub square: Square,
    pub has_moved: bool,
    /// Pawn only: the piece's most recent move was a two-square advance
    pub double_step: bool,
    /// Pseudo-legal destinations, ignoring the safety of the own king
    pub candidate_moves: Vec<Square>,
    /// Legal destinations, refreshed by every regeneration
    pub available_moves: Vec<Square>,
}

impl Piece {
    pub fn new(id: PieceId, variant: PieceVariant, team: Team, square: Square) -> Self {
        Self {
            id,
            variant,
            team,
            square,
            has_moved: false,
            double_step: false,
            candidate_moves: Vec::new(),
            available_moves: Vec::new(),
        }
    }

    pub fn is_from_same_team(&self, team: Team) -> bool {
        self.team == team
    }

    pub fn can_move_to(&self, square: Square) -> bool {
        self.available_moves.contains(&square)
    }
}
