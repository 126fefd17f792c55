//! Board occupancy and coordinate arithmetic
//!
//! [`BoardState`] knows nothing about chess rules. It maps each square to at
//! most one [`Placement`] and remembers which piece completed the most recent
//! move, which the pawn generator needs for en passant.

use std::fmt;

use crate::constants::BOARD_SIZE;
use crate::types::{Piece, PieceId, PieceVariant, Square, Team};

/// Non-owning reference to the piece standing on a square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub id: PieceId,
    pub team: Team,
    pub variant: PieceVariant,
}

impl Placement {
    pub fn of(piece: &Piece) -> Self {
        Self {
            id: piece.id,
            team: piece.team,
            variant: piece.variant,
        }
    }
}

/// The piece that completed the most recent move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMoved {
    pub id: PieceId,
    /// That move was a pawn's two-square advance
    pub double_step: bool,
}

/// The 8×8 occupancy grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    grid: [[Option<Placement>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
    last_moved: Option<LastMoved>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Range check used by every move generator before any lookup
    #[inline]
    pub fn is_on_board(&self, square: Square) -> bool {
        square.is_valid()
    }

    /// Occupant of `square`; `None` for empty and off-board squares alike
    #[inline]
    pub fn occupant(&self, square: Square) -> Option<Placement> {
        if !self.is_on_board(square) {
            return None;
        }
        self.grid[square.file as usize][square.rank as usize]
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.occupant(square).is_none()
    }

    /// Team of the occupant of `square`, if any
    pub fn team_at(&self, square: Square) -> Option<Team> {
        self.occupant(square).map(|p| p.team)
    }

    /// Unconditionally overwrites one square; off-board squares are ignored
    pub fn place(&mut self, square: Square, placement: Option<Placement>) {
        if self.is_on_board(square) {
            self.grid[square.file as usize][square.rank as usize] = placement;
        }
    }

    pub fn last_moved(&self) -> Option<LastMoved> {
        self.last_moved
    }

    pub fn set_last_moved(&mut self, last_moved: Option<LastMoved>) {
        self.last_moved = last_moved;
    }

    /// Square currently holding the piece `id`
    pub fn find(&self, id: PieceId) -> Option<Square> {
        self.occupied().find(|(_, p)| p.id == id).map(|(sq, _)| sq)
    }

    /// All non-empty squares, file-major
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Placement)> + '_ {
        (0..BOARD_SIZE).flat_map(move |file| {
            (0..BOARD_SIZE).filter_map(move |rank| {
                let square = Square::new(file, rank);
                self.occupant(square).map(|p| (square, p))
            })
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for BoardState {
    /// Text diagram with rank 8 on top
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..BOARD_SIZE).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..BOARD_SIZE {
                let c = self
                    .occupant(Square::new(file, rank))
                    .map(|p| p.variant.symbol(p.team))
                    .unwrap_or('.');
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(id: u32, team: Team, variant: PieceVariant) -> Placement {
        Placement {
            id: PieceId(id),
            team,
            variant,
        }
    }

    #[test]
    fn test_occupant_fails_closed_off_board() {
        let board = BoardState::new();
        assert_eq!(board.occupant(Square::new(-1, 0)), None);
        assert_eq!(board.occupant(Square::new(0, 8)), None);
        assert!(!board.is_on_board(Square::new(8, 3)));
        assert!(board.is_on_board(Square::new(7, 7)));
    }

    #[test]
    fn test_place_overwrites_and_vacates() {
        let mut board = BoardState::new();
        let e4 = Square::new(4, 3);
        board.place(e4, Some(placement(1, Team::White, PieceVariant::Pawn)));
        assert_eq!(board.team_at(e4), Some(Team::White));

        board.place(e4, Some(placement(2, Team::Black, PieceVariant::Knight)));
        assert_eq!(board.occupant(e4).map(|p| p.id), Some(PieceId(2)));

        board.place(e4, None);
        assert!(board.is_empty(e4));
    }

    #[test]
    fn test_place_off_board_is_ignored() {
        let mut board = BoardState::new();
        board.place(Square::new(9, 9), Some(placement(1, Team::White, PieceVariant::King)));
        assert_eq!(board.occupied().count(), 0);
    }

    #[test]
    fn test_find_and_last_moved() {
        let mut board = BoardState::new();
        let d5 = Square::new(3, 4);
        board.place(d5, Some(placement(7, Team::Black, PieceVariant::Pawn)));
        board.set_last_moved(Some(LastMoved {
            id: PieceId(7),
            double_step: true,
        }));

        assert_eq!(board.find(PieceId(7)), Some(d5));
        assert_eq!(board.find(PieceId(8)), None);
        assert!(board.last_moved().is_some_and(|m| m.double_step));

        board.clear();
        assert_eq!(board.last_moved(), None);
    }
}
