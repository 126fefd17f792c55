//! Two-player chess rule engine
//!
//! Owns the board, both players' pieces, pseudo-legal move generation, king
//! safety filtering and the turn state machine. Nothing in here knows about
//! rendering or transport; a networked game plugs in through
//! [`game::GameAuthority`].
//!
//! ## Module Organization
//!
//! - `types` - Squares, teams, piece variants and pieces
//! - `board` - The 8×8 occupancy grid
//! - `move_gen` - Candidate moves per piece variant
//! - `legality` - Filtering candidates that would expose the king
//! - `player` - One team's pieces and aggregate move queries
//! - `game` - Selection, move application, check/checkmate, turn order
//! - `events` - Notifications for rendering collaborators
//! - `layout` - Starting positions

pub mod board;
pub mod constants;
pub mod error;
pub mod events;
pub mod game;
pub mod layout;
pub mod legality;
pub mod move_gen;
pub mod player;
pub mod types;

pub use board::BoardState;
pub use error::{ChessEngineError, ChessEngineResult};
pub use events::{GameEvent, GameOutcome, MoveRecord};
pub use game::{GameAuthority, GameState, GameStateMachine, LocalAuthority, MoveRouting};
pub use layout::PlacementInput;
pub use player::ChessPlayer;
pub use types::{Piece, PieceId, PieceVariant, Square, Team};
