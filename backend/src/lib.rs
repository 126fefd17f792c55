//! Session server for networked chess games
//!
//! Matches participants by skill level, arbitrates team claims and keeps one
//! ordered event log per session so every participant applies the same state
//! transitions and moves in the same order.

pub mod error;
pub mod lobby;
pub mod server;
pub mod session;

pub use error::{LinkError, LobbyError, SessionError};
pub use server::{spawn, ClientLink, Hub, ServerHandle};
