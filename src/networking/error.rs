use backend::{LinkError, LobbyError};
use chess_engine::Team;
use shared::protocol::ConnectionStatus;
use thiserror::Error;

/// Connectivity and session failures on the participant side
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Timed out after {secs}s waiting for the session")]
    Timeout { secs: u64 },

    #[error("Connection to the session server was closed")]
    Closed,

    #[error("Session server refused the request: {message}")]
    Refused { message: String },

    #[error("{team} is already taken")]
    TeamUnavailable { team: Team },

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

impl NetworkError {
    /// Status value to show in place of a connected session
    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus::Failed {
            reason: self.to_string(),
        }
    }
}
