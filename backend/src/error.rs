use chess_engine::{ChessEngineError, GameState, Team};
use shared::protocol::ParticipantId;
use shared::ProtocolError;
use thiserror::Error;

/// Rejections inside one session
///
/// None of these end the session; the server logs them and, for team
/// conflicts, tells the requester.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session is full")]
    SessionFull,

    #[error("Participant {0} is not in this session")]
    NotAParticipant(ParticipantId),

    #[error("{team} is already claimed")]
    TeamUnavailable { team: Team },

    #[error("Participant already plays {team}")]
    AlreadyAssigned { team: Team },

    #[error("Unknown state code {0}")]
    InvalidStateCode(u8),

    #[error("State transition {from:?} -> {to:?} rejected")]
    TransitionRejected { from: GameState, to: GameState },

    #[error("Both teams must be claimed before play")]
    TeamsNotClaimed,

    #[error("Game is not over")]
    GameNotOver,

    #[error("Not your turn, {active} to move")]
    NotYourTurn { active: Team },

    #[error("Move rejected: {0}")]
    Move(#[from] ChessEngineError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LobbyError {
    #[error("Participant {0} is already in a session")]
    AlreadyInSession(ParticipantId),

    #[error("Participant {0} is not in a session")]
    NotInSession(ParticipantId),

    #[error("Session server is not running")]
    ServerClosed,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Failure on a participant's connection to the session server
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Connection closed")]
    Closed,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

pub type SessionResult<T> = Result<T, SessionError>;
pub type LobbyResult<T> = Result<T, LobbyError>;
