use chess_engine::{Square, Team};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProtocolError;

/// A session accepts at most this many participants
pub const MAX_PARTICIPANTS: usize = 2;

/// Identity of one connected participant
pub type ParticipantId = Uuid;

/// Matchmaking tag; participants are only paired with the same level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillLevel::Beginner => write!(f, "beginner"),
            SkillLevel::Intermediate => write!(f, "intermediate"),
            SkillLevel::Advanced => write!(f, "advanced"),
        }
    }
}

impl std::str::FromStr for SkillLevel {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(SkillLevel::Beginner),
            "intermediate" => Ok(SkillLevel::Intermediate),
            "advanced" => Ok(SkillLevel::Advanced),
            _ => Err(ProtocolError::UnknownSkillLevel(s.to_string())),
        }
    }
}

/// Lobby-related messages for matchmaking and team negotiation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum LobbyMessage {
    // Client → Server
    JoinRandom { level: SkillLevel },
    ClaimTeam { team: Team },
    Leave,

    // Server → Client
    JoinedSession {
        code: String,
        level: SkillLevel,
        participant: ParticipantId,
        participants: usize,
    },
    ParticipantJoined { participant: ParticipantId },
    ParticipantLeft { participant: ParticipantId },
    /// Reply to the requester only; the claim was not recorded
    TeamUnavailable { team: Team },
    Error { message: String },
}

/// In-game messages
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum GameMessage {
    // Client → Server
    SubmitMove { from: Square, to: Square },
    /// Integer state code as produced by `GameState::code`
    SetGameState { state: u8 },

    // Server → Client (Broadcast)
    Event(SessionEvent),
}

/// One entry of a session's ordered event log
///
/// `seq` starts at 0 for every session and increases by one per entry; all
/// participants receive the same entries with the same numbers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionEvent {
    pub seq: u64,
    pub sender: ParticipantId,
    pub kind: SessionEventKind,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEventKind {
    StateTransition { state: u8 },
    TeamClaimed { team: Team },
    /// The claimant left before play; the team may be claimed again
    TeamReleased { team: Team },
    MoveMade { from: Square, to: Square },
}

/// Frame exchanged between a participant and the session server
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum NetMessage {
    Lobby(LobbyMessage),
    Game(GameMessage),
}

impl From<LobbyMessage> for NetMessage {
    fn from(msg: LobbyMessage) -> Self {
        NetMessage::Lobby(msg)
    }
}

impl From<GameMessage> for NetMessage {
    fn from(msg: GameMessage) -> Self {
        NetMessage::Game(msg)
    }
}

/// Connectivity as shown to the UI layer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Searching { level: SkillLevel },
    Connected { code: String },
    /// Matchmaking or the connection failed; the caller decides whether to retry
    Failed { reason: String },
}

pub fn encode(msg: &NetMessage) -> Result<Vec<u8>, ProtocolError> {
    Ok(bincode::serialize(msg)?)
}

pub fn decode(bytes: &[u8]) -> Result<NetMessage, ProtocolError> {
    Ok(bincode::deserialize(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_lobby_message_join_random_serialization() {
        let msg = LobbyMessage::JoinRandom {
            level: SkillLevel::Advanced,
        };
        let bytes = bincode::serialize(&msg).expect("Should serialize");
        let decoded: LobbyMessage = bincode::deserialize(&bytes).expect("Should deserialize");

        match decoded {
            LobbyMessage::JoinRandom { level } => assert_eq!(level, SkillLevel::Advanced),
            _ => panic!("Wrong message type after deserialization"),
        }
    }

    #[test]
    fn test_lobby_message_claim_team() {
        let msg = LobbyMessage::ClaimTeam { team: Team::Black };
        let bytes = bincode::serialize(&msg).expect("Should serialize");
        let decoded: LobbyMessage = bincode::deserialize(&bytes).expect("Should deserialize");
        assert_eq!(decoded, LobbyMessage::ClaimTeam { team: Team::Black });
    }

    #[test]
    fn test_game_message_submit_move() {
        let msg = GameMessage::SubmitMove {
            from: sq("e2"),
            to: sq("e4"),
        };
        let bytes = bincode::serialize(&msg).expect("Should serialize");
        let decoded: GameMessage = bincode::deserialize(&bytes).expect("Should deserialize");

        match decoded {
            GameMessage::SubmitMove { from, to } => {
                assert_eq!(from, sq("e2"));
                assert_eq!(to, sq("e4"));
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_session_event_through_frame_codec() {
        let event = SessionEvent {
            seq: 7,
            sender: Uuid::new_v4(),
            kind: SessionEventKind::StateTransition { state: 1 },
        };
        let frame = NetMessage::from(GameMessage::Event(event.clone()));

        let bytes = encode(&frame).expect("Should encode");
        let decoded = decode(&bytes).expect("Should decode");

        assert_eq!(decoded, NetMessage::Game(GameMessage::Event(event)));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode(&[0xff, 0xff, 0xff, 0xff, 0x01]).unwrap_err();
        assert!(matches!(err, ProtocolError::Codec(_)));
    }

    #[test]
    fn test_skill_level_parsing() {
        assert_eq!("Beginner".parse::<SkillLevel>().unwrap(), SkillLevel::Beginner);
        assert_eq!(SkillLevel::Advanced.to_string(), "advanced");
        assert!("grandmaster".parse::<SkillLevel>().is_err());
    }
}
