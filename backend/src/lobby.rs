//! Matchmaking by skill level
//!
//! A participant asking to join at some level is placed into the oldest open
//! session advertising that level; if there is none, a new session is created
//! for it. Sessions are identified by a random six-letter room code.

use std::collections::HashMap;

use shared::protocol::{ParticipantId, SessionEvent, SkillLevel};
use tracing::{debug, info};

use crate::error::{LobbyError, LobbyResult};
use crate::session::GameSession;

/// Result of a successful matchmaking request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub code: String,
    /// True when the session was created for this request
    pub created: bool,
    /// Everyone in the session, including the joiner
    pub participants: Vec<ParticipantId>,
}

/// Result of removing a participant from its session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub code: String,
    /// Participants still in the session
    pub remaining: Vec<ParticipantId>,
    /// Log entries for team claims the departure freed
    pub released: Vec<SessionEvent>,
}

#[derive(Default)]
pub struct Lobby {
    sessions: HashMap<String, GameSession>,
    /// Room codes in creation order, used to prefer older sessions
    order: Vec<String>,
    membership: HashMap<ParticipantId, String>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_code(&self) -> String {
        use rand::Rng;
        let mut rng = rand::rng();
        loop {
            let code: String = (0..6)
                .map(|_| rng.random_range(b'A'..=b'Z') as char)
                .collect();
            if !self.sessions.contains_key(&code) {
                return code;
            }
        }
    }

    pub fn session(&self, code: &str) -> Option<&GameSession> {
        self.sessions.get(code)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The session `participant` is in
    pub fn session_of(&self, participant: ParticipantId) -> Option<&GameSession> {
        let code = self.membership.get(&participant)?;
        self.sessions.get(code)
    }

    pub fn session_of_mut(&mut self, participant: ParticipantId) -> LobbyResult<&mut GameSession> {
        self.membership
            .get(&participant)
            .and_then(|code| self.sessions.get_mut(code))
            .ok_or(LobbyError::NotInSession(participant))
    }

    /// Place `participant` into an open session for `level`, creating one if needed
    pub fn join_random(
        &mut self,
        participant: ParticipantId,
        level: SkillLevel,
    ) -> LobbyResult<JoinOutcome> {
        if self.membership.contains_key(&participant) {
            return Err(LobbyError::AlreadyInSession(participant));
        }

        let open = self
            .order
            .iter()
            .find(|code| {
                self.sessions
                    .get(*code)
                    .is_some_and(|s| s.is_open_for(level))
            })
            .cloned();

        let (code, created) = match open {
            Some(code) => (code, false),
            None => {
                let code = self.generate_code();
                info!("[LOBBY] Creating {} session {}", level, code);
                self.sessions
                    .insert(code.clone(), GameSession::new(code.clone(), level));
                self.order.push(code.clone());
                (code, true)
            }
        };

        let session = self
            .sessions
            .get_mut(&code)
            .ok_or(LobbyError::NotInSession(participant))?;
        session.add_participant(participant)?;
        let participants = session.participants().to_vec();
        self.membership.insert(participant, code.clone());

        debug!(
            "[LOBBY] {} matched into {} ({} participants)",
            participant,
            code,
            participants.len()
        );
        Ok(JoinOutcome {
            code,
            created,
            participants,
        })
    }

    /// Remove `participant` from its session
    ///
    /// An emptied session is discarded.
    pub fn leave(&mut self, participant: ParticipantId) -> Option<LeaveOutcome> {
        let code = self.membership.remove(&participant)?;
        let session = self.sessions.get_mut(&code)?;
        let released = session.remove_participant(participant).unwrap_or_default();
        let remaining = session.participants().to_vec();

        if session.is_empty() {
            info!("[LOBBY] Closing empty session {}", code);
            self.sessions.remove(&code);
            self.order.retain(|c| *c != code);
        }
        Some(LeaveOutcome {
            code,
            remaining,
            released,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_same_level_participants_share_a_session() {
        let mut lobby = Lobby::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let first = lobby.join_random(a, SkillLevel::Beginner).unwrap();
        let second = lobby.join_random(b, SkillLevel::Beginner).unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.code, second.code);
        assert_eq!(second.participants, vec![a, b]);
        assert_eq!(first.code.len(), 6);
        assert!(first.code.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_different_levels_are_not_matched() {
        let mut lobby = Lobby::new();
        let a = lobby.join_random(Uuid::new_v4(), SkillLevel::Beginner).unwrap();
        let b = lobby.join_random(Uuid::new_v4(), SkillLevel::Advanced).unwrap();

        assert_ne!(a.code, b.code);
        assert_eq!(lobby.session_count(), 2);
    }

    #[test]
    fn test_full_session_spawns_a_new_one() {
        let mut lobby = Lobby::new();
        let first = lobby.join_random(Uuid::new_v4(), SkillLevel::Intermediate).unwrap();
        lobby.join_random(Uuid::new_v4(), SkillLevel::Intermediate).unwrap();
        let third = lobby.join_random(Uuid::new_v4(), SkillLevel::Intermediate).unwrap();

        assert!(third.created);
        assert_ne!(first.code, third.code);
        assert_eq!(third.participants.len(), 1);
    }

    #[test]
    fn test_double_join_rejected() {
        let mut lobby = Lobby::new();
        let a = Uuid::new_v4();
        lobby.join_random(a, SkillLevel::Beginner).unwrap();
        assert_eq!(
            lobby.join_random(a, SkillLevel::Beginner),
            Err(LobbyError::AlreadyInSession(a))
        );
    }

    #[test]
    fn test_leave_reopens_and_empty_session_closes() {
        let mut lobby = Lobby::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let joined = lobby.join_random(a, SkillLevel::Beginner).unwrap();
        lobby.join_random(b, SkillLevel::Beginner).unwrap();

        let left = lobby.leave(a).unwrap();
        assert_eq!(left.code, joined.code);
        assert_eq!(left.remaining, vec![b]);
        assert!(left.released.is_empty());
        assert!(lobby.session(&joined.code).is_some_and(|s| s.is_open_for(SkillLevel::Beginner)));

        assert!(lobby.leave(b).is_some_and(|left| left.remaining.is_empty()));
        assert!(lobby.session(&joined.code).is_none());
        assert_eq!(lobby.leave(b), None);
    }
}
