//! One matchmade game session
//!
//! The session is the single writer of its ordered event log. Team claims,
//! state transitions and moves are arbitrated here and, once accepted, appended
//! to the log and broadcast to every participant in log order.
//!
//! The session keeps its own replica of the game, played with the same layout
//! the participants use, so that a relayed move is accepted only when it is
//! legal and submitted by the participant owning the active team.

use std::collections::HashMap;

use chess_engine::layout::{self, PlacementInput};
use chess_engine::{GameState, GameStateMachine, Square, Team};
use shared::protocol::{ParticipantId, SessionEvent, SessionEventKind, SkillLevel, MAX_PARTICIPANTS};
use shared::EventLog;
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};

pub struct GameSession {
    code: String,
    level: SkillLevel,
    participants: Vec<ParticipantId>,
    claims: HashMap<Team, ParticipantId>,
    state: GameState,
    replica: GameStateMachine,
    layout: Vec<PlacementInput>,
    log: EventLog,
}

impl GameSession {
    pub fn new(code: String, level: SkillLevel) -> Self {
        Self::with_layout(code, level, layout::standard())
    }

    pub fn with_layout(code: String, level: SkillLevel, layout: Vec<PlacementInput>) -> Self {
        Self {
            code,
            level,
            participants: Vec::with_capacity(MAX_PARTICIPANTS),
            claims: HashMap::new(),
            state: GameState::Init,
            replica: GameStateMachine::local(),
            layout,
            log: EventLog::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn level(&self) -> SkillLevel {
        self.level
    }

    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= MAX_PARTICIPANTS
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Whether a matchmaking request for `level` may land here
    pub fn is_open_for(&self, level: SkillLevel) -> bool {
        self.level == level && !self.is_full() && self.state == GameState::Init
    }

    pub fn team_of(&self, participant: ParticipantId) -> Option<Team> {
        self.claims
            .iter()
            .find(|(_, owner)| **owner == participant)
            .map(|(team, _)| *team)
    }

    pub fn owner_of(&self, team: Team) -> Option<ParticipantId> {
        self.claims.get(&team).copied()
    }

    pub fn add_participant(&mut self, participant: ParticipantId) -> SessionResult<()> {
        if self.is_full() {
            return Err(SessionError::SessionFull);
        }
        if !self.participants.contains(&participant) {
            self.participants.push(participant);
            info!(
                "[SESSION] {} joined {} ({}/{})",
                participant,
                self.code,
                self.participants.len(),
                MAX_PARTICIPANTS
            );
        }
        Ok(())
    }

    /// Drop a participant; its team claim is freed if play has not started
    ///
    /// Returns `None` if `participant` was not a member, otherwise the
    /// `TeamReleased` log entries to broadcast to whoever remains.
    pub fn remove_participant(&mut self, participant: ParticipantId) -> Option<Vec<SessionEvent>> {
        let before = self.participants.len();
        self.participants.retain(|p| *p != participant);
        if self.participants.len() == before {
            return None;
        }
        info!("[SESSION] {} left {}", participant, self.code);

        let mut released = Vec::new();
        if self.state == GameState::Init {
            if let Some(team) = self.team_of(participant) {
                self.claims.remove(&team);
                debug!("[SESSION] {} is free again in {}", team, self.code);
                released.push(
                    self.log
                        .append(participant, SessionEventKind::TeamReleased { team }),
                );
            }
        }
        Some(released)
    }

    fn ensure_member(&self, participant: ParticipantId) -> SessionResult<()> {
        if self.participants.contains(&participant) {
            Ok(())
        } else {
            Err(SessionError::NotAParticipant(participant))
        }
    }

    /// Claim `team` for `participant`
    ///
    /// Re-claiming an owned team is a no-op (`Ok(None)`); a team owned by the
    /// other participant is [`SessionError::TeamUnavailable`].
    pub fn claim_team(
        &mut self,
        participant: ParticipantId,
        team: Team,
    ) -> SessionResult<Option<SessionEvent>> {
        self.ensure_member(participant)?;

        match self.owner_of(team) {
            Some(owner) if owner == participant => return Ok(None),
            Some(_) => return Err(SessionError::TeamUnavailable { team }),
            None => {}
        }
        if let Some(held) = self.team_of(participant) {
            return Err(SessionError::AlreadyAssigned { team: held });
        }

        self.claims.insert(team, participant);
        info!("[SESSION] {} claimed {} in {}", participant, team, self.code);
        Ok(Some(
            self.log
                .append(participant, SessionEventKind::TeamClaimed { team }),
        ))
    }

    /// Accept a forward state transition requested by a participant
    pub fn set_state(&mut self, participant: ParticipantId, code: u8) -> SessionResult<SessionEvent> {
        self.ensure_member(participant)?;

        let next = GameState::from_code(code).ok_or(SessionError::InvalidStateCode(code))?;
        if !self.state.can_transition_to(next) {
            return Err(SessionError::TransitionRejected {
                from: self.state,
                to: next,
            });
        }
        if next == GameState::Play && self.claims.len() < MAX_PARTICIPANTS {
            return Err(SessionError::TeamsNotClaimed);
        }
        if next == GameState::Finished && self.replica.state() != GameState::Finished {
            return Err(SessionError::GameNotOver);
        }

        if next == GameState::Play {
            self.replica.start_new_game(&self.layout);
        }
        info!("[SESSION] {} {:?} -> {:?}", self.code, self.state, next);
        self.state = next;
        Ok(self
            .log
            .append(participant, SessionEventKind::StateTransition { state: code }))
    }

    /// Accept a move from the participant owning the active team
    pub fn submit_move(
        &mut self,
        participant: ParticipantId,
        from: Square,
        to: Square,
    ) -> SessionResult<SessionEvent> {
        self.ensure_member(participant)?;

        if self.state != GameState::Play {
            return Err(SessionError::Move(
                chess_engine::ChessEngineError::GameNotInProgress { state: self.state },
            ));
        }
        let active = self.replica.active_team();
        if self.team_of(participant) != Some(active) {
            return Err(SessionError::NotYourTurn { active });
        }

        self.replica.validate_move(from, to)?;
        self.replica.apply_remote_move(from, to);
        debug!("[SESSION] {} relaying {} {} -> {}", self.code, active, from, to);

        Ok(self
            .log
            .append(participant, SessionEventKind::MoveMade { from, to }))
    }
}
