//! Participant side of a networked game
//!
//! [`MultiplayerSession`] joins a session through matchmaking, negotiates a
//! team, and keeps a [`GameStateMachine`] driven by the session's ordered
//! event log. Local input goes through the same engine entry points as a
//! local game; the [`NetworkAuthority`] turns accepted input into requests,
//! and the results are applied only when they come back from the session.

use std::time::Duration;

use backend::{ClientLink, ServerHandle};
use chess_engine::layout;
use chess_engine::{GameEvent, GameState, GameStateMachine, Square, Team};
use shared::protocol::{
    ConnectionStatus, GameMessage, LobbyMessage, NetMessage, ParticipantId, SessionEvent,
    SessionEventKind, SkillLevel, MAX_PARTICIPANTS,
};
use shared::EventLog;
use tracing::{debug, info, warn};

use super::authority::NetworkAuthority;
use super::error::NetworkError;

pub struct MultiplayerSession {
    link: ClientLink,
    game: GameStateMachine<NetworkAuthority>,
    log: EventLog,
    status: ConnectionStatus,
    level: SkillLevel,
    participants: usize,
    rejected_team: Option<Team>,
}

impl MultiplayerSession {
    /// Join a session advertising `level`, creating one if none is open
    ///
    /// Fails with [`NetworkError::Timeout`] if the server does not place the
    /// participant within `timeout`. No retry is attempted.
    pub async fn join(
        server: &ServerHandle,
        level: SkillLevel,
        timeout: Duration,
    ) -> Result<Self, NetworkError> {
        info!("[NETWORK] Searching for a {} session", level);
        let mut link = server.connect()?;
        link.send(LobbyMessage::JoinRandom { level })?;

        let (code, participants) = tokio::time::timeout(timeout, wait_for_join(&mut link))
            .await
            .map_err(|_| NetworkError::Timeout {
                secs: timeout.as_secs(),
            })??;

        info!(
            "[NETWORK] Joined session {} ({}/{})",
            code, participants, MAX_PARTICIPANTS
        );

        let mut game = GameStateMachine::new(NetworkAuthority::new(link.participant()));
        game.start_new_game(&layout::standard());

        Ok(Self {
            link,
            game,
            log: EventLog::new(),
            status: ConnectionStatus::Connected { code },
            level,
            participants,
            rejected_team: None,
        })
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn level(&self) -> SkillLevel {
        self.level
    }

    pub fn participant(&self) -> ParticipantId {
        self.link.participant()
    }

    pub fn participants(&self) -> usize {
        self.participants
    }

    pub fn game(&self) -> &GameStateMachine<NetworkAuthority> {
        &self.game
    }

    pub fn local_team(&self) -> Option<Team> {
        self.game.authority().local_team()
    }

    pub fn is_team_available(&self, team: Team) -> bool {
        self.game.authority().is_team_available(team)
    }

    /// Last team the session refused to assign to us
    pub fn rejected_team(&self) -> Option<Team> {
        self.rejected_team
    }

    /// Ask the session for `team`
    ///
    /// A team already known to belong to the other participant is refused
    /// locally without contacting the session.
    pub fn claim_team(&mut self, team: Team) -> Result<(), NetworkError> {
        if !self.is_team_available(team) {
            return Err(NetworkError::TeamUnavailable { team });
        }
        self.link.send(LobbyMessage::ClaimTeam { team })?;
        Ok(())
    }

    pub fn select(&mut self, square: Square) -> Result<Vec<GameEvent>, NetworkError> {
        let events = self.game.select(square);
        self.flush()?;
        Ok(events)
    }

    pub fn try_move(&mut self, from: Square, to: Square) -> Result<Vec<GameEvent>, NetworkError> {
        let events = self.game.try_move(from, to);
        self.flush()?;
        Ok(events)
    }

    pub fn leave(mut self) -> Result<(), NetworkError> {
        self.link.send(LobbyMessage::Leave)?;
        self.status = ConnectionStatus::Disconnected;
        Ok(())
    }

    /// Process every message already received
    pub fn pump(&mut self) -> Result<Vec<GameEvent>, NetworkError> {
        let mut events = Vec::new();
        while let Some(msg) = self.link.try_recv()? {
            events.extend(self.handle(msg)?);
        }
        Ok(events)
    }

    /// Wait for the next message and process it
    pub async fn recv(&mut self) -> Result<Vec<GameEvent>, NetworkError> {
        match self.link.recv().await? {
            Some(msg) => self.handle(msg),
            None => {
                self.status = NetworkError::Closed.status();
                Err(NetworkError::Closed)
            }
        }
    }

    /// Keep processing messages until `done` holds
    pub async fn wait_until(
        &mut self,
        timeout: Duration,
        done: impl Fn(&Self) -> bool,
    ) -> Result<Vec<GameEvent>, NetworkError> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut events = self.pump()?;

        while !done(self) {
            match tokio::time::timeout_at(deadline, self.recv()).await {
                Ok(received) => events.extend(received?),
                Err(_) => {
                    return Err(NetworkError::Timeout {
                        secs: timeout.as_secs(),
                    })
                }
            }
        }
        Ok(events)
    }

    fn handle(&mut self, msg: NetMessage) -> Result<Vec<GameEvent>, NetworkError> {
        let mut events = Vec::new();

        match msg {
            NetMessage::Lobby(LobbyMessage::ParticipantJoined { participant }) => {
                self.participants = (self.participants + 1).min(MAX_PARTICIPANTS);
                info!("[NETWORK] {} joined", participant);
            }
            NetMessage::Lobby(LobbyMessage::ParticipantLeft { participant }) => {
                self.participants = self.participants.saturating_sub(1);
                warn!("[NETWORK] {} left the session", participant);
            }
            NetMessage::Lobby(LobbyMessage::TeamUnavailable { team }) => {
                info!("[NETWORK] {} is not available", team);
                self.rejected_team = Some(team);
            }
            NetMessage::Lobby(LobbyMessage::Error { message }) => {
                warn!("[NETWORK] Session server: {}", message);
            }
            NetMessage::Game(GameMessage::Event(event)) => {
                for event in self.log.receive(event) {
                    events.extend(self.apply(event));
                }
            }
            other => debug!("[NETWORK] Ignoring {:?}", other),
        }

        self.flush()?;
        Ok(events)
    }

    fn apply(&mut self, event: SessionEvent) -> Vec<GameEvent> {
        match event.kind {
            SessionEventKind::TeamClaimed { team } => {
                if event.sender == self.participant() {
                    info!("[NETWORK] Playing {}", team);
                    self.rejected_team = None;
                }
                self.game.authority_mut().record_claim(event.sender, team);
                self.game.try_to_start_current_game()
            }
            SessionEventKind::TeamReleased { team } => {
                self.game.authority_mut().record_release(team);
                Vec::new()
            }
            SessionEventKind::StateTransition { state } => match GameState::from_code(state) {
                Some(state) => self.game.apply_state(state),
                None => {
                    warn!("[NETWORK] Unknown state code {} in log", state);
                    Vec::new()
                }
            },
            SessionEventKind::MoveMade { from, to } => self.game.apply_remote_move(from, to),
        }
    }

    fn flush(&mut self) -> Result<(), NetworkError> {
        for msg in self.game.authority_mut().take_outgoing() {
            self.link.send(msg)?;
        }
        Ok(())
    }
}

async fn wait_for_join(link: &mut ClientLink) -> Result<(String, usize), NetworkError> {
    loop {
        match link.recv().await? {
            Some(NetMessage::Lobby(LobbyMessage::JoinedSession {
                code, participants, ..
            })) => return Ok((code, participants)),
            Some(NetMessage::Lobby(LobbyMessage::Error { message })) => {
                return Err(NetworkError::Refused { message })
            }
            Some(other) => debug!("[NETWORK] Ignoring {:?} before join", other),
            None => return Err(NetworkError::Closed),
        }
    }
}
