//! Session server
//!
//! [`Hub`] holds the lobby and turns one incoming message from one
//! participant into the replies and broadcasts it causes. It is synchronous
//! so the routing rules can be tested without a runtime.
//!
//! [`spawn`] runs a hub inside a tokio task. Participants talk to it through a
//! [`ClientLink`]: bincode frames over unbounded channels, delivered in send
//! order, which is all the ordering the session log needs.

use std::collections::HashMap;

use shared::protocol::{
    decode, encode, GameMessage, LobbyMessage, NetMessage, ParticipantId, SessionEvent,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{LinkError, LobbyError, LobbyResult, SessionError};
use crate::lobby::Lobby;

/// A message addressed to one participant
pub type Outgoing = (ParticipantId, NetMessage);

#[derive(Default)]
pub struct Hub {
    lobby: Lobby,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    pub fn handle(&mut self, from: ParticipantId, msg: NetMessage) -> Vec<Outgoing> {
        match msg {
            NetMessage::Lobby(msg) => self.handle_lobby(from, msg),
            NetMessage::Game(msg) => self.handle_game(from, msg),
        }
    }

    /// Participant connection dropped
    pub fn disconnect(&mut self, participant: ParticipantId) -> Vec<Outgoing> {
        self.leave(participant)
    }

    fn handle_lobby(&mut self, from: ParticipantId, msg: LobbyMessage) -> Vec<Outgoing> {
        match msg {
            LobbyMessage::JoinRandom { level } => match self.lobby.join_random(from, level) {
                Ok(joined) => {
                    let mut out: Vec<Outgoing> = vec![(
                        from,
                        LobbyMessage::JoinedSession {
                            code: joined.code.clone(),
                            level,
                            participant: from,
                            participants: joined.participants.len(),
                        }
                        .into(),
                    )];

                    // Late joiners catch up on everything already in the log
                    if let Some(session) = self.lobby.session(&joined.code) {
                        out.extend(session.log().entries().iter().map(|event| {
                            (from, NetMessage::from(GameMessage::Event(event.clone())))
                        }));
                    }

                    out.extend(
                        joined
                            .participants
                            .iter()
                            .filter(|p| **p != from)
                            .map(|p| (*p, LobbyMessage::ParticipantJoined { participant: from }.into())),
                    );
                    out
                }
                Err(e) => reply_error(from, e),
            },

            LobbyMessage::ClaimTeam { team } => {
                let claimed = self
                    .lobby
                    .session_of_mut(from)
                    .and_then(|s| s.claim_team(from, team).map_err(LobbyError::from));
                match claimed {
                    Ok(Some(event)) => self.broadcast(from, event),
                    Ok(None) => Vec::new(),
                    Err(LobbyError::Session(SessionError::TeamUnavailable { team })) => {
                        info!("[LOBBY] {} denied {}: already claimed", from, team);
                        vec![(from, LobbyMessage::TeamUnavailable { team }.into())]
                    }
                    Err(e) => reply_error(from, e),
                }
            }

            LobbyMessage::Leave => self.leave(from),

            other => {
                warn!("[LOBBY] Ignoring server-side message from {}: {:?}", from, other);
                Vec::new()
            }
        }
    }

    fn handle_game(&mut self, from: ParticipantId, msg: GameMessage) -> Vec<Outgoing> {
        let result = match msg {
            GameMessage::SetGameState { state } => self
                .lobby
                .session_of_mut(from)
                .and_then(|s| s.set_state(from, state).map_err(LobbyError::from)),
            GameMessage::SubmitMove { from: src, to } => self
                .lobby
                .session_of_mut(from)
                .and_then(|s| s.submit_move(from, src, to).map_err(LobbyError::from)),
            GameMessage::Event(_) => {
                warn!("[SESSION] {} sent a log entry; only the server appends", from);
                return Vec::new();
            }
        };

        match result {
            Ok(event) => self.broadcast(from, event),
            Err(e) => {
                // Rejected transitions and moves are expected; nobody is told
                debug!("[SESSION] Rejected request from {}: {}", from, e);
                Vec::new()
            }
        }
    }

    fn broadcast(&self, from: ParticipantId, event: SessionEvent) -> Vec<Outgoing> {
        let Some(session) = self.lobby.session_of(from) else {
            return Vec::new();
        };
        session
            .participants()
            .iter()
            .map(|p| (*p, GameMessage::Event(event.clone()).into()))
            .collect()
    }

    fn leave(&mut self, participant: ParticipantId) -> Vec<Outgoing> {
        let Some(left) = self.lobby.leave(participant) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for p in &left.remaining {
            out.push((*p, LobbyMessage::ParticipantLeft { participant }.into()));
            out.extend(
                left.released
                    .iter()
                    .map(|event| (*p, GameMessage::Event(event.clone()).into())),
            );
        }
        out
    }
}

fn reply_error(to: ParticipantId, e: LobbyError) -> Vec<Outgoing> {
    warn!("[LOBBY] {}: {}", to, e);
    vec![(
        to,
        LobbyMessage::Error {
            message: e.to_string(),
        }
        .into(),
    )]
}

enum ServerCommand {
    Connect {
        participant: ParticipantId,
        outbox: mpsc::UnboundedSender<Vec<u8>>,
    },
    Frame {
        participant: ParticipantId,
        bytes: Vec<u8>,
    },
    Disconnect {
        participant: ParticipantId,
    },
}

/// Cloneable entry point to a running server
#[derive(Clone)]
pub struct ServerHandle {
    tx: mpsc::UnboundedSender<ServerCommand>,
}

impl ServerHandle {
    /// Open a new participant connection
    pub fn connect(&self) -> LobbyResult<ClientLink> {
        let participant = Uuid::new_v4();
        let (outbox, inbox) = mpsc::unbounded_channel();
        self.tx
            .send(ServerCommand::Connect {
                participant,
                outbox,
            })
            .map_err(|_| LobbyError::ServerClosed)?;

        Ok(ClientLink {
            participant,
            tx: self.tx.clone(),
            rx: inbox,
        })
    }
}

/// One participant's end of the connection
pub struct ClientLink {
    participant: ParticipantId,
    tx: mpsc::UnboundedSender<ServerCommand>,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl ClientLink {
    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    pub fn send(&self, msg: impl Into<NetMessage>) -> Result<(), LinkError> {
        let bytes = encode(&msg.into())?;
        self.tx
            .send(ServerCommand::Frame {
                participant: self.participant,
                bytes,
            })
            .map_err(|_| LinkError::Closed)
    }

    /// Wait for the next message; `Ok(None)` once the server is gone
    pub async fn recv(&mut self) -> Result<Option<NetMessage>, LinkError> {
        match self.rx.recv().await {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Next message if one is already queued
    pub fn try_recv(&mut self) -> Result<Option<NetMessage>, LinkError> {
        match self.rx.try_recv() {
            Ok(bytes) => Ok(Some(decode(&bytes)?)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(LinkError::Closed),
        }
    }
}

impl Drop for ClientLink {
    fn drop(&mut self) {
        let _ = self.tx.send(ServerCommand::Disconnect {
            participant: self.participant,
        });
    }
}

/// Start a server task on the current tokio runtime
pub fn spawn() -> (ServerHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(rx));
    (ServerHandle { tx }, task)
}

async fn run(mut rx: mpsc::UnboundedReceiver<ServerCommand>) {
    info!("[NETWORK] Session server started");
    let mut hub = Hub::new();
    let mut outboxes: HashMap<ParticipantId, mpsc::UnboundedSender<Vec<u8>>> = HashMap::new();

    while let Some(command) = rx.recv().await {
        let outgoing = match command {
            ServerCommand::Connect {
                participant,
                outbox,
            } => {
                debug!("[NETWORK] {} connected", participant);
                outboxes.insert(participant, outbox);
                Vec::new()
            }
            ServerCommand::Frame { participant, bytes } => match decode(&bytes) {
                Ok(msg) => hub.handle(participant, msg),
                Err(e) => {
                    warn!("[NETWORK] Dropping bad frame from {}: {}", participant, e);
                    Vec::new()
                }
            },
            ServerCommand::Disconnect { participant } => {
                debug!("[NETWORK] {} disconnected", participant);
                outboxes.remove(&participant);
                hub.disconnect(participant)
            }
        };

        for (to, msg) in outgoing {
            let Some(outbox) = outboxes.get(&to) else {
                continue;
            };
            match encode(&msg) {
                Ok(bytes) => {
                    if outbox.send(bytes).is_err() {
                        debug!("[NETWORK] {} is no longer listening", to);
                    }
                }
                Err(e) => error!("[NETWORK] Failed to encode message for {}: {}", to, e),
            }
        }
    }

    info!("[NETWORK] Session server stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_engine::{GameState, Team};
    use shared::protocol::{SessionEventKind, SkillLevel};

    fn join(hub: &mut Hub, level: SkillLevel) -> (ParticipantId, Vec<Outgoing>) {
        let id = Uuid::new_v4();
        let out = hub.handle(id, LobbyMessage::JoinRandom { level }.into());
        (id, out)
    }

    #[test]
    fn test_join_notifies_existing_participant() {
        let mut hub = Hub::new();
        let (a, _) = join(&mut hub, SkillLevel::Beginner);
        let (b, out) = join(&mut hub, SkillLevel::Beginner);

        assert!(out.iter().any(|(to, msg)| *to == b
            && matches!(msg, NetMessage::Lobby(LobbyMessage::JoinedSession { participants: 2, .. }))));
        assert!(out.contains(&(a, LobbyMessage::ParticipantJoined { participant: b }.into())));
    }

    #[test]
    fn test_claim_conflict_only_answers_requester() {
        let mut hub = Hub::new();
        let (a, _) = join(&mut hub, SkillLevel::Beginner);
        let (b, _) = join(&mut hub, SkillLevel::Beginner);

        let out = hub.handle(a, LobbyMessage::ClaimTeam { team: Team::White }.into());
        assert_eq!(out.len(), 2, "claim is broadcast to both participants");

        let out = hub.handle(b, LobbyMessage::ClaimTeam { team: Team::White }.into());
        assert_eq!(
            out,
            vec![(b, LobbyMessage::TeamUnavailable { team: Team::White }.into())]
        );

        assert!(hub
            .handle(a, LobbyMessage::ClaimTeam { team: Team::White }.into())
            .is_empty());
    }

    #[test]
    fn test_late_joiner_receives_log() {
        let mut hub = Hub::new();
        let (a, _) = join(&mut hub, SkillLevel::Advanced);
        hub.handle(a, LobbyMessage::ClaimTeam { team: Team::Black }.into());

        let (b, out) = join(&mut hub, SkillLevel::Advanced);
        let replayed: Vec<_> = out
            .iter()
            .filter_map(|(to, msg)| match msg {
                NetMessage::Game(GameMessage::Event(e)) if *to == b => Some(e.kind),
                _ => None,
            })
            .collect();
        assert_eq!(replayed, vec![SessionEventKind::TeamClaimed { team: Team::Black }]);
    }

    #[test]
    fn test_rejected_transition_is_silent() {
        let mut hub = Hub::new();
        let (a, _) = join(&mut hub, SkillLevel::Beginner);
        let out = hub.handle(
            a,
            GameMessage::SetGameState {
                state: GameState::Play.code(),
            }
            .into(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_disconnect_notifies_remaining() {
        let mut hub = Hub::new();
        let (a, _) = join(&mut hub, SkillLevel::Beginner);
        let (b, _) = join(&mut hub, SkillLevel::Beginner);

        let out = hub.disconnect(a);
        assert_eq!(
            out,
            vec![(b, LobbyMessage::ParticipantLeft { participant: a }.into())]
        );
    }

    #[test]
    fn test_departure_releases_claim_for_late_joiner() {
        let mut hub = Hub::new();
        let (a, _) = join(&mut hub, SkillLevel::Beginner);
        let (b, _) = join(&mut hub, SkillLevel::Beginner);
        hub.handle(a, LobbyMessage::ClaimTeam { team: Team::White }.into());

        let out = hub.handle(a, LobbyMessage::Leave.into());
        assert!(out.contains(&(b, LobbyMessage::ParticipantLeft { participant: a }.into())));
        assert!(out.iter().any(|(to, msg)| *to == b
            && matches!(
                msg,
                NetMessage::Game(GameMessage::Event(SessionEvent {
                    kind: SessionEventKind::TeamReleased { team: Team::White },
                    ..
                }))
            )));

        let (c, out) = join(&mut hub, SkillLevel::Beginner);
        let replayed: Vec<_> = out
            .iter()
            .filter_map(|(to, msg)| match msg {
                NetMessage::Game(GameMessage::Event(e)) if *to == c => Some(e.kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            replayed,
            vec![
                SessionEventKind::TeamClaimed { team: Team::White },
                SessionEventKind::TeamReleased { team: Team::White },
            ]
        );

        let out = hub.handle(c, LobbyMessage::ClaimTeam { team: Team::White }.into());
        assert_eq!(out.len(), 2, "claim is broadcast to both participants");
    }

    #[tokio::test]
    async fn test_spawned_server_round_trip() {
        let (server, _task) = spawn();
        let mut link = server.connect().unwrap();

        link.send(LobbyMessage::JoinRandom {
            level: SkillLevel::Intermediate,
        })
        .unwrap();

        match link.recv().await.unwrap() {
            Some(NetMessage::Lobby(LobbyMessage::JoinedSession {
                participant,
                participants,
                ..
            })) => {
                assert_eq!(participant, link.participant());
                assert_eq!(participants, 1);
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }
}
