//! Networked game authority
//!
//! Plugs into the engine's [`GameAuthority`] seam. Nothing decided here is
//! applied locally: state transitions and confirmed moves are queued as
//! outgoing [`GameMessage`]s for the session, and come back through the
//! session's ordered log to be applied identically on both participants.

use std::collections::HashMap;

use chess_engine::{GameAuthority, GameState, MoveRouting, Square, Team};
use shared::protocol::{GameMessage, ParticipantId, MAX_PARTICIPANTS};
use tracing::debug;

#[derive(Debug)]
pub struct NetworkAuthority {
    participant: ParticipantId,
    claims: HashMap<Team, ParticipantId>,
    outgoing: Vec<GameMessage>,
}

impl NetworkAuthority {
    pub fn new(participant: ParticipantId) -> Self {
        Self {
            participant,
            claims: HashMap::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// Team assigned to the local participant, once its claim was accepted
    pub fn local_team(&self) -> Option<Team> {
        self.claims
            .iter()
            .find(|(_, owner)| **owner == self.participant)
            .map(|(team, _)| *team)
    }

    pub fn owner_of(&self, team: Team) -> Option<ParticipantId> {
        self.claims.get(&team).copied()
    }

    /// Whether the local participant could still claim `team`
    pub fn is_team_available(&self, team: Team) -> bool {
        self.owner_of(team)
            .map_or(true, |owner| owner == self.participant)
    }

    /// Record a claim accepted by the session
    pub fn record_claim(&mut self, participant: ParticipantId, team: Team) {
        debug!("[NETWORK] {} plays {}", participant, team);
        self.claims.insert(team, participant);
    }

    /// Forget a claim the session freed
    pub fn record_release(&mut self, team: Team) {
        debug!("[NETWORK] {} is free again", team);
        self.claims.remove(&team);
    }

    /// Messages queued for the session since the last call
    pub fn take_outgoing(&mut self) -> Vec<GameMessage> {
        std::mem::take(&mut self.outgoing)
    }
}

impl GameAuthority for NetworkAuthority {
    fn request_state(&mut self, state: GameState) -> Option<GameState> {
        // Init is where every participant starts; only forward transitions travel
        if state == GameState::Init {
            return Some(state);
        }
        self.outgoing.push(GameMessage::SetGameState {
            state: state.code(),
        });
        None
    }

    fn ready_to_start(&self) -> bool {
        self.claims.len() == MAX_PARTICIPANTS
    }

    fn may_move(&self, active: Team) -> bool {
        self.local_team() == Some(active)
    }

    fn route_move(&mut self, from: Square, to: Square) -> MoveRouting {
        self.outgoing.push(GameMessage::SubmitMove { from, to });
        MoveRouting::Deferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_engine::{layout, GameEvent, GameStateMachine};
    use uuid::Uuid;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_team_availability() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut authority = NetworkAuthority::new(me);

        authority.record_claim(other, Team::White);
        assert!(!authority.is_team_available(Team::White));
        assert!(authority.is_team_available(Team::Black));

        authority.record_claim(me, Team::Black);
        assert!(authority.is_team_available(Team::Black));
        assert_eq!(authority.local_team(), Some(Team::Black));

        authority.record_release(Team::White);
        assert!(authority.is_team_available(Team::White));
        assert_eq!(authority.local_team(), Some(Team::Black));
    }

    #[test]
    fn test_game_waits_in_init_until_both_teams_claimed() {
        let me = Uuid::new_v4();
        let mut game = GameStateMachine::new(NetworkAuthority::new(me));
        game.start_new_game(&layout::standard());

        assert_eq!(game.state(), GameState::Init);
        assert!(game.authority_mut().take_outgoing().is_empty());

        game.authority_mut().record_claim(me, Team::White);
        game.authority_mut().record_claim(Uuid::new_v4(), Team::Black);
        let events = game.try_to_start_current_game();

        // Requested, not applied
        assert!(events.is_empty());
        assert_eq!(game.state(), GameState::Init);
        assert_eq!(
            game.authority_mut().take_outgoing(),
            vec![GameMessage::SetGameState {
                state: GameState::Play.code()
            }]
        );

        let events = game.apply_state(GameState::Play);
        assert_eq!(
            events,
            vec![GameEvent::StateChanged {
                state: GameState::Play
            }]
        );
    }

    #[test]
    fn test_moves_are_submitted_not_applied() {
        let me = Uuid::new_v4();
        let mut game = GameStateMachine::new(NetworkAuthority::new(me));
        game.start_new_game(&layout::standard());
        game.authority_mut().record_claim(me, Team::Black);
        game.authority_mut().record_claim(Uuid::new_v4(), Team::White);
        game.apply_state(GameState::Play);

        // White to move, but we play Black
        assert!(!game.can_perform_move());
        assert!(game.try_move(sq("e2"), sq("e4")).is_empty());
        assert!(game.authority_mut().take_outgoing().is_empty());

        // Opponent's move arrives through the session
        game.apply_remote_move(sq("e2"), sq("e4"));
        assert!(game.can_perform_move());

        game.try_move(sq("e7"), sq("e5"));
        assert!(game.piece_at(sq("e7")).is_some(), "not applied until relayed");
        assert_eq!(
            game.authority_mut().take_outgoing(),
            vec![GameMessage::SubmitMove {
                from: sq("e7"),
                to: sq("e5")
            }]
        );
    }
}
