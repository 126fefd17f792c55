//! Turn orchestration
//!
//! [`GameStateMachine`] owns the board and both players, applies confirmed
//! moves, regenerates both move sets, evaluates check and checkmate, and
//! advances or ends the game.
//!
//! # States
//!
//! ```text
//! Init ──(pieces placed, authority ready)──▶ Play ──(checkmate)──▶ Finished
//! ```
//!
//! Transitions only move forward. Whether a requested transition takes effect
//! immediately is decided by the [`GameAuthority`]: the local authority applies
//! it at once, a networked authority broadcasts it and the state arrives later
//! through [`GameStateMachine::apply_state`], in the same order on every
//! participant.
//!
//! # Rejections
//!
//! Illegal or out-of-turn moves and moves outside Play are silently ignored:
//! no mutation, no events. The reason is logged at `debug` level.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::board::{BoardState, LastMoved, Placement};
use crate::error::{ChessEngineError, ChessEngineResult};
use crate::events::{CapturedPiece, GameEvent, GameOutcome, MoveRecord};
use crate::layout::PlacementInput;
use crate::move_gen::en_passant_victim;
use crate::player::ChessPlayer;
use crate::types::{Piece, PieceId, PieceVariant, Square, Team};

/// Lifecycle of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Pieces being placed, no moves accepted
    #[default]
    Init,
    /// Turn alternation active
    Play,
    /// Terminal
    Finished,
}

impl GameState {
    /// Integer code carried by state-transition events on the wire
    pub const fn code(self) -> u8 {
        match self {
            GameState::Init => 0,
            GameState::Play => 1,
            GameState::Finished => 2,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(GameState::Init),
            1 => Some(GameState::Play),
            2 => Some(GameState::Finished),
            _ => None,
        }
    }

    /// Only `Init → Play` and `Play → Finished` are allowed
    pub const fn can_transition_to(self, next: GameState) -> bool {
        matches!(
            (self, next),
            (GameState::Init, GameState::Play) | (GameState::Play, GameState::Finished)
        )
    }
}

/// What the authority wants done with a locally confirmed move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRouting {
    /// Apply it on this instance right away
    ApplyNow,
    /// It was handed off; it comes back through
    /// [`GameStateMachine::apply_remote_move`]
    Deferred,
}

/// Decides who may move and how state transitions propagate
pub trait GameAuthority {
    /// Request a transition. `Some(state)` is applied immediately; `None`
    /// means it will be delivered later through [`GameStateMachine::apply_state`].
    fn request_state(&mut self, state: GameState) -> Option<GameState>;

    /// Whether the game may leave Init once the pieces are placed
    fn ready_to_start(&self) -> bool {
        true
    }

    /// Whether the local participant may move while `active` is to move
    fn may_move(&self, active: Team) -> bool {
        let _ = active;
        true
    }

    fn route_move(&mut self, from: Square, to: Square) -> MoveRouting {
        let _ = (from, to);
        MoveRouting::ApplyNow
    }
}

/// Single-instance authority: every request takes effect at once
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAuthority;

impl GameAuthority for LocalAuthority {
    fn request_state(&mut self, state: GameState) -> Option<GameState> {
        Some(state)
    }
}

pub struct GameStateMachine<A: GameAuthority = LocalAuthority> {
    board: BoardState,
    white: ChessPlayer,
    black: ChessPlayer,
    active: Team,
    state: GameState,
    selected: Option<PieceId>,
    outcome: Option<GameOutcome>,
    history: Vec<MoveRecord>,
    move_number: u32,
    next_id: u32,
    authority: A,
}

impl GameStateMachine<LocalAuthority> {
    pub fn local() -> Self {
        Self::new(LocalAuthority)
    }

    /// Discard the current game and start over from Init
    ///
    /// Local games only: a networked game's state follows the session log.
    pub fn restart(&mut self, layout: &[PlacementInput]) -> Vec<GameEvent> {
        info!("[GAME] Restarting game");
        self.board.clear();
        self.white.clear();
        self.black.clear();
        self.active = Team::White;
        self.state = GameState::Init;
        self.selected = None;
        self.outcome = None;
        self.history.clear();
        self.move_number = 1;
        self.next_id = 0;
        self.start_new_game(layout)
    }
}

impl<A: GameAuthority> GameStateMachine<A> {
    pub fn new(authority: A) -> Self {
        Self {
            board: BoardState::new(),
            white: ChessPlayer::new(Team::White),
            black: ChessPlayer::new(Team::Black),
            active: Team::White,
            state: GameState::Init,
            selected: None,
            outcome: None,
            history: Vec::new(),
            move_number: 1,
            next_id: 0,
            authority,
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn player(&self, team: Team) -> &ChessPlayer {
        match team {
            Team::White => &self.white,
            Team::Black => &self.black,
        }
    }

    fn player_mut(&mut self, team: Team) -> &mut ChessPlayer {
        match team {
            Team::White => &mut self.white,
            Team::Black => &mut self.black,
        }
    }

    pub fn active_team(&self) -> Team {
        self.active
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn selected(&self) -> Option<PieceId> {
        self.selected
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    pub fn authority_mut(&mut self) -> &mut A {
        &mut self.authority
    }

    /// The piece standing on `square`
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        let placement = self.board.occupant(square)?;
        self.player(placement.team).piece(placement.id)
    }

    /// Legal destinations of the piece on `square`; empty when there is none
    pub fn available_moves(&self, square: Square) -> &[Square] {
        self.piece_at(square)
            .map(|p| p.available_moves.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_game_in_progress(&self) -> bool {
        self.state == GameState::Play
    }

    pub fn is_team_turn_active(&self, team: Team) -> bool {
        self.active == team
    }

    /// Move acceptance precondition for local input
    pub fn can_perform_move(&self) -> bool {
        self.is_game_in_progress() && self.outcome.is_none() && self.authority.may_move(self.active)
    }

    /// Place the starting layout and try to enter Play
    pub fn start_new_game(&mut self, layout: &[PlacementInput]) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.transition(GameState::Init, &mut events);

        for input in layout {
            self.create_piece(input.square, input.team, input.variant);
        }
        self.active = Team::White;
        self.regenerate_all_moves();

        info!(
            "[GAME] New game with {} pieces placed",
            self.white.pieces().len() + self.black.pieces().len()
        );

        events.extend(self.try_to_start_current_game());
        events
    }

    /// Request Play if still in Init and the authority is ready
    pub fn try_to_start_current_game(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.state == GameState::Init && self.authority.ready_to_start() {
            self.transition(GameState::Play, &mut events);
        }
        events
    }

    /// Apply a state delivered by the authority; non-forward transitions are ignored
    pub fn apply_state(&mut self, state: GameState) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.apply_state_into(state, &mut events);
        events
    }

    fn apply_state_into(&mut self, state: GameState, events: &mut Vec<GameEvent>) {
        if !self.state.can_transition_to(state) {
            debug!(
                "[GAME] Ignoring state transition {:?} -> {:?}",
                self.state, state
            );
            return;
        }

        info!("[GAME] State {:?} -> {:?}", self.state, state);
        self.state = state;
        events.push(GameEvent::StateChanged { state });

        if state == GameState::Finished {
            self.selected = None;
            if let Some(outcome) = self.outcome {
                events.push(GameEvent::GameFinished { outcome });
            }
        }
    }

    fn transition(&mut self, state: GameState, events: &mut Vec<GameEvent>) {
        if let Some(state) = self.authority.request_state(state) {
            self.apply_state_into(state, events);
        }
    }

    /// Create a piece and hand it to its team's player
    ///
    /// Both the initial layout and promotion go through here.
    pub fn create_piece(&mut self, square: Square, team: Team, variant: PieceVariant) -> PieceId {
        let id = PieceId(self.next_id);
        self.next_id += 1;

        let piece = Piece::new(id, variant, team, square);
        self.board.place(square, Some(Placement::of(&piece)));
        self.player_mut(team).add_piece(piece);
        id
    }

    fn regenerate_all_moves(&mut self) {
        self.white.generate_all_moves(&mut self.board, &self.black);
        self.black.generate_all_moves(&mut self.board, &self.white);
    }

    /// Handle a click on `square`
    ///
    /// With nothing selected, a piece of the active team becomes selected.
    /// With a selection, clicking the same piece cancels it, clicking another
    /// piece of the active team switches to it, and clicking one of the
    /// selected piece's legal destinations confirms the move.
    pub fn select(&mut self, square: Square) -> Vec<GameEvent> {
        if !self.can_perform_move() {
            return Vec::new();
        }

        let occupant = self.board.occupant(square);
        let own_piece = occupant.filter(|o| self.is_team_turn_active(o.team));

        match self.selected {
            Some(selected) if occupant.map(|o| o.id) == Some(selected) => self.deselect(),
            Some(_) if own_piece.is_some() => self.select_piece(square),
            Some(_) => self.confirm_move(square),
            None if own_piece.is_some() => self.select_piece(square),
            None => Vec::new(),
        }
    }

    fn select_piece(&mut self, square: Square) -> Vec<GameEvent> {
        let Some(piece) = self.piece_at(square) else {
            return Vec::new();
        };
        let event = GameEvent::Selected {
            piece: piece.id,
            square,
            moves: piece.available_moves.clone(),
        };
        self.selected = Some(piece.id);
        vec![event]
    }

    /// Cancel the pending selection; a no-op when nothing is selected
    pub fn deselect(&mut self) -> Vec<GameEvent> {
        match self.selected.take() {
            Some(_) => vec![GameEvent::Deselected],
            None => Vec::new(),
        }
    }

    /// Move the selected piece to `to`
    pub fn confirm_move(&mut self, to: Square) -> Vec<GameEvent> {
        let Some(selected) = self.selected else {
            return Vec::new();
        };
        let Some(from) = self.player(self.active).piece(selected).map(|p| p.square) else {
            return Vec::new();
        };
        self.try_move(from, to)
    }

    /// Local input path: gated by [`Self::can_perform_move`], then routed
    /// through the authority
    pub fn try_move(&mut self, from: Square, to: Square) -> Vec<GameEvent> {
        if !self.can_perform_move() {
            debug!(
                "[GAME] Rejected {} -> {}: {}",
                from,
                to,
                self.rejection_reason()
            );
            return Vec::new();
        }

        let id = match self.validate_move(from, to) {
            Ok(id) => id,
            Err(e) => {
                debug!("[GAME] Rejected move: {}", e);
                return Vec::new();
            }
        };

        match self.authority.route_move(from, to) {
            MoveRouting::ApplyNow => self.apply_move(id, to),
            MoveRouting::Deferred => {
                debug!("[GAME] Move {} -> {} handed to authority", from, to);
                self.deselect()
            }
        }
    }

    /// Apply a move relayed by the authority, skipping the local turn gate
    ///
    /// Legality is still checked against this instance's board.
    pub fn apply_remote_move(&mut self, from: Square, to: Square) -> Vec<GameEvent> {
        if self.outcome.is_some() {
            debug!("[GAME] Ignoring relayed move {} -> {}: game decided", from, to);
            return Vec::new();
        }
        match self.validate_move(from, to) {
            Ok(id) => self.apply_move(id, to),
            Err(e) => {
                debug!("[GAME] Rejected relayed move: {}", e);
                Vec::new()
            }
        }
    }

    /// Check that `from → to` is a legal move for the active team
    pub fn validate_move(&self, from: Square, to: Square) -> ChessEngineResult<PieceId> {
        if self.state != GameState::Play {
            return Err(ChessEngineError::GameNotInProgress { state: self.state });
        }
        if !self.board.is_on_board(from) {
            return Err(ChessEngineError::InvalidSquare { square: from });
        }
        if !self.board.is_on_board(to) {
            return Err(ChessEngineError::InvalidSquare { square: to });
        }

        let piece = self
            .piece_at(from)
            .ok_or(ChessEngineError::NoPieceAtSquare { square: from })?;

        if !piece.is_from_same_team(self.active) {
            return Err(ChessEngineError::WrongTeam {
                square: from,
                team: self.active,
            });
        }
        if !piece.can_move_to(to) {
            return Err(ChessEngineError::IllegalMove { from, to });
        }

        Ok(piece.id)
    }

    fn rejection_reason(&self) -> ChessEngineError {
        if self.state != GameState::Play {
            ChessEngineError::GameNotInProgress { state: self.state }
        } else {
            ChessEngineError::NotYourTurn {
                active: self.active,
            }
        }
    }

    fn apply_move(&mut self, id: PieceId, to: Square) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let team = self.active;

        let Some(piece) = self.player(team).piece(id) else {
            error!("[GAME] {}", ChessEngineError::UnknownPiece { id });
            return events;
        };
        let from = piece.square;
        let variant = piece.variant;
        let en_passant = en_passant_victim(piece, &self.board, to);

        let captured_square = en_passant.unwrap_or(to);
        let captured = self
            .board
            .occupant(captured_square)
            .filter(|o| o.team != team)
            .map(|o| {
                self.board.place(captured_square, None);
                self.player_mut(o.team).remove_piece(o.id);
                CapturedPiece {
                    id: o.id,
                    variant: o.variant,
                    square: captured_square,
                }
            });

        let double_step = variant == PieceVariant::Pawn && (to.rank - from.rank).abs() == 2;
        self.board.place(from, None);
        let moved = self.player_mut(team).piece_mut(id).map(|piece| {
            piece.square = to;
            piece.has_moved = true;
            piece.double_step = double_step;
            Placement::of(piece)
        });
        self.board.place(to, moved);
        self.board.set_last_moved(Some(LastMoved { id, double_step }));

        info!("[GAME] {} {:?} {} -> {}", team, variant, from, to);
        events.push(GameEvent::MoveApplied {
            piece: id,
            team,
            from,
            to,
            captured,
        });

        let is_promotion = variant == PieceVariant::Pawn && to.rank == team.promotion_rank();
        if is_promotion {
            events.push(self.promote(id, team, to));
        }

        self.selected = None;

        let record = MoveRecord {
            move_number: self.move_number,
            team,
            variant,
            from,
            to,
            captured: captured.map(|c| c.variant),
            is_en_passant: en_passant.is_some() && captured.is_some(),
            is_promotion,
            is_check: false,
        };
        self.end_turn(record, &mut events);
        events
    }

    /// Replace the pawn `id` on `square` with a Queen of the same team
    fn promote(&mut self, id: PieceId, team: Team, square: Square) -> GameEvent {
        self.player_mut(team).remove_piece(id);
        self.board.place(square, None);
        let new = self.create_piece(square, team, PieceVariant::Queen);
        self.board.set_last_moved(Some(LastMoved {
            id: new,
            double_step: false,
        }));

        info!("[GAME] {} pawn promoted to queen on {}", team, square);
        GameEvent::Promoted {
            old: id,
            new,
            team,
            square,
        }
    }

    fn end_turn(&mut self, mut record: MoveRecord, events: &mut Vec<GameEvent>) {
        self.regenerate_all_moves();

        let mover = self.active;
        let defender = mover.opponent();
        let in_check = !self
            .player(mover)
            .pieces_attacking(PieceVariant::King, &self.board)
            .is_empty();

        record.is_check = in_check;
        self.history.push(record);
        if mover == Team::Black {
            self.move_number += 1;
        }

        if in_check {
            info!("[GAME] {} is in check", defender);
            events.push(GameEvent::Check { team: defender });
            if self.is_checkmate(defender) {
                self.finish(GameOutcome::Checkmate { winner: mover }, events);
                return;
            }
        }

        self.active = defender;
        events.push(GameEvent::TurnChanged { active: defender });
        if !in_check && !self.player(defender).has_legal_moves() {
            info!("[GAME] {} has no legal move", defender);
            events.push(GameEvent::NoLegalMoves { team: defender });
        }
    }

    /// The attacked king cannot move and no other piece can shield it
    fn is_checkmate(&mut self, defender: Team) -> bool {
        let king_moves = self
            .player(defender)
            .first_of(PieceVariant::King)
            .map(|king| king.available_moves.len())
            .unwrap_or(0);
        if king_moves > 0 {
            return false;
        }

        let (defending, attacking) = match defender {
            Team::White => (&self.white, &self.black),
            Team::Black => (&self.black, &self.white),
        };
        !defending.can_shield(PieceVariant::King, &mut self.board, attacking)
    }

    fn finish(&mut self, outcome: GameOutcome, events: &mut Vec<GameEvent>) {
        info!("[GAME] {}", outcome.message());
        self.outcome = Some(outcome);
        self.selected = None;
        self.transition(GameState::Finished, events);
    }
}
