//! Game Flow Integration Tests
//!
//! Tests for full game flows including:
//! - Turn alternation
//! - Piece movement validation
//! - Game state transitions
//! - Win conditions

use chess_engine::layout::{self, PlacementInput};
use chess_engine::{
    GameEvent, GameOutcome, GameState, GameStateMachine, LocalAuthority, PieceVariant, Square,
    Team,
};

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn new_game() -> GameStateMachine<LocalAuthority> {
    let mut game = GameStateMachine::local();
    game.start_new_game(&layout::standard());
    game
}

/// Helper to play a move through the selection path, like a pointer would
fn click_move(game: &mut GameStateMachine<LocalAuthority>, from: &str, to: &str) -> Vec<GameEvent> {
    let mut events = game.select(sq(from));
    events.extend(game.select(sq(to)));
    events
}

// ============================================================================
// Turn Alternation Tests
// ============================================================================

#[test]
fn test_white_moves_first() {
    let mut game = new_game();

    // Black cannot open
    assert!(click_move(&mut game, "e7", "e5").is_empty());

    let events = click_move(&mut game, "e2", "e4");
    assert!(events.contains(&GameEvent::TurnChanged {
        active: Team::Black
    }));
}

#[test]
fn test_both_players_have_moves() {
    let game = new_game();
    assert_eq!(game.player(Team::White).legal_move_count(), 20);
    assert_eq!(game.player(Team::Black).legal_move_count(), 20);
}

// ============================================================================
// Piece Movement Tests
// ============================================================================

#[test]
fn test_knight_moves_after_symmetric_king_pawns() {
    let mut game = new_game();
    click_move(&mut game, "e2", "e4");
    click_move(&mut game, "e7", "e5");

    let mut moves = game.available_moves(sq("g1")).to_vec();
    moves.sort();
    let mut expected = vec![sq("e2"), sq("f3"), sq("h3")];
    expected.sort();
    assert_eq!(moves, expected);
}

#[test]
fn test_capture_removes_piece_from_owner() {
    let mut game = new_game();
    click_move(&mut game, "e2", "e4");
    click_move(&mut game, "d7", "d5");

    let events = click_move(&mut game, "e4", "d5");
    let captured = events.iter().find_map(|e| match e {
        GameEvent::MoveApplied { captured, .. } => *captured,
        _ => None,
    });

    assert_eq!(captured.map(|c| c.variant), Some(PieceVariant::Pawn));
    assert_eq!(game.player(Team::Black).pieces().len(), 15);
    assert_eq!(game.piece_at(sq("d5")).map(|p| p.team), Some(Team::White));
}

#[test]
fn test_no_approved_move_leaves_own_king_attacked() {
    //! Every legal reply in a sharp position keeps the mover's king safe
    let mut game = new_game();
    for (from, to) in [("e2", "e4"), ("f7", "f6"), ("d1", "h5")] {
        click_move(&mut game, from, to);
    }

    let black = game.player(Team::Black);
    let replies: usize = black.legal_move_count();
    assert!(replies > 0);
    for piece in black.pieces() {
        for &to in &piece.available_moves {
            let mut replay = new_game();
            for (f, t) in [("e2", "e4"), ("f7", "f6"), ("d1", "h5")] {
                click_move(&mut replay, f, t);
            }
            let events = replay.try_move(piece.square, to);
            assert!(
                !events.contains(&GameEvent::Check { team: Team::Black }),
                "{} -> {} leaves Black in check",
                piece.square,
                to
            );
            assert_eq!(
                replay.active_team(),
                Team::White,
                "{} -> {} was not applied",
                piece.square,
                to
            );
        }
    }
}

// ============================================================================
// Game State Tests
// ============================================================================

#[test]
fn test_fools_mate() {
    let mut game = new_game();
    let mut events = Vec::new();
    for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
        events = click_move(&mut game, from, to);
    }

    assert_eq!(game.state(), GameState::Finished);
    assert!(events.contains(&GameEvent::GameFinished {
        outcome: GameOutcome::Checkmate {
            winner: Team::Black
        }
    }));
    assert!(game.available_moves(sq("e1")).is_empty());
    assert!(game.history().last().is_some_and(|m| m.is_check));
}

#[test]
fn test_selection_ignored_after_finish() {
    let mut game = new_game();
    for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
        click_move(&mut game, from, to);
    }
    assert!(game.select(sq("a2")).is_empty());
    assert_eq!(game.selected(), None);
}

#[test]
fn test_custom_layout_promotion_gives_check() {
    let layout = vec![
        PlacementInput::new(sq("a1"), Team::White, PieceVariant::King),
        PlacementInput::new(sq("g7"), Team::White, PieceVariant::Pawn),
        PlacementInput::new(sq("a8"), Team::Black, PieceVariant::King),
    ];
    let mut game = GameStateMachine::local();
    game.start_new_game(&layout);

    let events = click_move(&mut game, "g7", "g8");

    assert!(events.iter().any(|e| matches!(e, GameEvent::Promoted { .. })));
    assert!(events.contains(&GameEvent::Check { team: Team::Black }));
    assert_eq!(game.state(), GameState::Play);
    assert_eq!(game.player(Team::White).first_of(PieceVariant::Pawn), None);
}
