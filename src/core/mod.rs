//! Core module - settings persistence and the local hot-seat front end
//!
//! - [`GameSettings`] - User preferences, persisted as JSON
//! - [`parse_move`] - Reads typed moves such as `e2 e4`
//! - [`run_hot_seat`] - Two players sharing one terminal

pub mod error;
pub mod settings;

pub use error::{CoreError, CoreResult};
pub use settings::{load_settings, save_settings, settings_path, GameSettings};

use chess_engine::{layout, GameEvent, GameStateMachine, LocalAuthority, Square};
use std::io::{BufRead, Write};
use tracing::debug;

/// Parse `"e2 e4"` (or `"e2e4"`) into origin and destination
pub fn parse_move(input: &str) -> CoreResult<(Square, Square)> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() != 4 || !compact.is_ascii() {
        return Err(CoreError::MoveSyntax {
            input: input.to_string(),
        });
    }
    let from = compact[..2].parse()?;
    let to = compact[2..].parse()?;
    Ok((from, to))
}

/// Human-readable line for a notification, if it deserves one
pub fn describe(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::MoveApplied {
            team,
            from,
            to,
            captured,
            ..
        } => Some(match captured {
            Some(c) => format!("{} {} -> {} captures {:?}", team, from, to, c.variant),
            None => format!("{} {} -> {}", team, from, to),
        }),
        GameEvent::Promoted { team, square, .. } => {
            Some(format!("{} pawn promoted to queen on {}", team, square))
        }
        GameEvent::Check { team } => Some(format!("{} is in check", team)),
        GameEvent::TurnChanged { active } => Some(format!("{} to move", active)),
        GameEvent::NoLegalMoves { team } => {
            Some(format!("{} has no legal move; type restart or quit", team))
        }
        GameEvent::GameFinished { outcome } => Some(outcome.message()),
        _ => None,
    }
}

/// Local game for two players at one terminal
///
/// Reads moves line by line until the game finishes or input ends. Besides
/// moves, `board`, `moves <square>`, `restart` and `quit` are understood.
pub fn run_hot_seat(input: impl BufRead, mut output: impl Write) -> CoreResult<GameStateMachine<LocalAuthority>> {
    let standard = layout::standard();
    let mut game = GameStateMachine::local();
    game.start_new_game(&standard);
    writeln!(output, "{}", game.board())?;
    writeln!(output, "{} to move", game.active_team())?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();

        match line {
            "" => continue,
            "quit" => break,
            "board" => {
                writeln!(output, "{}", game.board())?;
                continue;
            }
            "restart" => {
                game.restart(&standard);
                writeln!(output, "{}", game.board())?;
                continue;
            }
            _ => {}
        }

        if let Some(square) = line.strip_prefix("moves ") {
            match square.parse::<Square>() {
                Ok(square) => {
                    let moves: Vec<String> = game
                        .available_moves(square)
                        .iter()
                        .map(|s| s.to_string())
                        .collect();
                    writeln!(output, "{}", moves.join(" "))?;
                }
                Err(e) => writeln!(output, "{}", e)?,
            }
            continue;
        }

        let (from, to) = match parse_move(line) {
            Ok(mv) => mv,
            Err(e) => {
                writeln!(output, "{}", e)?;
                continue;
            }
        };

        let events = game.try_move(from, to);
        if events.is_empty() {
            debug!("[GAME] {} -> {} not applied", from, to);
            writeln!(output, "Illegal move")?;
            continue;
        }
        writeln!(output, "{}", game.board())?;
        for line in events.iter().filter_map(describe) {
            writeln!(output, "{}", line)?;
        }

        if game.outcome().is_some() {
            break;
        }
    }

    Ok(game)
}
