use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chess_engine::{GameState, Team};
use chessduel::core::{describe, load_settings, parse_move, run_hot_seat, settings_path, GameSettings};
use chessduel::networking::MultiplayerSession;
use clap::{Parser, Subcommand};
use shared::protocol::SkillLevel;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Two-player chess, locally or through an in-process session server
#[derive(Parser, Debug)]
#[command(name = "chessduel", version)]
struct Cli {
    /// Matchmaking level, overriding the settings file
    #[arg(long, global = true)]
    level: Option<SkillLevel>,

    /// Settings file to use instead of the platform default
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Two players at one terminal, moves typed as "e2 e4"
    Play,
    /// Two networked participants play a scripted game through a session server
    Demo,
}

/// Fool's mate, the shortest checkmate
const DEMO_MOVES: [&str; 4] = ["f2 f3", "e7 e5", "g2 g4", "d8 h4"];

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = cli.settings.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings(&path);
    if let Some(level) = cli.level {
        settings.skill_level = level;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("[SETTINGS] Using settings from {:?}", path);

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            run_hot_seat(stdin.lock(), stdout.lock())?;
        }
        Command::Demo => {
            let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
            runtime.block_on(demo(&settings))?;
        }
    }

    Ok(())
}

async fn demo(settings: &GameSettings) -> anyhow::Result<()> {
    let timeout = Duration::from_secs(settings.connect_timeout_secs);
    let (server, _task) = backend::spawn();

    let mut first = MultiplayerSession::join(&server, settings.skill_level, timeout)
        .await
        .inspect_err(|e| error!("[NETWORK] {:?}", e.status()))?;
    let mut second = MultiplayerSession::join(&server, settings.skill_level, timeout)
        .await
        .inspect_err(|e| error!("[NETWORK] {:?}", e.status()))?;

    let preferred = settings.preferred_team;
    first.claim_team(preferred)?;
    first
        .wait_until(timeout, |s| s.local_team() == Some(preferred))
        .await?;
    second.wait_until(timeout, |s| !s.is_team_available(preferred)).await?;
    second.claim_team(preferred.opponent())?;

    for session in [&mut first, &mut second] {
        session
            .wait_until(timeout, |s| s.game().state() == GameState::Play)
            .await?;
    }
    println!("{}", first.game().board());

    for (ply, text) in DEMO_MOVES.iter().enumerate() {
        let (from, to) = parse_move(text)?;
        let mover = if ply % 2 == 0 { Team::White } else { Team::Black };
        let session = if first.local_team() == Some(mover) {
            &mut first
        } else {
            &mut second
        };
        session.try_move(from, to)?;

        for session in [&mut first, &mut second] {
            let events = session
                .wait_until(timeout, |s| s.game().history().len() > ply)
                .await?;
            if session.local_team() == Some(Team::White) {
                events.iter().filter_map(describe).for_each(|line| println!("{}", line));
            }
        }
    }

    for session in [&mut first, &mut second] {
        session
            .wait_until(timeout, |s| s.game().state() == GameState::Finished)
            .await?;
    }
    println!("{}", first.game().board());
    if let Some(outcome) = first.game().outcome() {
        println!("{}", outcome.message());
    }

    first.leave()?;
    second.leave()?;
    Ok(())
}
