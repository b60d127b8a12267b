use clap::Parser;
use infinite_packman::config::GameConfig;
use infinite_packman::constants::TICK_MS;
use infinite_packman::engine::World;
use infinite_packman::error::GameError;
use infinite_packman::log::{emit_log, LogLevel, LogLine};
use infinite_packman::types::{Direction, Role};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Paced game loop for an external renderer: directions arrive as lines on
/// stdin, state leaves as JSON lines on stdout.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = TICK_MS)]
    frame_ms: u64,
    /// Emit a snapshot every N frames.
    #[arg(long, default_value_t = 1)]
    every: u64,
    /// Stop after this many frames instead of running until stdin closes.
    #[arg(long)]
    frames: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Steer(Role, Direction),
    Quit,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random::<u64>) as u32;
    let mut world = match build_world(cli.config.as_deref(), seed) {
        Ok(world) => world,
        Err(error) => {
            emit_log(
                LogLine::new(LogLevel::Error, "fatal", json!({ "error": error.to_string() }))
                    .seed(seed),
            );
            std::process::exit(2);
        }
    };
    emit_log(
        LogLine::new(
            LogLevel::Info,
            "world_created",
            json!({
                "width": world.maze().width(),
                "height": world.maze().height(),
                "frameMs": cli.frame_ms,
            }),
        )
        .seed(seed),
    );

    let (tx, mut rx) = mpsc::channel::<Command>(64);
    tokio::spawn(read_commands(tx));

    let every = cli.every.max(1);
    let mut stdout = tokio::io::stdout();
    let mut interval = tokio::time::interval(Duration::from_millis(cli.frame_ms.max(1)));
    let mut input_open = true;
    loop {
        tokio::select! {
            command = rx.recv(), if input_open => match command {
                Some(Command::Steer(role, dir)) => world.set_direction(role, dir),
                Some(Command::Quit) => break,
                // A closed stdin ends the run unless a frame limit keeps it going.
                None if cli.frames.is_some() => input_open = false,
                None => break,
            },
            _ = interval.tick() => {
                let regenerations = world.regenerations();
                if let Err(error) = world.tick() {
                    emit_log(
                        LogLine::new(LogLevel::Error, "fatal", json!({ "error": error.to_string() }))
                            .seed(seed)
                            .tick(world.tick_count()),
                    );
                    std::process::exit(2);
                }
                if world.regenerations() > regenerations {
                    emit_log(
                        LogLine::new(
                            LogLevel::Info,
                            "maze_regenerated",
                            json!({ "regenerations": world.regenerations() }),
                        )
                        .seed(seed)
                        .tick(world.tick_count()),
                    );
                }
                if world.tick_count() % every == 0 {
                    let payload = json!({ "type": "state", "snapshot": world.snapshot() });
                    let line = format!("{payload}\n");
                    if stdout.write_all(line.as_bytes()).await.is_err() {
                        break;
                    }
                    if stdout.flush().await.is_err() {
                        break;
                    }
                }
                if cli.frames.is_some_and(|frames| world.tick_count() >= frames) {
                    break;
                }
            }
        }
    }

    emit_log(
        LogLine::new(
            LogLevel::Info,
            "run_finished",
            json!({
                "score": world.pacman().score,
                "regenerations": world.regenerations(),
            }),
        )
        .seed(seed)
        .tick(world.tick_count()),
    );
}

fn build_world(path: Option<&Path>, seed: u32) -> Result<World, GameError> {
    let config = match path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    World::new(config, seed)
}

async fn read_commands(tx: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some(command) = parse_command(trimmed) else {
            emit_log(LogLine::new(
                LogLevel::Warn,
                "input_ignored",
                json!({ "input": trimmed }),
            ));
            continue;
        };
        let quit = command == Command::Quit;
        if tx.send(command).await.is_err() || quit {
            return;
        }
    }
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let first = parts.next()?;
    if matches!(first.to_ascii_lowercase().as_str(), "q" | "quit") {
        return Some(Command::Quit);
    }
    let command = match parts.next() {
        None => Command::Steer(Role::Pacman, Direction::parse_move(first)?),
        Some(dir) => Command::Steer(Role::parse(first)?, Direction::parse_move(dir)?),
    };
    if parts.next().is_some() {
        return None;
    }
    Some(command)
}
