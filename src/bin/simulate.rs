use chrono::{SecondsFormat, Utc};
use clap::Parser;
use infinite_packman::config::GameConfig;
use infinite_packman::constants::{chaser_speed_divisor, MAZE_BORDER};
use infinite_packman::engine::World;
use infinite_packman::error::GameError;
use infinite_packman::log::{emit_log, LogLevel, LogLine};
use infinite_packman::rng::Rng;
use infinite_packman::types::{Direction, GhostKind, Role};
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

const AUTOPILOT_TURN_CHANCE: f32 = 0.1;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// Consecutive seeds to run, starting at `--seed`.
    #[arg(long, default_value_t = 1)]
    runs: u32,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    seed: u32,
    ticks: u64,
    score: u32,
    regenerations: u64,
    #[serde(rename = "foodRemaining")]
    food_remaining: usize,
    #[serde(rename = "chaserDivisor")]
    chaser_divisor: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct RunOutcome {
    result: RunResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Debug, Default)]
struct AnomalyLog {
    records: Vec<AnomalyRecord>,
    distinct: Vec<String>,
    seen: HashSet<String>,
}

impl AnomalyLog {
    fn push(&mut self, tick: u64, message: String) {
        if self.seen.insert(message.clone()) {
            self.distinct.push(message.clone());
        }
        self.records.push(AnomalyRecord { tick, message });
    }
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "totalRegenerations")]
    total_regenerations: u64,
    runs: Vec<RunResultLine>,
}

fn main() {
    let cli = Cli::parse();
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            emit_log(LogLine::new(
                LogLevel::Error,
                "fatal",
                json!({ "error": error.to_string() }),
            ));
            std::process::exit(2);
        }
    };

    let started_at = timestamp();
    let first_seed = resolve_seed(cli.seed);
    let mut has_anomaly = false;
    let mut total_anomalies = 0usize;
    let mut results = Vec::new();

    for offset in 0..cli.runs {
        let seed = first_seed.wrapping_add(offset);
        emit_log(
            LogLine::new(LogLevel::Info, "run_started", json!({ "ticks": cli.ticks })).seed(seed),
        );
        let outcome = match run_simulation(&config, seed, cli.ticks) {
            Ok(outcome) => outcome,
            Err(error) => {
                emit_log(
                    LogLine::new(LogLevel::Error, "fatal", json!({ "error": error.to_string() }))
                        .seed(seed),
                );
                std::process::exit(2);
            }
        };

        for anomaly in &outcome.anomaly_records {
            emit_log(
                LogLine::new(
                    LogLevel::Warn,
                    "anomaly_detected",
                    json!({ "message": anomaly.message }),
                )
                .seed(seed)
                .tick(anomaly.tick),
            );
        }
        if !outcome.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += outcome.anomaly_records.len();

        emit_log(
            LogLine::new(
                LogLevel::Info,
                "run_finished",
                json!({
                    "score": outcome.result.score,
                    "regenerations": outcome.result.regenerations,
                    "anomalyCount": outcome.anomaly_records.len(),
                }),
            )
            .seed(seed)
            .tick(outcome.result.ticks),
        );

        match serde_json::to_string(&outcome.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(LogLine::new(
                LogLevel::Error,
                "result_encode_failed",
                json!({ "error": error.to_string() }),
            )),
        }
        results.push(outcome.result);
    }

    let summary = build_run_summary(started_at, timestamp(), results, total_anomalies);

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(LogLine::new(
                LogLevel::Error,
                "summary_write_failed",
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            ));
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(LogLine::new(
        LogLevel::Info,
        "simulation_finished",
        json!({
            "runCount": summary.run_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "summaryOut": summary_out_written,
        }),
    ));

    if has_anomaly {
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig, GameError> {
    match path {
        Some(path) => Ok(GameConfig::load(path)?),
        None => Ok(GameConfig::default()),
    }
}

fn run_simulation(config: &GameConfig, seed: u32, ticks: u64) -> Result<RunOutcome, GameError> {
    let mut world = World::new(config.clone(), seed)?;
    let mut autopilot = Rng::new(seed ^ 0x9e37_79b9);
    emit_log(
        LogLine::new(
            LogLevel::Info,
            "world_created",
            json!({
                "width": world.maze().width(),
                "height": world.maze().height(),
                "food": world.food().remaining(),
                "nextPieceId": world.next_piece_id(),
            }),
        )
        .seed(seed),
    );

    let mut anomalies = AnomalyLog::default();

    for _ in 0..ticks {
        steer(&mut world, &mut autopilot);
        let regenerations = world.regenerations();
        world.tick()?;
        if world.regenerations() > regenerations {
            emit_log(
                LogLine::new(
                    LogLevel::Info,
                    "maze_regenerated",
                    json!({
                        "regenerations": world.regenerations(),
                        "nextPieceId": world.next_piece_id(),
                        "foodRemaining": world.food().remaining(),
                    }),
                )
                .seed(seed)
                .tick(world.tick_count()),
            );
        }
        for message in collect_world_anomalies(&world) {
            anomalies.push(world.tick_count(), message);
        }
    }

    let chaser_divisor = world
        .ghost(GhostKind::Chaser)
        .map(|ghost| ghost.mover.speed_divisor)
        .unwrap_or(0);
    Ok(RunOutcome {
        result: RunResultLine {
            seed,
            ticks: world.tick_count(),
            score: world.pacman().score,
            regenerations: world.regenerations(),
            food_remaining: world.food().remaining(),
            chaser_divisor,
            anomalies: anomalies.distinct,
        },
        anomaly_records: anomalies.records,
    })
}

fn steer(world: &mut World, rng: &mut Rng) {
    let pos = world.pacman().pos();
    let dir = world.pacman().dir();
    let open: Vec<Direction> = Direction::CARDINAL
        .into_iter()
        .filter(|candidate| world.can_enter(pos.step(*candidate)))
        .collect();
    if open.is_empty() {
        return;
    }
    if open.contains(&dir) && !rng.bool(AUTOPILOT_TURN_CHANCE) {
        return;
    }
    let forward: Vec<Direction> = open
        .iter()
        .copied()
        .filter(|candidate| *candidate != dir.opposite())
        .collect();
    let choices = if forward.is_empty() { &open } else { &forward };
    world.set_direction(Role::Pacman, choices[rng.pick_index(choices.len())]);
}

fn collect_world_anomalies(world: &World) -> Vec<String> {
    let mut anomalies = Vec::new();
    let maze = world.maze();
    let (height, width) = (maze.height() as i32, maze.width() as i32);

    let food_on_walls = (0..height)
        .flat_map(|row| (0..width).map(move |col| (row, col)))
        .filter(|&(row, col)| maze.is_wall(row, col) && world.food().has_food(row, col))
        .count();
    if food_on_walls > 0 {
        anomalies.push(format!("food on {food_on_walls} wall cells"));
    }

    let border = MAZE_BORDER as i32;
    let open_border = (0..height)
        .flat_map(|row| (0..width).map(move |col| (row, col)))
        .find(|&(row, col)| {
            let on_border =
                row < border || col < border || row >= height - border || col >= width - border;
            on_border && maze.is_walkable(row, col)
        });
    if let Some((row, col)) = open_border {
        anomalies.push(format!("walkable border cell at ({row}, {col})"));
    }

    let pacman = world.pacman().pos();
    if !maze.is_walkable_at(pacman) {
        anomalies.push(format!("pacman off floor at ({}, {})", pacman.row, pacman.col));
    }
    let pacman_region = maze.reachable_from(pacman);
    for ghost in world.ghosts() {
        let pos = ghost.pos();
        if !maze.is_walkable_at(pos) {
            anomalies.push(format!("{:?} off floor at ({}, {})", ghost.kind, pos.row, pos.col));
        } else if !pacman_region.contains(&pos) {
            anomalies.push(format!("{:?} cut off from pacman", ghost.kind));
        }
        if ghost.kind == GhostKind::Chaser {
            let expected = chaser_speed_divisor(
                ghost.base_divisor(),
                world.pacman().score,
                world.config().score_per_speedup,
            );
            if ghost.mover.speed_divisor != expected {
                anomalies.push(format!(
                    "chaser divisor {} expected {expected}",
                    ghost.mover.speed_divisor
                ));
            }
        }
    }

    if world.food().cells().len() != maze.height() {
        anomalies.push("food grid height differs from maze".to_string());
    }
    anomalies
}

fn resolve_seed(seed: Option<u64>) -> u32 {
    seed.unwrap_or_else(rand::random::<u64>) as u32
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn build_run_summary(
    started_at: String,
    finished_at: String,
    runs: Vec<RunResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let run_count = runs.len();
    let total_score: u64 = runs.iter().map(|run| run.score as u64).sum();
    let average_score = if run_count == 0 {
        0
    } else {
        (total_score / run_count as u64) as u32
    };
    RunSummary {
        started_at,
        finished_at,
        run_count,
        anomaly_count,
        average_score,
        total_regenerations: runs.iter().map(|run| run.regenerations).sum(),
        runs,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)
}
