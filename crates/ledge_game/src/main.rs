//! Ledge -- headless game runner.
//!
//! Loads a level into a `LevelSession` and drives it at a fixed tick rate
//! (see `TimeState`):
//!
//!   1. Each tick, the held keys for that tick (from a replay file, or none)
//!      are synced into `InputState`, producing press/release edges exactly
//!      like a live keyboard.
//!   2. `LevelSession::tick` runs enemies, player, projectiles and camera.
//!   3. Events are tallied for the end-of-run summary.
//!
//! Without `--realtime` ticks run back to back; with it the loop is paced to
//! wall-clock time.

mod camera;
mod config;
mod enemy;
mod entity;
mod physics;
mod player;
mod projectile;
mod replay;
mod session;

use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ledge_core::input::{InputState, Key};
use ledge_core::time::TimeState;

use config::{load_config_from_path, GameConfig};
use entity::GameEvent;
use replay::load_replay_from_path;
use session::LevelSession;

const DEFAULT_LEVEL_PATH: &str = "data/levels/0.json";
const DEFAULT_TICKS: u64 = 600;

#[derive(Debug, Parser)]
#[command(name = "ledge_game", about = "Run a level headlessly")]
struct Args {
    /// Level file to play.
    #[arg(long, default_value = DEFAULT_LEVEL_PATH)]
    level: PathBuf,
    /// Optional JSON file overriding game tunables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Replay file supplying held keys per tick.
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Number of ticks to run. Defaults to the replay length, or 600.
    #[arg(long)]
    ticks: Option<u64>,
    /// Pace ticks to wall-clock time instead of running flat out.
    #[arg(long)]
    realtime: bool,
}

fn event_name(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::Jumped { .. } => "jumped",
        GameEvent::WallKicked { .. } => "wall_kicked",
        GameEvent::DashStarted { .. } => "dash_started",
        GameEvent::Shot { .. } => "shot",
        GameEvent::ProjectileHit { .. } => "projectile_hit",
        GameEvent::PlayerHit { .. } => "player_hit",
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => GameConfig::default(),
    };
    let held_per_tick: Vec<Vec<Key>> = match &args.replay {
        Some(path) => {
            let replay = load_replay_from_path(path)?;
            log::info!(
                "Loaded replay {} ({} ticks)",
                path.display(),
                replay.tick_count()
            );
            replay.expanded_held()
        }
        None => Vec::new(),
    };
    let total_ticks = args.ticks.unwrap_or(if held_per_tick.is_empty() {
        DEFAULT_TICKS
    } else {
        held_per_tick.len() as u64
    });

    let mut session = LevelSession::load(&args.level, config)?;
    let mut time = TimeState::with_tick_rate(config.tick_hz);
    let mut input = InputState::new();
    let mut event_counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    let idle: Vec<Key> = Vec::new();

    log::info!(
        "Running {} ticks at {} Hz ({})",
        total_ticks,
        config.tick_hz,
        if args.realtime { "realtime" } else { "headless" }
    );

    'frames: while session.tick_count() < total_ticks {
        if args.realtime {
            time.begin_frame();
        } else {
            time.feed(time.fixed_dt);
        }

        while time.should_step() {
            let tick = session.tick_count() as usize;
            let held = held_per_tick.get(tick).unwrap_or(&idle);
            input.sync_held(held);
            if input.is_just_pressed(Key::Escape) {
                log::info!("Escape pressed at tick {tick}, stopping");
                break 'frames;
            }

            let report = session.tick(input.player_intent());
            log::trace!(
                "tick {}: player {} at ({:.1}, {:.1}), {} enemies",
                report.tick,
                report.player.action,
                report.player.position.x,
                report.player.position.y,
                report.enemies.len()
            );
            for event in &report.events {
                log::debug!("tick {}: {:?}", report.tick, event);
                *event_counts.entry(event_name(event)).or_default() += 1;
            }
            input.end_frame();

            if session.tick_count() >= total_ticks {
                break 'frames;
            }
        }

        if args.realtime {
            std::thread::sleep(time.until_next_tick());
        }
    }

    let player = &session.player;
    log::info!(
        "Finished after {} ticks: player at ({:.1}, {:.1}) state {:?}, hit {} times",
        session.tick_count(),
        player.body.position.x,
        player.body.position.y,
        player.state,
        session.player_hits
    );
    let (scroll_x, scroll_y) = session.camera.render_scroll();
    log::info!(
        "Camera at ({scroll_x}, {scroll_y}): {} enemies, {} projectiles in flight, {} leaf emitters, {} tiles on screen",
        session.enemies.len(),
        session.projectiles.len(),
        session.leaf_emitters.len(),
        session.visible_tiles().len()
    );
    for (name, count) in &event_counts {
        log::info!("  {name}: {count}");
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
