#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line harness that runs simulated snake sessions under the
//! game-master and prints its commentary and post-mortems.

mod arena;
mod bot;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use snake_overseer::{GameMaster, OverseerConfig, SessionSummary};
use snake_overseer_core::{BoardDimensions, CommentaryEvent, SeededRandom, TerminationCause};
use snake_overseer_persistence::{load_best_effort, save_best_effort, FileStore};

use crate::{
    arena::{Arena, Step},
    bot::Bot,
};

const WORLD_SEED_SALT: u64 = 0x5eed_b0a2;
const BOT_WANDER_CHANCE: f32 = 0.08;

/// Plays automated sessions against the adaptive game-master.
#[derive(Debug, Parser)]
#[command(name = "snake-overseer", version, long_about = None)]
struct Args {
    /// Seed shared by the game-master, the board and the autopilot.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of sessions to play back to back.
    #[arg(long, default_value_t = 3)]
    sessions: u32,

    /// Maximum ticks per session before it is reset.
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Base tick interval in milliseconds, before speed changes.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Board width in cells.
    #[arg(long, default_value_t = 20)]
    width: u32,

    /// Board height in cells.
    #[arg(long, default_value_t = 20)]
    height: u32,

    /// TOML file overriding game-master tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ledger file carrying history between runs.
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Entry point for the snake overseer command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let mut master = GameMaster::new(config, SeededRandom::new(args.seed));
    let mut store = args.ledger.as_ref().map(FileStore::new);
    if let Some(store) = store.as_mut() {
        master.restore(load_best_effort(store));
    }

    let dimensions = BoardDimensions::new(args.width.max(4), args.height.max(1));
    let mut world_rng = SeededRandom::new(args.seed ^ WORLD_SEED_SALT);
    let mut bot = Bot::new(args.seed.wrapping_add(1), BOT_WANDER_CHANCE);
    let mut clock = Duration::ZERO;

    for round in 1..=args.sessions {
        println!("== session {round} ==");
        let summary = play_session(
            &mut master,
            &args,
            dimensions,
            &mut clock,
            &mut world_rng,
            &mut bot,
        )?;
        print_summary(&summary);

        if let Some(store) = store.as_mut() {
            let _ = save_best_effort(store, &summary.archive);
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<OverseerConfig> {
    let Some(path) = path else {
        return Ok(OverseerConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn play_session(
    master: &mut GameMaster,
    args: &Args,
    dimensions: BoardDimensions,
    clock: &mut Duration,
    world_rng: &mut SeededRandom,
    bot: &mut Bot,
) -> Result<SessionSummary> {
    let opening = master.on_session_start(*clock);
    print_commentary(*clock, &opening.commentary);

    let mut arena = Arena::new(dimensions, world_rng);
    tracing::info!(
        width = arena.dimensions().width(),
        height = arena.dimensions().height(),
        archetype = opening.archetype.label(),
        "board ready"
    );

    let base_tick = Duration::from_millis(args.tick_ms.max(1));
    let mut outcome = TerminationCause::ManualReset;
    for _ in 0..args.ticks {
        let snapshot = master.on_tick(*clock, &arena.board_state(false));
        print_commentary(*clock, &snapshot.commentary);

        let bundle = &snapshot.interference;
        arena.set_obstacles(&bundle.obstacles);
        let direction = bot.choose(&arena);
        let step = arena.advance(direction, bundle.placement_bias, world_rng);
        *clock += base_tick.div_f32(bundle.velocity_multiplier.get());

        match step {
            Step::Moved { ate } => {
                if ate {
                    tracing::debug!(score = arena.score(), "objective consumed");
                }
                let _ = master.on_move(*clock, arena.move_input());
            }
            Step::Died(cause) => {
                outcome = cause;
                break;
            }
            Step::Won => {
                let closing = master.on_tick(*clock, &arena.board_state(true));
                print_commentary(*clock, &closing.commentary);
                outcome = TerminationCause::Victory;
                break;
            }
        }
    }

    let summary = master
        .on_session_end(*clock, arena.score(), outcome)
        .context("game-master lost track of the running session")?;
    print_commentary(*clock, &summary.snapshot.commentary);
    Ok(summary)
}

fn print_commentary(clock: Duration, events: &[CommentaryEvent]) {
    for event in events {
        println!("[{:>7.1}s] {}", clock.as_secs_f32(), event.message);
    }
}

fn print_summary(summary: &SessionSummary) {
    let report = &summary.post_mortem;
    println!(
        "-- score {} after {:.1}s: {}",
        summary.record.final_score,
        summary.record.survival().as_secs_f32(),
        report.cause_description
    );
    if let Some(note) = &report.escalation_note {
        println!("   {note}");
    }
    println!("   {}", report.score_note);
    if let Some(recommendation) = &report.recommendation {
        println!("   {recommendation}");
    }
}
