use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gel_control::{AutopilotController, CommandSource};
use gel_core::{Event, EventEnvelope, EventLevel, Game, Snapshot};
use gel_world::{build_initial_state, load_content, load_state, save_state};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "gel_cli", about = "Gelmark idle game batch runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the game under autopilot for a fixed number of ticks.
    Run {
        #[arg(long)]
        ticks: u64,
        /// Start a fresh game with this seed. Mutually exclusive with --state.
        #[arg(long, conflicts_with = "state_file")]
        seed: Option<u64>,
        /// Load initial GameState from a JSON file. Mutually exclusive with --seed.
        #[arg(long = "state", conflicts_with = "seed")]
        state_file: Option<PathBuf>,
        /// Write the final GameState to this JSON file.
        #[arg(long = "save")]
        save_file: Option<PathBuf>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long, default_value_t = 50)]
        print_every: u64,
        #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
        event_level: String,
        /// Stop as soon as the boss falls.
        #[arg(long)]
        until_boss: bool,
    },
}

struct RunArgs {
    ticks: u64,
    seed: Option<u64>,
    state_file: Option<PathBuf>,
    save_file: Option<PathBuf>,
    content_dir: String,
    print_every: u64,
    event_level: EventLevel,
    until_boss: bool,
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn run(args: &RunArgs) -> Result<()> {
    let content = load_content(&args.content_dir)?;

    let state = if let Some(path) = &args.state_file {
        load_state(path, &content)?
    } else {
        let seed = args.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        build_initial_state(&content, seed, &mut rng)
    };

    let elapsed_secs = content.constants.tick_secs;
    let mut game = Game::new(state, content).with_event_level(args.event_level);
    let mut autopilot = AutopilotController;
    let mut next_command_id = game.state().counters.next_command_id;
    let print_every = args.print_every.max(1);

    println!(
        "Starting game: ticks={} seed={} session={} content_version={}",
        args.ticks,
        game.state().meta.seed,
        game.state().meta.session_id,
        game.content().content_version,
    );
    println!("{}", "-".repeat(80));

    for _ in 0..args.ticks {
        let commands =
            autopilot.generate_commands(game.state(), game.content(), &mut next_command_id);
        let events = game.tick(&commands, elapsed_secs);

        let mut boss_down = false;
        for event in &events {
            boss_down |= matches!(event.event, Event::BossDefeated { .. });
            log_event(event);
        }

        if game.state().meta.tick % print_every == 0 {
            print_status(&game.snapshot());
        }
        if boss_down && args.until_boss {
            break;
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at tick {}:", game.state().meta.tick);
    print_status(&game.snapshot());

    let mut state = game.into_state();
    state.counters.next_command_id = next_command_id;
    if let Some(path) = &args.save_file {
        save_state(path, &state)?;
        println!("State written to {}", path.display());
    }
    Ok(())
}

fn log_event(envelope: &EventEnvelope) {
    let tick = envelope.tick;
    match &envelope.event {
        Event::TraitUnlocked { name } => tracing::info!(tick, %name, "trait unlocked"),
        Event::TitleEarned {
            title,
            total_stats,
            token,
        } => {
            tracing::info!(tick, %title, total_stats, %token, "title earned");
        }
        Event::ChapterCompleted { chapter } => tracing::info!(tick, chapter, "chapter completed"),
        Event::BossEngaged { boss, .. } => tracing::info!(tick, %boss, "boss engaged"),
        Event::BossDefeated { boss } => tracing::info!(tick, %boss, "boss defeated"),
        Event::LoopAdvanced { loop_count } => tracing::info!(tick, loop_count, "loop advanced"),
        Event::CommandRejected { command_id, reason } => {
            tracing::warn!(tick, %command_id, %reason, "command rejected");
        }
        other => tracing::debug!(tick, event = ?other),
    }
}

fn print_status(snap: &Snapshot) {
    let task = snap.active_task.as_ref().map_or_else(
        || "idle".to_string(),
        |t| format!("{} ({}/{})", t.name, t.remaining, t.duration_ticks),
    );
    let boss = if snap.boss_defeated {
        "defeated"
    } else if snap.boss_engaged {
        "engaged"
    } else if snap.boss_unlocked {
        "unlocked"
    } else {
        "locked"
    };
    let stats: Vec<String> = snap
        .stats
        .iter()
        .map(|(stat, value)| format!("{stat}={value}"))
        .collect();

    println!(
        "[tick={tick:05}]  sill={sill:5.1}/{cap:.0}  gel={gel:4}  loop={loop_count}  \
         boss={boss}  title=\"{title}\"  stats=[{stats}]  task={task}",
        tick = snap.tick,
        sill = snap.sill,
        cap = snap.sill_cap,
        gel = snap.gel,
        loop_count = snap.loop_count,
        title = snap.level.title,
        stats = stats.join(" "),
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            seed,
            state_file,
            save_file,
            content_dir,
            print_every,
            event_level,
            until_boss,
        } => {
            let event_level = match event_level.as_str() {
                "debug" => EventLevel::Debug,
                _ => EventLevel::Normal,
            };
            run(&RunArgs {
                ticks,
                seed,
                state_file,
                save_file,
                content_dir,
                print_every,
                event_level,
                until_boss,
            })?;
        }
    }
    Ok(())
}
