mod routes;
mod state;
mod tick_loop;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use gel_control::AutopilotController;
use gel_core::{EventLevel, Game};
use gel_world::{build_initial_state, load_content, load_state};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use crate::routes::make_router_with_cors;
use crate::state::AppState;
use crate::tick_loop::run_tick_loop;

#[derive(Parser)]
#[command(name = "gel_daemon", about = "Gelmark idle game server")]
struct Args {
    #[arg(long, default_value_t = 3001)]
    port: u16,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// Start a fresh game with this seed. Mutually exclusive with --state.
    #[arg(long, conflicts_with = "state_file")]
    seed: Option<u64>,
    /// Resume from a saved GameState JSON file.
    #[arg(long = "state", conflicts_with = "seed")]
    state_file: Option<PathBuf>,
    /// Where POST /api/v1/save writes the game state.
    #[arg(long = "save")]
    save_file: Option<PathBuf>,
    /// Real-time tick rate. 0 runs as fast as possible on nominal tick time.
    #[arg(long, default_value_t = 1.0)]
    ticks_per_sec: f64,
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Let the autopilot play alongside HTTP input.
    #[arg(long)]
    autopilot: bool,
    #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
    event_level: String,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

fn build_game(args: &Args) -> Result<Game> {
    let content = load_content(&args.content_dir)?;
    let state = if let Some(path) = &args.state_file {
        load_state(path, &content)?
    } else {
        let seed = args.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        build_initial_state(&content, seed, &mut rng)
    };
    let event_level = match args.event_level.as_str() {
        "debug" => EventLevel::Debug,
        _ => EventLevel::Normal,
    };
    Ok(Game::new(state, content).with_event_level(event_level))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gel_daemon=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let cors_origin: HeaderValue = args
        .cors_origin
        .parse()
        .with_context(|| format!("invalid --cors-origin {}", args.cors_origin))?;
    let game = build_game(&args)?;
    tracing::info!(
        seed = game.state().meta.seed,
        session = %game.state().meta.session_id,
        content_version = %game.content().content_version,
        "game loaded"
    );

    let autopilot = args.autopilot.then_some(AutopilotController);
    let app_state = AppState::new(game, autopilot, args.ticks_per_sec, args.save_file.clone());

    tokio::spawn(run_tick_loop(
        app_state.sim.clone(),
        app_state.paused.clone(),
        args.ticks_per_sec,
        args.max_ticks,
    ));

    let app = make_router_with_cors(app_state, cors_origin);
    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
