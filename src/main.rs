//! Hand Cricket - Unified CLI
//!
//! Runs the HTTP game server or the console game.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use hand_cricket::{AppState, Console, GameEngine, ServerConfig, router};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ServerConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Serve { port, host } => run_http_server(config.with_bind(host, port)).await,
        Command::Play => run_console(config),
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hand_cricket=debug"))
}

/// Run the HTTP game server
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
async fn run_http_server(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    info!("Starting Hand Cricket HTTP server");

    let state = AppState::new(config.session_store(), GameEngine::new(config.rules()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(
        capacity = config.capacity(),
        timeout_secs = config.session_timeout_secs(),
        hard_policy = %config.hard_policy(),
        "✅ Server ready at http://{}:{}/",
        config.host(),
        config.port()
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the console game on stdin/stdout, logging to stderr
fn run_console(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdin = std::io::stdin();
    let mut console = Console::new(
        stdin.lock(),
        std::io::stdout(),
        rand::thread_rng(),
        GameEngine::new(config.rules()),
    );
    console.run()?;
    Ok(())
}
