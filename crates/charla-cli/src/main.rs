//! Charla terminal chat client entry point.
//!
//! Binary name: `charla`
//!
//! Parses CLI arguments, initializes the local database and the chat
//! orchestrator, then dispatches to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,charla=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Initialize application state (DB, token store, gateway, orchestrator)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Register { username, email } => {
            cli::auth::register(&state, username, email, cli.json).await?;
        }

        Commands::Login { username } => {
            cli::auth::login(&state, username, cli.json).await?;
        }

        Commands::Logout => {
            cli::auth::logout(&state, cli.json).await?;
        }

        Commands::Whoami => {
            cli::auth::whoami(&state, cli.json).await?;
        }

        Commands::Chats => {
            cli::chats::list_chats(&state, cli.json).await?;
        }

        Commands::Chat { anonymous } => {
            cli::chat::run_chat_loop(&state, anonymous).await?;
        }
    }

    Ok(())
}
