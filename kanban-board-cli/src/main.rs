//! Kanban board CLI - ordered lists and cards in a JSON board file.
//!
//! Commands:
//! - `kanban-board init --name <name>`: Create a board file with default lists
//! - `kanban-board show`: Print the board, filtered by text, member, tag or priority
//! - `kanban-board add-list` / `update-list` / `archive-list`: Manage lists
//! - `kanban-board add-card` / `update-card` / `archive-card`: Manage cards
//! - `kanban-board move-card --card <id> --to-list <id> --index <n>`: Move a card
//! - `kanban-board move-list --list <id> --index <n>`: Reorder lists
//!
//! Every command prints a JSON outcome `{ success, message?, payload? }` on stdout.
//!
//! Exit codes:
//! - 0: Success
//! - 1: The mutation failed, or the board file could not be opened

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use kanban_board::EngineConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match EngineConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let filter = if cli.debug {
        EnvFilter::new("kanban_board=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match commands::run(&cli, config).await {
        Ok(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(text) => {
                println!("{}", text);
                if commands::succeeded(&outcome) {
                    0
                } else {
                    1
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}
