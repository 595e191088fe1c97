//! notetree CLI - browse and edit a notetree service from the terminal
//!
//! Notes are shown as a tree; `notes watch` keeps a local file synced back to
//! the service while it is being edited.

mod cli;
mod commands;
mod config_file;
mod error;
mod navigator;
mod store;


use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::auth::run_auth;
use crate::commands::config::run_config;
use crate::commands::fetch::run_fetch;
use crate::commands::notes::run_notes;
use crate::commands::user::run_user;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("notetree=info".parse().map_err(|error| {
                    CliError::Config(format!("invalid log directive: {error}"))
                })?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let base_url = cli.base_url.as_deref();

    match cli.command {
        Commands::Config { command } => run_config(command, base_url)?,
        Commands::Auth { command } => run_auth(command, base_url).await?,
        Commands::Notes { command } => run_notes(command, base_url).await?,
        Commands::User { command } => run_user(command, base_url).await?,
        Commands::Fetch { path } => run_fetch(&path, base_url).await?,
    }

    Ok(())
}
