//! Session command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use grid_client::Session;

use crate::config::Config;

/// Session subcommands
#[derive(Subcommand)]
pub enum SessionCommands {
    /// Show the saved session
    Show,
}

/// Handle session commands
pub async fn handle_session_command(command: SessionCommands, config: &Config) -> Result<()> {
    match command {
        SessionCommands::Show => show_session(config).await,
    }
}

async fn show_session(config: &Config) -> Result<()> {
    let session = Session::load(&config.session_file)
        .await
        .context("No saved session, run `grid login` first")?;

    println!("{}", describe(&session, config));
    Ok(())
}

fn describe(session: &Session, config: &Config) -> String {
    format!(
        "  {} Session {}\n    File:  {}\n    Site:  {}",
        "▸".cyan(),
        session.session_id.bold(),
        config.session_file.display(),
        config.base_url.dimmed()
    )
}
