//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod auth;
mod session;

pub use session::SessionCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Log in and save the session for the miner
    Login {
        /// Where to write the captcha image
        #[arg(long, default_value = "captcha.png")]
        captcha_file: String,
    },
    /// Log out and remove the saved session
    Logout,
    /// Inspect the saved session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Login { captcha_file } => auth::login(config, &captcha_file).await,
        Commands::Logout => auth::logout(config).await,
        Commands::Session { command } => session::handle_session_command(command, config).await,
    }
}
