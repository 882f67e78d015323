//! Grid CLI
//!
//! Command-line interface for managing the Microgrid session used by the miner.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grid")]
#[command(about = "Microgrid session management", long_about = None)]
struct Cli {
    /// Site URL
    #[arg(long, env = "MICROGRID_URL", default_value = grid_client::DEFAULT_BASE_URL)]
    url: String,

    /// Where the session is stored
    #[arg(long, env = "MICROGRID_SESSION_FILE", default_value = "session.json")]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        base_url: cli.url,
        session_file: cli.session_file,
    };

    handle_command(cli.command, &config).await
}
