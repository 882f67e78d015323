//! Configuration module
//!
//! Handles CLI configuration including the site URL and the session file.

use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the Microgrid site
    pub base_url: String,

    /// Session file shared with the miner
    pub session_file: PathBuf,
}
