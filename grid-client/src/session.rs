//! Session persistence
//!
//! A logged-in session is identified by the `session_id` cookie and the
//! anti-forgery token scraped from the login form. Both are stored as JSON
//! so the miner can reuse them without logging in again.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ClientError, Result};

/// Credentials of an established Microgrid session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub token: String,
}

impl Session {
    pub fn new(session_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            token: token.into(),
        }
    }

    /// Reads a session from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ClientError::SessionFile(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&raw)
            .map_err(|e| ClientError::SessionFile(format!("{}: {}", path.display(), e)))
    }

    /// Writes the session to a JSON file, replacing any previous one
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| ClientError::SessionFile(e.to_string()))?;

        tokio::fs::write(path, raw)
            .await
            .map_err(|e| ClientError::SessionFile(format!("{}: {}", path.display(), e)))
    }

    /// Value for the `Cookie` request header
    pub fn cookie(&self) -> String {
        format!("session_id={}", self.session_id)
    }
}
