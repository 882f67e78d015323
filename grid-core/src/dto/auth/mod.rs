//! Authentication DTOs

use serde::{Deserialize, Serialize};

use super::FormAction;

/// Credentials posted to log a session in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Login {
    pub login: String,
    pub password: String,
    pub captcha: String,
}

impl FormAction for Login {
    const ACTION: &'static str = "login";

    fn fields(&self) -> serde_json::Result<Vec<(&'static str, String)>> {
        Ok(vec![
            ("login", self.login.clone()),
            ("password", self.password.clone()),
            ("captcha_code", self.captcha.clone()),
        ])
    }
}

/// Request to end the current session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Logout;

impl FormAction for Logout {
    const ACTION: &'static str = "logout";

    fn fields(&self) -> serde_json::Result<Vec<(&'static str, String)>> {
        Ok(Vec::new())
    }
}
