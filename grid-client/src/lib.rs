//! Microgrid HTTP Client
//!
//! A small, typed client for the Microgrid volunteer computing site.
//!
//! The site exposes a single form endpoint: every call is a URL-encoded
//! POST to the base URL carrying an `action`, the session `token` and the
//! action's own fields, authenticated by the `session_id` cookie.
//!
//! # Example
//!
//! ```no_run
//! use grid_client::{MicrogridClient, Session};
//!
//! # async fn example() -> grid_client::Result<()> {
//! let session = Session::load("session.json").await?;
//! let client = MicrogridClient::new("https://microgrid.arikado.ru/").with_session(session);
//!
//! let task = client.get_new_task(1).await?;
//! println!("Got task {} ({}..{})", task.uid, task.start_number, task.stop_number);
//! # Ok(())
//! # }
//! ```

mod auth;
pub mod error;
mod session;
mod tasks;

pub use auth::LoginOutcome;
pub use error::{ClientError, Result};
pub use session::Session;

use grid_core::dto::FormAction;
use reqwest::header::COOKIE;
use reqwest::{Client, redirect};
use tracing::debug;

/// Default address of the Microgrid site
pub const DEFAULT_BASE_URL: &str = "https://microgrid.arikado.ru/";

/// HTTP client for the Microgrid site
#[derive(Debug, Clone)]
pub struct MicrogridClient {
    /// Base URL of the site, always ending with a single `/`
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Session used for authenticated calls
    session: Option<Session>,
}

impl MicrogridClient {
    /// Create a new client
    ///
    /// Redirects are not followed: the site reports login results through
    /// cookies on the redirect response itself.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`reqwest::Client::new`], when
    /// no TLS backend can be initialised.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .expect("TLS backend cannot be initialized");
        Self::with_client(base_url, client)
    }

    /// Create a new client with a custom HTTP client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: format!("{}/", base_url.trim_end_matches('/')),
            client,
            session: None,
        }
    }

    /// Attach a session for authenticated calls
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Get the base URL of the site
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the attached session, if any
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(ClientError::MissingSession)
    }

    // =============================================================================
    // Request Helpers
    // =============================================================================

    /// Post a form action with the session cookie and token
    async fn post_action<A: FormAction>(&self, request: &A) -> Result<reqwest::Response> {
        let session = self.require_session()?;

        let mut form = vec![
            ("action", A::ACTION.to_string()),
            ("token", session.token.clone()),
        ];
        form.extend(request.fields()?);

        debug!("POST action={}", A::ACTION);

        let response = self
            .client
            .post(&self.base_url)
            .header(COOKIE, session.cookie())
            .form(&form)
            .send()
            .await?;

        Ok(response)
    }

    /// Read a response body, failing on error status codes
    ///
    /// Redirects count as success since the site answers form posts with them.
    async fn read_body(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if !status.is_success() && !status.is_redirection() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.text().await?)
    }
}

/// Body the site answers with when the session token does not match
pub(crate) const WRONG_TOKEN_BODY: &str = "Wrong token";
