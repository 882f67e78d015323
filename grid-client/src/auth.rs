//! Session bootstrap and authentication
//!
//! Logging in is a three step dance with the site:
//! 1. `GET /` hands out a `session_id` cookie
//! 2. `GET /?ajax=1&block=login` renders the login form holding the token
//! 3. `POST action=login` with credentials and the captcha answer
//!
//! The outcome of form posts is reported through a `message` cookie.

use grid_core::dto::auth::{Login, Logout};
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, SET_COOKIE};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::{MicrogridClient, Session, WRONG_TOKEN_BODY};

static TOKEN_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input type=hidden name=token value='([^']*)'>"#)
        .expect("token pattern is valid")
});

/// Outcome of a login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Successful,
    InvalidCaptcha,
    WrongToken,
    Failed,
}

impl MicrogridClient {
    /// Open a fresh, not yet logged-in session
    pub async fn start_session(&self) -> Result<Session> {
        let response = self.client.get(&self.base_url).send().await?;
        let session_id = cookie_value(response.headers(), "session_id")
            .ok_or_else(|| ClientError::HandshakeFailed("no session_id cookie".to_string()))?;

        debug!("Obtained session id, fetching login token");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("ajax", "1"), ("block", "login")])
            .header(COOKIE, format!("session_id={}", session_id))
            .send()
            .await?;
        let body = self.read_body(response).await?;

        let token = extract_token(&body)
            .ok_or_else(|| ClientError::HandshakeFailed("login token not found".to_string()))?;

        info!("Initialized new session");
        Ok(Session::new(session_id, token))
    }

    /// Download the captcha image bound to the current session
    pub async fn captcha(&self) -> Result<Vec<u8>> {
        let session = self.require_session()?;
        let url = format!("{}?captcha", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(COOKIE, session.cookie())
            .send()
            .await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if content_type != "image/png" {
            return Err(ClientError::UnexpectedContent {
                expected: "image/png",
                actual: content_type,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Log the current session in
    pub async fn login(&self, credentials: &Login) -> Result<LoginOutcome> {
        let response = self.post_action(credentials).await?;
        let message = cookie_value(response.headers(), "message");
        let body = self.read_body(response).await?;

        if body.trim() == WRONG_TOKEN_BODY {
            return Ok(LoginOutcome::WrongToken);
        }

        Ok(match message.as_deref() {
            Some("login_successful") => LoginOutcome::Successful,
            Some("login_failed_invalid_captcha") => LoginOutcome::InvalidCaptcha,
            _ => LoginOutcome::Failed,
        })
    }

    /// Log the current session out
    ///
    /// Returns `true` when the site confirmed the logout.
    pub async fn logout(&self) -> Result<bool> {
        let response = self.post_action(&Logout).await?;
        let message = cookie_value(response.headers(), "message");
        let body = self.read_body(response).await?;

        if body.trim() == WRONG_TOKEN_BODY {
            return Err(ClientError::WrongToken);
        }

        Ok(message.as_deref() == Some("logout_successful"))
    }
}

/// Find a cookie value among all `Set-Cookie` headers
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
}

fn extract_token(body: &str) -> Option<String> {
    TOKEN_INPUT
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("theme=dark; Path=/"),
        );
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("message=login_successful; Path=/; HttpOnly"),
        );

        assert_eq!(
            cookie_value(&headers, "message").as_deref(),
            Some("login_successful")
        );
        assert_eq!(cookie_value(&headers, "session_id"), None);
    }

    #[test]
    fn test_extract_token() {
        let body = "<form><input type=hidden name=token value='f00ba4'><input name=login></form>";
        assert_eq!(extract_token(body).as_deref(), Some("f00ba4"));
        assert_eq!(extract_token("<form></form>"), None);
    }

    #[tokio::test]
    async fn test_start_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_header("set-cookie", "session_id=s3ss; Path=/")
            .with_body("<input type=hidden name=token value='t0k'>")
            .expect(2)
            .create_async()
            .await;

        let session = MicrogridClient::new(server.url())
            .start_session()
            .await
            .unwrap();

        assert_eq!(session, Session::new("s3ss", "t0k"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_start_session_without_cookie() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/").create_async().await;

        let err = MicrogridClient::new(server.url())
            .start_session()
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::HandshakeFailed(_)));
    }

    fn credentials() -> Login {
        Login {
            login: "alice".to_string(),
            password: "secret".to_string(),
            captcha: "1234".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_successful() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "login".into()),
                Matcher::UrlEncoded("captcha_code".into(), "1234".into()),
            ]))
            .with_status(302)
            .with_header("set-cookie", "message=login_successful")
            .create_async()
            .await;

        let client = MicrogridClient::new(server.url()).with_session(Session::new("s", "t"));

        assert_eq!(
            client.login(&credentials()).await.unwrap(),
            LoginOutcome::Successful
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_reads_cookie_from_redirect_itself() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(302)
            .with_header("location", "/landing")
            .with_header("set-cookie", "message=login_successful")
            .create_async()
            .await;
        let landing = server
            .mock("GET", "/landing")
            .with_header("set-cookie", "message=other")
            .expect(0)
            .create_async()
            .await;

        let client = MicrogridClient::new(server.url()).with_session(Session::new("s", "t"));

        assert_eq!(
            client.login(&credentials()).await.unwrap(),
            LoginOutcome::Successful
        );
        landing.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_invalid_captcha() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_header("set-cookie", "message=login_failed_invalid_captcha")
            .create_async()
            .await;

        let client = MicrogridClient::new(server.url()).with_session(Session::new("s", "t"));

        assert_eq!(
            client.login(&credentials()).await.unwrap(),
            LoginOutcome::InvalidCaptcha
        );
    }

    #[tokio::test]
    async fn test_login_wrong_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body("Wrong token")
            .create_async()
            .await;

        let client = MicrogridClient::new(server.url()).with_session(Session::new("s", "t"));

        assert_eq!(
            client.login(&credentials()).await.unwrap(),
            LoginOutcome::WrongToken
        );
    }

    #[tokio::test]
    async fn test_captcha_requires_png() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_header("content-type", "text/html")
            .with_body("nope")
            .create_async()
            .await;

        let client = MicrogridClient::new(server.url()).with_session(Session::new("s", "t"));
        let err = client.captcha().await.unwrap_err();

        assert!(matches!(err, ClientError::UnexpectedContent { .. }));
    }
}
