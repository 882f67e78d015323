//! Repository error types
//!
//! Every failure a task source or result sink can report is classified
//! into a [`FailureKind`], which decides how the scheduler reacts.

use grid_client::ClientError;
use thiserror::Error;

/// How a failed remote call should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Retried with a fixed cooldown until the attempt budget runs out
    Transient,
    /// Not retried; ends the lane that hit it
    Protocol,
    /// Not retried; ends the whole run
    Auth,
}

/// Errors that carry a [`FailureKind`]
pub trait Classify {
    fn kind(&self) -> FailureKind;
}

/// Failure to obtain the next task
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("session expired")]
    AuthExpired,

    #[error("malformed task response: {0}")]
    MalformedResponse(String),

    #[error("task source unavailable: {0}")]
    Unavailable(String),
}

impl Classify for FetchError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::AuthExpired => FailureKind::Auth,
            Self::MalformedResponse(_) => FailureKind::Protocol,
            Self::Unavailable(_) => FailureKind::Transient,
        }
    }
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        if err.is_auth_error() {
            Self::AuthExpired
        } else if err.is_transient() {
            Self::Unavailable(err.to_string())
        } else {
            Self::MalformedResponse(err.to_string())
        }
    }
}

/// Failure to store a computed result
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session expired")]
    AuthExpired,

    #[error("result rejected: protocol version mismatch")]
    VersionMismatch,

    #[error("result rejected: {0}")]
    Rejected(String),

    #[error("result sink unavailable: {0}")]
    Unavailable(String),
}

impl Classify for StoreError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::AuthExpired => FailureKind::Auth,
            Self::VersionMismatch | Self::Rejected(_) => FailureKind::Protocol,
            Self::Unavailable(_) => FailureKind::Transient,
        }
    }
}

impl From<ClientError> for StoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::WrongVersion => Self::VersionMismatch,
            err if err.is_auth_error() => Self::AuthExpired,
            err @ ClientError::Encode(_) => Self::Rejected(err.to_string()),
            err if err.is_client_error() => Self::Rejected(err.to_string()),
            // Unrecognised store answers are retried like outages.
            err => Self::Unavailable(err.to_string()),
        }
    }
}
