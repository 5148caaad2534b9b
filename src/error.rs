use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a session client
///
/// `Validation` is raised before any network traffic. `Remote` errors do not
/// necessarily end the session. `Timeout` is manufactured on the client side
/// and never cancels the request it was waiting on.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    Validation(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("backend reported: {0}")]
    Remote(String),

    #[error("timed out after {}s waiting for {what}", .after.as_secs_f32())]
    Timeout { what: &'static str, after: Duration },

    #[error("audio capture failed: {0}")]
    Audio(String),

    #[error("session is not connected")]
    NotConnected,

    #[error("{mode} sessions do not support {operation}")]
    Unsupported {
        mode: &'static str,
        operation: &'static str,
    },

    #[error("malformed frame: {0}")]
    Protocol(String),
}

impl SessionError {
    /// Whether the error ends the session's transport
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Connection(_) | SessionError::NotConnected)
    }
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
