//! Errors surfaced through the session's `last_error`

use crate::api::ApiError;

/// Category of a session failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never completed
    Transport,
    /// A response arrived but reported failure or could not be understood
    Logical,
    /// Rejected locally before any request was made
    Validation,
    /// A reply is already being sent
    Busy,
}

/// A failed session operation, already phrased for the user
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SessionError {
    kind: ErrorKind,
    message: String,
}

impl SessionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Wrap a service failure, prefixed with what was being attempted
    pub fn from_api(context: &str, err: &ApiError) -> Self {
        let kind = if err.is_transport() {
            ErrorKind::Transport
        } else {
            ErrorKind::Logical
        };
        Self::new(kind, format!("{}: {}", context, err))
    }

    pub fn empty_draft() -> Self {
        Self::new(ErrorKind::Validation, "Reply cannot be empty")
    }

    pub fn thread_not_found() -> Self {
        Self::new(ErrorKind::Validation, "Selected thread not found")
    }

    pub fn invalid_address() -> Self {
        Self::new(ErrorKind::Validation, "Invalid 'from' or 'to' email address")
    }

    pub fn reply_in_progress() -> Self {
        Self::new(ErrorKind::Busy, "A reply is already being sent")
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
