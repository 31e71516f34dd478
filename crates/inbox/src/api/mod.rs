//! Remote inbox service integration
//!
//! This module provides:
//! - The `InboxApi` trait the session controller talks to
//! - An HTTP client for the hosted inbox service
//! - An in-memory fake of the service for tests and demos
//! - Response normalization to domain models

mod client;
mod memory;
mod normalize;

pub use client::HttpInbox;
pub use memory::{Endpoint, InMemoryInbox, ReplyGate};
pub use normalize::{normalize_thread, normalize_threads};

use crate::auth::AuthToken;
use crate::models::{ReplyPayload, Thread, ThreadId};

/// Status value the service puts in every successful envelope
pub const STATUS_OK: i64 = 200;

/// Failure talking to the inbox service
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("request failed: {0}")]
    Transport(String),
    /// The transport-level response was not a success
    #[error("server responded with HTTP {0}")]
    Http(u16),
    /// The envelope's `status` field was not 200
    #[error("{}", .message.as_deref().unwrap_or("unexpected response status"))]
    Status {
        status: Option<i64>,
        message: Option<String>,
    },
    /// The body could not be understood
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Whether the request failed before any response arrived
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

/// Operations the session controller needs from the inbox service
///
/// Implementations are synchronous so they can run on any executor or a
/// plain background thread.
pub trait InboxApi: Send + Sync {
    /// `GET /list`
    fn list_threads(&self, token: &AuthToken) -> Result<Vec<Thread>, ApiError>;

    /// `DELETE /messages/{threadId}`
    fn delete_thread(&self, token: &AuthToken, id: &ThreadId) -> Result<(), ApiError>;

    /// `GET /reset`, returning the service's message
    fn reset(&self, token: &AuthToken) -> Result<String, ApiError>;

    /// `POST /reply/{threadId}`
    fn send_reply(
        &self,
        token: &AuthToken,
        id: &ThreadId,
        payload: &ReplyPayload,
    ) -> Result<(), ApiError>;
}

/// Inbox service wire types
pub mod wire {
    use serde::Deserialize;
    use serde_json::Value;

    use super::{ApiError, STATUS_OK};
    use crate::models::References;

    /// Envelope wrapping every response: `{status, data, message}`
    #[derive(Debug, Deserialize)]
    pub struct Envelope {
        #[serde(default)]
        pub status: Option<i64>,
        #[serde(default)]
        pub data: Option<Value>,
        #[serde(default)]
        pub message: Option<String>,
    }

    impl Envelope {
        /// Check the logical status, yielding the `data` field on success
        pub fn into_data(self) -> Result<Option<Value>, ApiError> {
            if self.status == Some(STATUS_OK) {
                Ok(self.data)
            } else {
                Err(ApiError::Status {
                    status: self.status,
                    message: self.message,
                })
            }
        }
    }

    /// Thread id as sent by the service: sometimes a string, sometimes a number
    #[derive(Debug, Clone, Deserialize)]
    #[serde(untagged)]
    pub enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    impl RawId {
        pub fn into_string(self) -> String {
            match self {
                RawId::Text(s) => s,
                RawId::Number(n) => n.to_string(),
            }
        }
    }

    /// A thread exactly as the service returns it, legacy aliases included
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RawThread {
        pub thread_id: Option<RawId>,
        pub id: Option<RawId>,
        pub subject: Option<String>,
        pub preview_text: Option<String>,
        pub snippet: Option<String>,
        pub from_address: Option<String>,
        pub from: Option<String>,
        pub from_email: Option<String>,
        pub from_name: Option<String>,
        pub message_id: Option<String>,
        pub references: Option<References>,
    }
}

#[cfg(test)]
mod tests {
    use super::wire::Envelope;
    use super::*;

    #[test]
    fn test_envelope_ok() {
        let env: Envelope = serde_json::from_str(r#"{"status":200,"data":[1,2]}"#).unwrap();
        let data = env.into_data().unwrap();
        assert!(data.unwrap().is_array());
    }

    #[test]
    fn test_envelope_bad_status_keeps_message() {
        let env: Envelope =
            serde_json::from_str(r#"{"status":401,"message":"Token expired"}"#).unwrap();
        let err = env.into_data().unwrap_err();
        assert!(matches!(err, ApiError::Status { status: Some(401), .. }));
        assert_eq!(err.to_string(), "Token expired");
    }

    #[test]
    fn test_envelope_missing_status_is_failure() {
        let env: Envelope = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(env.into_data().is_err());
    }

    #[test]
    fn test_transport_classification() {
        assert!(ApiError::Transport("dns".into()).is_transport());
        assert!(!ApiError::Http(500).is_transport());
    }
}
