//! Thread model representing a conversation in the remote inbox

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject shown for threads that have none
pub const NO_SUBJECT: &str = "(No Subject)";

/// Unique identifier for a thread (server-assigned)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A thread as the rest of the crate sees it.
///
/// Raw server payloads are mapped into this shape once, at ingestion
/// (see `api::normalize_thread`), so no other code re-derives field fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Server thread ID
    pub id: ThreadId,
    /// Subject line, if the server sent one
    #[serde(default)]
    pub subject: Option<String>,
    /// Short preview of the latest message
    #[serde(default)]
    pub preview_text: Option<String>,
    /// Sender address, used as the reply recipient
    #[serde(default)]
    pub from_address: String,
    /// Sender display name
    #[serde(default)]
    pub from_name: Option<String>,
    /// Message-ID of the message being replied to
    #[serde(default)]
    pub message_id: Option<String>,
    /// Ordered References chain
    #[serde(default)]
    pub references: Vec<String>,
}

impl Thread {
    /// Create a thread with just an id, subject and sender
    pub fn new(id: impl Into<ThreadId>, subject: Option<String>, from_address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject,
            preview_text: None,
            from_address: from_address.into(),
            from_name: None,
            message_id: None,
            references: Vec::new(),
        }
    }

    /// Subject for display, falling back to a placeholder
    pub fn display_subject(&self) -> &str {
        match self.subject.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => NO_SUBJECT,
        }
    }

    /// Preview text for display
    pub fn preview(&self) -> &str {
        self.preview_text.as_deref().unwrap_or("")
    }
}

/// The `references` field as the server sends it: either one string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum References {
    One(String),
    Many(Vec<String>),
}

impl References {
    /// Normalize to an ordered sequence
    pub fn into_vec(self) -> Vec<String> {
        match self {
            References::One(s) => vec![s],
            References::Many(v) => v,
        }
    }
}
