//! Outgoing reply payload and the policy used to build it

use serde::{Deserialize, Serialize};

use super::Thread;

/// Recipient name used when the thread has no sender name
const DEFAULT_TO_NAME: &str = "Recipient";

/// The fixed identity replies are sent from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderIdentity {
    pub email: String,
    pub name: String,
}

impl SenderIdentity {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Body of `POST /reply/{threadId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPayload {
    pub to_name: String,
    pub to: String,
    pub from: String,
    pub from_name: String,
    pub subject: String,
    pub body: String,
    pub references: Vec<String>,
    pub in_reply_to: String,
}

impl ReplyPayload {
    /// Build the reply for `thread` from the current draft
    pub fn build(thread: &Thread, draft: &str, sender: &SenderIdentity) -> Self {
        Self {
            to_name: thread
                .from_name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_TO_NAME.to_string()),
            to: thread.from_address.clone(),
            from: sender.email.clone(),
            from_name: sender.name.clone(),
            subject: format!("Re: {}", thread.subject.as_deref().unwrap_or("")),
            body: wrap_body(draft),
            references: thread.references.clone(),
            in_reply_to: thread.message_id.clone().unwrap_or_default(),
        }
    }

    /// Both addresses must at least contain an `@`
    pub fn has_valid_addresses(&self) -> bool {
        self.to.contains('@') && self.from.contains('@')
    }
}

/// Send markup as-is, wrap plain text in a paragraph
pub fn wrap_body(draft: &str) -> String {
    if draft.trim().starts_with('<') {
        draft.to_string()
    } else {
        format!("<p>{}</p>", draft)
    }
}
