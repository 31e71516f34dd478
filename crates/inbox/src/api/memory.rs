//! In-memory inbox service
//!
//! Behaves like the hosted service without a network: it serves a seeded
//! thread list, deletes and resets it, and records replies. Failures can be
//! scripted per endpoint. Used by tests and by the CLI demo mode.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{ApiError, InboxApi};
use crate::auth::AuthToken;
use crate::models::{ReplyPayload, Thread, ThreadId};

/// Message returned by a successful reset
pub const RESET_MESSAGE: &str = "Inbox has been reset";

/// Service endpoints, for call counting and failure scripting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    List,
    Delete,
    Reset,
    Reply,
}

#[derive(Default)]
struct Inner {
    seed: Vec<Thread>,
    threads: Vec<Thread>,
    failures: HashMap<Endpoint, VecDeque<ApiError>>,
    calls: HashMap<Endpoint, usize>,
    replies: Vec<(ThreadId, ReplyPayload)>,
}

struct HeldReply {
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Handle for a reply request parked inside [`InMemoryInbox::send_reply`]
pub struct ReplyGate {
    entered: Receiver<()>,
    release: Sender<()>,
}

impl ReplyGate {
    /// Block until a reply request has reached the service
    pub fn wait_until_entered(&self) {
        let _ = self.entered.recv();
    }

    /// Let the parked reply request complete
    pub fn release(&self) {
        let _ = self.release.send(());
    }
}

/// In-memory implementation of InboxApi
pub struct InMemoryInbox {
    inner: Mutex<Inner>,
    held_reply: Mutex<Option<HeldReply>>,
}

impl Default for InMemoryInbox {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl InMemoryInbox {
    /// Create a service whose list (and reset state) is `threads`
    pub fn new(threads: Vec<Thread>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                seed: threads.clone(),
                threads,
                ..Inner::default()
            }),
            held_reply: Mutex::new(None),
        }
    }

    /// A small inbox with a few sample conversations
    pub fn with_sample_threads() -> Self {
        let mut welcome = Thread::new(
            "1001",
            Some("Welcome to Onebox".to_string()),
            "team@onebox.example",
        );
        welcome.from_name = Some("Onebox Team".to_string());
        welcome.preview_text = Some("Press r to reply, d to delete.".to_string());
        welcome.message_id = Some("<welcome-1001@onebox.example>".to_string());

        let mut invoice = Thread::new(
            "1002",
            Some("Invoice #2291".to_string()),
            "billing@vendor.example",
        );
        invoice.from_name = Some("Vendor Billing".to_string());
        invoice.preview_text = Some("Your invoice for October is attached.".to_string());
        invoice.message_id = Some("<inv-2291@vendor.example>".to_string());
        invoice.references = vec!["<inv-2290@vendor.example>".to_string()];

        let mut meeting = Thread::new("1003", Some("Meeting notes".to_string()), "sam@example.com");
        meeting.from_name = Some("Sam".to_string());
        meeting.preview_text = Some("Notes from Tuesday's sync.".to_string());
        meeting.message_id = Some("<notes-1003@example.com>".to_string());

        Self::new(vec![welcome, invoice, meeting])
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call to `endpoint` fail with `error`
    pub fn fail_next(&self, endpoint: Endpoint, error: ApiError) {
        self.lock()
            .failures
            .entry(endpoint)
            .or_default()
            .push_back(error);
    }

    /// Number of calls made to `endpoint`
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.lock().calls.get(&endpoint).copied().unwrap_or(0)
    }

    /// Threads currently held by the service
    pub fn threads(&self) -> Vec<Thread> {
        self.lock().threads.clone()
    }

    /// Replace the service's current list without changing the reset state
    pub fn set_threads(&self, threads: Vec<Thread>) {
        self.lock().threads = threads;
    }

    /// Replies received so far
    pub fn replies(&self) -> Vec<(ThreadId, ReplyPayload)> {
        self.lock().replies.clone()
    }

    /// Park the next reply request until the returned gate is released
    pub fn hold_next_reply(&self) -> ReplyGate {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self
            .held_reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(HeldReply {
            entered: entered_tx,
            release: release_rx,
        });
        ReplyGate {
            entered: entered_rx,
            release: release_tx,
        }
    }

    /// Count the call and pop a scripted failure, if any
    fn begin(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        let mut inner = self.lock();
        *inner.calls.entry(endpoint).or_default() += 1;
        match inner.failures.get_mut(&endpoint).and_then(|q| q.pop_front()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl InboxApi for InMemoryInbox {
    fn list_threads(&self, _token: &AuthToken) -> Result<Vec<Thread>, ApiError> {
        self.begin(Endpoint::List)?;
        Ok(self.lock().threads.clone())
    }

    /// Unknown ids succeed, like the hosted service does.
    fn delete_thread(&self, _token: &AuthToken, id: &ThreadId) -> Result<(), ApiError> {
        self.begin(Endpoint::Delete)?;
        self.lock().threads.retain(|t| &t.id != id);
        Ok(())
    }

    fn reset(&self, _token: &AuthToken) -> Result<String, ApiError> {
        self.begin(Endpoint::Reset)?;
        let mut inner = self.lock();
        inner.threads = inner.seed.clone();
        Ok(RESET_MESSAGE.to_string())
    }

    fn send_reply(
        &self,
        _token: &AuthToken,
        id: &ThreadId,
        payload: &ReplyPayload,
    ) -> Result<(), ApiError> {
        let held = self
            .held_reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(held) = held {
            let _ = held.entered.send(());
            let _ = held.release.recv();
        }

        self.begin(Endpoint::Reply)?;
        self.lock().replies.push((id.clone(), payload.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> AuthToken {
        AuthToken::new("t")
    }

    #[test]
    fn test_delete_and_reset() {
        let inbox = InMemoryInbox::with_sample_threads();
        inbox.delete_thread(&token(), &ThreadId::new("1001")).unwrap();
        assert_eq!(inbox.threads().len(), 2);

        let message = inbox.reset(&token()).unwrap();
        assert_eq!(message, RESET_MESSAGE);
        assert_eq!(inbox.threads().len(), 3);
    }

    #[test]
    fn test_scripted_failure_is_consumed() {
        let inbox = InMemoryInbox::with_sample_threads();
        inbox.fail_next(Endpoint::List, ApiError::Http(503));

        assert!(matches!(inbox.list_threads(&token()), Err(ApiError::Http(503))));
        assert!(inbox.list_threads(&token()).is_ok());
        assert_eq!(inbox.calls(Endpoint::List), 2);
    }
}
