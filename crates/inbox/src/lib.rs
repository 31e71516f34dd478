//! Inbox crate - Business logic for the Onebox client
//!
//! This crate provides platform-independent inbox functionality including:
//! - Domain models (Thread, ReplyPayload, SenderIdentity)
//! - Inbox service HTTP client and an in-memory stand-in
//! - Auth token persistence and the browser login flow
//! - The session controller (thread list, selection, reply draft)
//! - Search filtering and keyboard shortcut dispatch
//!
//! This crate has zero UI dependencies.

pub mod api;
pub mod auth;
pub mod config;
pub mod input;
pub mod models;
pub mod query;
pub mod session;

pub use api::{ApiError, Endpoint, HttpInbox, InMemoryInbox, InboxApi};
pub use auth::{
    AuthToken, FileTokenStore, LoginFlow, MemoryTokenStore, TokenResolution, TokenStore,
    resolve_session_token, take_token_from_url,
};
pub use config::InboxSettings;
pub use input::{KeyDisposition, Shortcut, ShortcutCategory, shortcuts_help};
pub use models::{ReplyPayload, SenderIdentity, Thread, ThreadId};
pub use query::filter_threads;
pub use session::{Confirm, ErrorKind, Session, SessionError, SessionState};
