//! Session controller
//!
//! Owns the thread list, the selected thread and the reply in progress for
//! one authenticated session, and translates user intents into calls to
//! the inbox service.

mod controller;
mod error;
mod state;

pub use controller::{Confirm, DELETE_PROMPT, Session};
pub use error::{ErrorKind, SessionError};
pub use state::SessionState;
