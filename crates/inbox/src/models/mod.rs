//! Domain models for inbox entities

mod reply;
mod thread;

pub use reply::{ReplyPayload, SenderIdentity, wrap_body};
pub use thread::{NO_SUBJECT, References, Thread, ThreadId};
