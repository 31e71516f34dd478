//! Authentication collaborators
//!
//! This module provides:
//! - Token persistence (`TokenStore` and its file/memory backends)
//! - Session entry: picking the token off the redirect URL or the store
//! - The browser login flow against the inbox service's OAuth redirect

mod login;
mod token;

pub use login::LoginFlow;
pub use token::{
    AuthToken, FileTokenStore, MemoryTokenStore, TOKEN_PARAM, TokenResolution, TokenStore,
    resolve_session_token, take_token_from_url,
};
