//! Auth token persistence and session entry
//!
//! The token arrives as a `?token=` query parameter on the URL the login
//! service redirects to. It is persisted under the `authToken` key and
//! reused on later launches until the user logs out.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use url::Url;

/// Token file in the Onebox config directory
const TOKEN_FILE: &str = "auth-token.json";

/// Query parameter carrying the token on the redirect URL
pub const TOKEN_PARAM: &str = "token";

/// Bearer token for the inbox service
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Key-value persistence for the auth token
pub trait TokenStore: Send + Sync {
    /// The stored token, if any
    fn get(&self) -> Result<Option<AuthToken>>;

    /// Persist `token`, replacing any previous one
    fn set(&self, token: &AuthToken) -> Result<()>;

    /// Forget the stored token
    fn clear(&self) -> Result<()>;
}

/// Token file contents
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    #[serde(rename = "authToken")]
    auth_token: String,
    #[serde(rename = "savedAt")]
    saved_at: DateTime<Utc>,
}

/// Token store backed by a JSON file (~/.config/onebox/auth-token.json)
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store at the default location in the config directory
    pub fn new() -> Result<Self> {
        let path = config::config_path(TOKEN_FILE).context("Could not determine config directory")?;
        Ok(Self { path })
    }

    /// Store at an explicit path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<AuthToken>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let stored: StoredToken = config::load_json_file(&self.path)?;
        if stored.auth_token.is_empty() {
            return Ok(None);
        }
        Ok(Some(AuthToken(stored.auth_token)))
    }

    fn set(&self, token: &AuthToken) -> Result<()> {
        let stored = StoredToken {
            auth_token: token.0.clone(),
            saved_at: Utc::now(),
        };
        config::save_json_file(&self.path, &stored)
    }

    fn clear(&self) -> Result<()> {
        config::remove_file(&self.path)
    }
}

/// Token store that lives only as long as the process
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<AuthToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<AuthToken>> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn set(&self, token: &AuthToken) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Pull the `token` query parameter out of `url`.
///
/// Returns the token together with the URL stripped of that parameter
/// (other parameters are kept), or `None` when the URL carries no token.
pub fn take_token_from_url(url: &str) -> Result<Option<(AuthToken, String)>> {
    let mut parsed = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;

    let mut token = None;
    let mut rest = Vec::new();
    for (key, value) in parsed.query_pairs() {
        if key == TOKEN_PARAM {
            if !value.is_empty() {
                token = Some(AuthToken::new(value.into_owned()));
            }
        } else {
            rest.push((key.into_owned(), value.into_owned()));
        }
    }

    let Some(token) = token else {
        return Ok(None);
    };

    if rest.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(rest);
    }

    Ok(Some((token, parsed.into())))
}

/// Outcome of entering the inbox view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResolution {
    /// A token is available; `cleaned_url` is the entry URL without `token`
    Ready {
        token: AuthToken,
        cleaned_url: Option<String>,
    },
    /// No token anywhere; the caller must send the user to the login view
    LoginRequired,
}

/// Decide which token a new session runs with.
///
/// A token on `entry_url` wins and is persisted; otherwise the stored token
/// is used. With neither, the session must go through login.
pub fn resolve_session_token(
    store: &dyn TokenStore,
    entry_url: Option<&str>,
) -> Result<TokenResolution> {
    if let Some(url) = entry_url
        && let Some((token, cleaned_url)) = take_token_from_url(url)?
    {
        store.set(&token)?;
        info!("Stored auth token from redirect URL");
        return Ok(TokenResolution::Ready {
            token,
            cleaned_url: Some(cleaned_url),
        });
    }

    match store.get()? {
        Some(token) => Ok(TokenResolution::Ready {
            token,
            cleaned_url: None,
        }),
        None => Ok(TokenResolution::LoginRequired),
    }
}
