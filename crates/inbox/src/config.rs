//! Configuration loading for the inbox client
//!
//! Settings are resolved in this order (later wins):
//! 1. Built-in defaults (the hosted service)
//! 2. JSON file (~/.config/onebox/settings.json)
//! 3. Runtime environment variables

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::HttpInbox;
use crate::auth::LoginFlow;
use crate::models::SenderIdentity;

/// Settings filename in the Onebox config directory
const SETTINGS_FILE: &str = "settings.json";

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InboxSettings {
    /// Inbox service resource root
    pub base_url: String,
    /// Auth service root (hosts `/google-login`)
    pub auth_url: String,
    /// First port tried for the login callback listener
    pub redirect_port_start: u16,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Address replies are sent from
    pub user_email: String,
    /// Display name replies are sent from
    pub user_name: String,
}

impl Default for InboxSettings {
    fn default() -> Self {
        Self {
            base_url: HttpInbox::DEFAULT_BASE_URL.to_string(),
            auth_url: LoginFlow::DEFAULT_AUTH_URL.to_string(),
            redirect_port_start: LoginFlow::DEFAULT_PORT_START,
            timeout_secs: HttpInbox::DEFAULT_TIMEOUT.as_secs(),
            user_email: String::new(),
            user_name: String::new(),
        }
    }
}

impl InboxSettings {
    /// Load settings from the config file (if any), then apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_settings_path().as_deref(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Load from `path` when it exists, then apply overrides from `lookup`
    fn load_from<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        settings.apply_overrides(lookup)?;
        Ok(settings)
    }

    /// Load settings from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        config::load_json_file(path)
    }

    /// Parse settings from a JSON string; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse settings JSON")
    }

    /// Apply `ONEBOX_*` overrides looked up through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ONEBOX_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("ONEBOX_AUTH_URL") {
            self.auth_url = v;
        }
        if let Some(v) = lookup("ONEBOX_USER_EMAIL") {
            self.user_email = v;
        }
        if let Some(v) = lookup("ONEBOX_USER_NAME") {
            self.user_name = v;
        }
        if let Some(v) = lookup("ONEBOX_TIMEOUT_SECS") {
            self.timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("ONEBOX_TIMEOUT_SECS is not a number: {}", v))?;
        }
        Ok(())
    }

    /// Identity replies are sent from
    pub fn sender(&self) -> SenderIdentity {
        SenderIdentity::new(self.user_email.clone(), self.user_name.clone())
    }

    /// Per-request timeout; zero means the built-in default
    pub fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            return HttpInbox::DEFAULT_TIMEOUT;
        }
        Duration::from_secs(self.timeout_secs)
    }

    /// HTTP client for the configured service
    pub fn http_inbox(&self) -> HttpInbox {
        HttpInbox::new(self.base_url.clone(), self.timeout())
    }

    /// Login flow for the configured auth service
    pub fn login_flow(&self) -> LoginFlow {
        LoginFlow::new(self.auth_url.clone(), self.redirect_port_start)
    }

    /// Get the default settings file path (~/.config/onebox/settings.json)
    pub fn default_settings_path() -> Option<PathBuf> {
        config::config_path(SETTINGS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_json_takes_defaults() {
        let settings = InboxSettings::from_json(
            r#"{ "userEmail": "me@example.com", "userName": "Me" }"#,
        )
        .unwrap();
        assert_eq!(settings.base_url, HttpInbox::DEFAULT_BASE_URL);
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.sender(), SenderIdentity::new("me@example.com", "Me"));
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("ONEBOX_BASE_URL", "http://localhost:8080/api"),
            ("ONEBOX_TIMEOUT_SECS", "5"),
            ("ONEBOX_USER_EMAIL", "env@example.com"),
        ]
        .into_iter()
        .collect();

        let mut settings = InboxSettings::from_json(r#"{ "userEmail": "file@example.com" }"#).unwrap();
        settings
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.base_url, "http://localhost:8080/api");
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        assert_eq!(settings.user_email, "env@example.com");
    }

    #[test]
    fn test_bad_timeout_override() {
        let mut settings = InboxSettings::default();
        let result = settings.apply_overrides(|k| {
            (k == "ONEBOX_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let settings = InboxSettings::from_json(r#"{ "timeoutSecs": 0 }"#).unwrap();
        assert_eq!(settings.timeout(), HttpInbox::DEFAULT_TIMEOUT);

        let mut settings = InboxSettings::default();
        settings
            .apply_overrides(|k| (k == "ONEBOX_TIMEOUT_SECS").then(|| "0".to_string()))
            .unwrap();
        assert_eq!(settings.timeout(), HttpInbox::DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_load_from_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(
            &path,
            r#"{ "baseUrl": "http://file.example/api", "userEmail": "file@example.com" }"#,
        )
        .unwrap();

        let settings = InboxSettings::load_from(Some(&path), |k| {
            (k == "ONEBOX_USER_EMAIL").then(|| "env@example.com".to_string())
        })
        .unwrap();
        assert_eq!(settings.base_url, "http://file.example/api");
        assert_eq!(settings.user_email, "env@example.com");
        assert_eq!(settings.auth_url, LoginFlow::DEFAULT_AUTH_URL);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(SETTINGS_FILE);

        let settings = InboxSettings::load_from(Some(&missing), |_| None).unwrap();
        assert_eq!(settings, InboxSettings::default());

        let settings = InboxSettings::load_from(None, |_| None).unwrap();
        assert_eq!(settings, InboxSettings::default());
    }

    #[test]
    fn test_from_file_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{ nope").unwrap();
        assert!(InboxSettings::from_file(&path).is_err());
    }

    #[test]
    fn test_invalid_json() {
        assert!(InboxSettings::from_json("{ nope").is_err());
    }
}
