//! Inbox service HTTP client
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use log::debug;
use serde_json::Value;
use std::time::Duration;
use ureq::Agent;
use ureq::http::Response;

use super::wire::Envelope;
use super::{ApiError, InboxApi, normalize_threads};
use crate::auth::AuthToken;
use crate::models::{ReplyPayload, Thread, ThreadId};

/// HTTP client for the hosted inbox service
pub struct HttpInbox {
    agent: Agent,
    base_url: String,
}

impl HttpInbox {
    /// Hosted inbox service base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://hiring.reachinbox.xyz/api/v1/onebox";

    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client for `base_url`
    ///
    /// # Arguments
    /// * `base_url` - Resource root, e.g. `https://host/api/v1/onebox`
    /// * `timeout` - Upper bound for a whole request, response body included
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL requests are issued against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn thread_url(&self, prefix: &str, id: &ThreadId) -> String {
        self.url(&format!("{}/{}", prefix, urlencoding::encode(id.as_str())))
    }

    /// Check the transport status, then decode and check the envelope
    fn read_envelope(mut response: Response<ureq::Body>) -> Result<Option<Value>, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http(status.as_u16()));
        }

        let envelope: Envelope = response
            .body_mut()
            .read_json()
            .map_err(|e| ApiError::Malformed(e.to_string()))?;

        envelope.into_data()
    }
}

fn bearer(token: &AuthToken) -> String {
    format!("Bearer {}", token.as_str())
}

fn transport(e: ureq::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

impl InboxApi for HttpInbox {
    fn list_threads(&self, token: &AuthToken) -> Result<Vec<Thread>, ApiError> {
        let url = self.url("list");
        debug!("GET {}", url);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &bearer(token))
            .call()
            .map_err(transport)?;

        normalize_threads(Self::read_envelope(response)?)
    }

    fn delete_thread(&self, token: &AuthToken, id: &ThreadId) -> Result<(), ApiError> {
        let url = self.thread_url("messages", id);
        debug!("DELETE {}", url);

        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &bearer(token))
            .call()
            .map_err(transport)?;

        Self::read_envelope(response).map(|_| ())
    }

    fn reset(&self, token: &AuthToken) -> Result<String, ApiError> {
        let url = self.url("reset");
        debug!("GET {}", url);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &bearer(token))
            .call()
            .map_err(transport)?;

        Ok(match Self::read_envelope(response)? {
            Some(Value::String(message)) => message,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
    }

    fn send_reply(
        &self,
        token: &AuthToken,
        id: &ThreadId,
        payload: &ReplyPayload,
    ) -> Result<(), ApiError> {
        let url = self.thread_url("reply", id);
        debug!("POST {}", url);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &bearer(token))
            .send_json(payload)
            .map_err(transport)?;

        Self::read_envelope(response).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpInbox::new("http://localhost:9/api/", HttpInbox::DEFAULT_TIMEOUT);
        assert_eq!(client.base_url(), "http://localhost:9/api");
        assert_eq!(client.url("list"), "http://localhost:9/api/list");
    }

    #[test]
    fn test_thread_url_escapes_id() {
        let client = HttpInbox::new("http://localhost:9", HttpInbox::DEFAULT_TIMEOUT);
        let url = client.thread_url("messages", &ThreadId::new("a/b c"));
        assert_eq!(url, "http://localhost:9/messages/a%2Fb%20c");
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(bearer(&AuthToken::new("abc")), "Bearer abc");
    }
}
