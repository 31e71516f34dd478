//! Browser login via the inbox service's OAuth redirect
//!
//! The service handles the Google sign-in itself and finally redirects the
//! browser to `redirect_to?token=...`. We point `redirect_to` at a local
//! listener so the token can be picked up without a web front end.

use anyhow::{Context, Result};
use log::{info, warn};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;

use super::{AuthToken, TokenStore, take_token_from_url};

/// Login flow configuration
#[derive(Debug, Clone)]
pub struct LoginFlow {
    auth_url: String,
    port_start: u16,
    port_end: u16,
}

impl LoginFlow {
    /// Hosted auth service base URL
    pub const DEFAULT_AUTH_URL: &'static str = "https://hiring.reachinbox.xyz/api/v1/auth";

    /// First port tried for the local callback listener
    pub const DEFAULT_PORT_START: u16 = 5173;

    /// Number of ports tried after the first one
    const PORT_SPAN: u16 = 10;

    /// Path the service redirects back to
    const CALLBACK_PATH: &'static str = "/onebox";

    pub fn new(auth_url: impl Into<String>, port_start: u16) -> Self {
        Self {
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
            port_start,
            port_end: port_start.saturating_add(Self::PORT_SPAN),
        }
    }

    /// Redirect target served by the local listener on `port`
    pub fn redirect_uri(port: u16) -> String {
        format!("http://localhost:{}{}", port, Self::CALLBACK_PATH)
    }

    /// External login URL that ends with a redirect to `redirect_uri`
    pub fn login_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}/google-login?redirect_to={}",
            self.auth_url,
            urlencoding::encode(redirect_uri)
        )
    }

    /// Run the whole flow: listen, open the browser, wait, persist.
    pub fn run(&self, store: &dyn TokenStore) -> Result<AuthToken> {
        let (listener, port) = self.start_local_server()?;
        let login_url = self.login_url(&Self::redirect_uri(port));

        println!("\n=== Onebox Login ===");
        println!("Opening browser for Google sign-in...");
        println!("If the browser doesn't open, visit: {}", login_url);

        if let Err(e) = open::that(&login_url) {
            warn!("Failed to open browser: {}. Please open the URL manually.", e);
        }

        println!("Waiting for the login redirect...");
        let token = wait_for_token(&listener, port)?;
        store.set(&token)?;

        info!("Login complete, token stored");
        Ok(token)
    }

    /// Bind the first free port in the configured range
    fn start_local_server(&self) -> Result<(TcpListener, u16)> {
        for port in self.port_start..=self.port_end {
            if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
                return Ok((listener, port));
            }
        }
        anyhow::bail!(
            "Could not bind to any port in range {}-{}",
            self.port_start,
            self.port_end
        )
    }
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_AUTH_URL, Self::DEFAULT_PORT_START)
    }
}

/// Accept one redirect on `listener` and extract its token
fn wait_for_token(listener: &TcpListener, port: u16) -> Result<AuthToken> {
    let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .context("Failed to read request")?;

    // GET /onebox?token=... HTTP/1.1
    let token = request_line
        .split_whitespace()
        .nth(1)
        .map(|path| format!("http://localhost:{}{}", port, path))
        .and_then(|url| take_token_from_url(&url).ok().flatten())
        .map(|(token, _)| token);

    let (status, body) = if token.is_some() {
        ("200 OK", "Signed in to Onebox. You can close this window.")
    } else {
        ("400 Bad Request", "Sign-in failed. Please try again.")
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
        status, body
    );
    stream.write_all(response.as_bytes()).ok();

    token.context("No token received on login redirect")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpStream;

    #[test]
    fn test_login_url() {
        let flow = LoginFlow::new("https://auth.example/api/v1/auth/", 5173);
        assert_eq!(
            flow.login_url(&LoginFlow::redirect_uri(5173)),
            "https://auth.example/api/v1/auth/google-login?redirect_to=http%3A%2F%2Flocalhost%3A5173%2Fonebox"
        );
    }

    #[test]
    fn test_wait_for_token_reads_redirect() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let client = std::thread::spawn(move || {
            let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
            stream
                .write_all(b"GET /onebox?token=tok123 HTTP/1.1\r\nHost: localhost\r\n\r\n")
                .unwrap();
            let mut reply = String::new();
            stream.read_to_string(&mut reply).unwrap();
            reply
        });

        let token = wait_for_token(&listener, port).unwrap();
        assert_eq!(token.as_str(), "tok123");
        assert!(client.join().unwrap().starts_with("HTTP/1.1 200 OK"));
    }

    #[test]
    fn test_wait_for_token_without_token_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let client = std::thread::spawn(move || {
            let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
            stream
                .write_all(b"GET /onebox?error=denied HTTP/1.1\r\n\r\n")
                .unwrap();
            let mut reply = String::new();
            stream.read_to_string(&mut reply).unwrap();
            reply
        });

        assert!(wait_for_token(&listener, port).is_err());
        assert!(client.join().unwrap().starts_with("HTTP/1.1 400"));
    }
}
