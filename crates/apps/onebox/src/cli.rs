//! Command-line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inbox::{
    AuthToken, Confirm, FileTokenStore, InMemoryInbox, InboxApi, InboxSettings, SenderIdentity,
    Session, ThreadId, TokenResolution, TokenStore, resolve_session_token,
};
use log::{info, warn};
use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::{render, shell};

#[derive(Parser)]
#[command(name = "onebox")]
#[command(about = "Terminal client for the Onebox inbox")]
pub struct OneboxCli {
    /// Use a built-in sample inbox instead of the hosted service
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in through the browser and store the token
    Login,
    /// Forget the stored token
    Logout,
    /// Print the thread list
    List {
        /// Only show threads whose subject contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Delete a thread
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Reset the inbox to its initial contents
    Reset,
    /// Reply to a thread
    Reply {
        id: String,
        /// Reply body; plain text is wrapped in a paragraph
        #[arg(long)]
        body: String,
    },
    /// Interactive inbox (default)
    Shell {
        /// Redirect URL carrying `?token=...`
        #[arg(long)]
        url: Option<String>,
    },
}

/// Asks on the terminal, defaulting to "no"
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

pub fn run() -> Result<()> {
    let cli = OneboxCli::parse();
    let settings = InboxSettings::load().context("Failed to load settings")?;

    match cli.command.unwrap_or(Commands::Shell { url: None }) {
        Commands::Login => {
            let store = FileTokenStore::new()?;
            settings.login_flow().run(&store)?;
            println!("Logged in.");
            Ok(())
        }
        Commands::Logout => {
            FileTokenStore::new()?.clear()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::List { search } => {
            let session = open_session(&settings, cli.demo, None)?;
            session.load_threads()?;
            let state = session.snapshot();
            let visible = session.filter_threads(search.as_deref().unwrap_or(""));
            println!("{}", render::thread_list(&visible, state.selected_thread_id()));
            Ok(())
        }
        Commands::Delete { id, yes } => {
            let session = open_session(&settings, cli.demo, None)?;
            let id = ThreadId::new(id);
            let deleted = if yes {
                session.delete_thread(&id, &|_: &str| true)?
            } else {
                session.delete_thread(&id, &TerminalConfirm)?
            };
            if deleted {
                println!("Deleted thread {}", id);
            }
            Ok(())
        }
        Commands::Reset => {
            let session = open_session(&settings, cli.demo, None)?;
            let message = session.reset_inbox()?;
            if !message.is_empty() {
                println!("{}", message);
            }
            let state = session.snapshot();
            println!("{}", render::thread_list(state.threads(), state.selected_thread_id()));
            Ok(())
        }
        Commands::Reply { id, body } => {
            let session = open_session(&settings, cli.demo, None)?;
            session.load_threads()?;
            let id = ThreadId::new(id);
            if !session.open_reply(&id) {
                anyhow::bail!("Thread {} not found", id);
            }
            session.update_draft(body);
            session.send_reply()?;
            println!("Reply sent!");
            Ok(())
        }
        Commands::Shell { url } => {
            let session = open_session(&settings, cli.demo, url.as_deref())?;
            shell::run(Arc::new(session))
        }
    }
}

/// Build a session against the configured service (or the demo inbox).
///
/// Without a token the user is sent through the login flow first.
fn open_session(settings: &InboxSettings, demo: bool, entry_url: Option<&str>) -> Result<Session> {
    if demo {
        info!("Using the demo inbox");
        let sender = if settings.user_email.is_empty() {
            SenderIdentity::new("you@onebox.example", "You")
        } else {
            settings.sender()
        };
        let api: Arc<dyn InboxApi> = Arc::new(InMemoryInbox::with_sample_threads());
        return Ok(Session::new(api, AuthToken::new("demo"), sender));
    }

    if settings.user_email.is_empty()
        && let Some(path) = InboxSettings::default_settings_path()
    {
        warn!(
            "No sender address configured; replies will be rejected.\n\
             Set \"userEmail\" in {} or the ONEBOX_USER_EMAIL environment variable.",
            path.display()
        );
    }

    let store = FileTokenStore::new()?;
    let token = match resolve_session_token(&store, entry_url)? {
        TokenResolution::Ready { token, .. } => token,
        TokenResolution::LoginRequired => {
            println!("Not logged in.");
            settings.login_flow().run(&store)?
        }
    };

    let api: Arc<dyn InboxApi> = Arc::new(settings.http_inbox());
    Ok(Session::new(api, token, settings.sender()))
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clap::error::ErrorKind;

    use super::{Commands, OneboxCli};

    #[test]
    fn cli_defaults_to_shell() {
        let cli = OneboxCli::try_parse_from(["onebox"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.demo);
    }

    #[test]
    fn cli_parses_reply() {
        let cli =
            OneboxCli::try_parse_from(["onebox", "reply", "42", "--body", "<p>hi</p>", "--demo"])
                .unwrap();
        assert!(cli.demo);
        match cli.command {
            Some(Commands::Reply { id, body }) => {
                assert_eq!(id, "42");
                assert_eq!(body, "<p>hi</p>");
            }
            _ => panic!("expected reply command"),
        }
    }

    #[test]
    fn cli_reply_requires_body() {
        let err = match OneboxCli::try_parse_from(["onebox", "reply", "42"]) {
            Ok(_) => panic!("expected missing argument error"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn cli_rejects_unknown_subcommand() {
        let err = match OneboxCli::try_parse_from(["onebox", "archive"]) {
            Ok(_) => panic!("expected invalid subcommand parse error"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
    }
}
