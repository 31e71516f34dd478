//! Interactive inbox shell
//!
//! Single keys go through the session's shortcut dispatch; the rest are
//! shell commands. While the reply editor is open, typed lines are
//! appended to the draft until `:send` or `:cancel`. Replies are sent on a
//! worker thread so the shell keeps reading input while one is in flight.

use anyhow::{Result, anyhow};
use inbox::input::ShortcutHelp;
use inbox::{
    Confirm, KeyDisposition, Session, SessionError, ShortcutCategory, ThreadId, shortcuts_help,
};
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::cli::TerminalConfirm;
use crate::render;

/// Whether the shell keeps reading input
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Shell-only commands, shown after the shortcut help
fn shell_help() -> ShortcutCategory {
    ShortcutCategory {
        name: "Shell",
        shortcuts: vec![
            ShortcutHelp {
                keys: "J / K",
                description: "Select next / previous",
            },
            ShortcutHelp {
                keys: "s <id>",
                description: "Select thread by id",
            },
            ShortcutHelp {
                keys: "/text",
                description: "Filter by subject (/ alone clears)",
            },
            ShortcutHelp {
                keys: "reload",
                description: "Fetch the thread list again",
            },
            ShortcutHelp {
                keys: "reset",
                description: "Reset the inbox",
            },
            ShortcutHelp {
                keys: ":send",
                description: "Send the reply being written",
            },
            ShortcutHelp {
                keys: ":cancel",
                description: "Discard the reply being written",
            },
            ShortcutHelp {
                keys: "?",
                description: "Show this help",
            },
            ShortcutHelp {
                keys: "q",
                description: "Quit",
            },
        ],
    }
}

/// How often the shell checks whether a new reply request has started
const SEND_POLL: Duration = Duration::from_millis(10);

/// Shell state that is not part of the session
#[derive(Default)]
pub struct Shell {
    search: String,
    pending: Option<JoinHandle<Result<(), SessionError>>>,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start sending the draft on a worker thread.
    ///
    /// Returns once the request is in flight (or already finished, e.g.
    /// rejected locally), so the next render shows the busy state.
    fn start_send(&mut self, session: &Arc<Session>, out: &mut impl Write) -> Result<()> {
        // A finished earlier send has to be reported before it is replaced
        self.collect_reply(out)?;
        if self.pending.is_some() {
            // Still in flight: the session rejects this one as busy
            let _ = session.send_reply();
            return Ok(());
        }

        let worker = Arc::clone(session);
        let handle = std::thread::spawn(move || worker.send_reply());
        while !handle.is_finished() && !session.snapshot().sending() {
            std::thread::sleep(SEND_POLL);
        }
        self.pending = Some(handle);
        self.collect_reply(out)
    }

    /// Report a reply that has finished, if any
    fn collect_reply(&mut self, out: &mut impl Write) -> Result<()> {
        if self.pending.as_ref().is_some_and(|h| h.is_finished()) {
            self.wait_pending(out)?;
        }
        Ok(())
    }

    /// Block until the reply in flight (if any) completes and report it
    pub fn wait_pending(&mut self, out: &mut impl Write) -> Result<()> {
        if let Some(handle) = self.pending.take() {
            let result = handle
                .join()
                .map_err(|_| anyhow!("Reply worker panicked"))?;
            if result.is_ok() {
                writeln!(out, "Reply sent!")?;
            }
        }
        Ok(())
    }

    pub fn reply_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Print the current view
    pub fn render(&self, session: &Session, out: &mut impl Write) -> Result<()> {
        let state = session.snapshot();
        let visible = session.filter_threads(&self.search);
        writeln!(out, "{}", render::session_view(&state, &visible, &self.search))?;
        Ok(())
    }

    fn prompt(&self, session: &Session) -> &'static str {
        if session.snapshot().reply_open() {
            "reply> "
        } else {
            "onebox> "
        }
    }

    /// Handle one line of input
    pub fn handle_line(
        &mut self,
        session: &Arc<Session>,
        line: &str,
        confirm: &dyn Confirm,
        out: &mut impl Write,
    ) -> Result<Flow> {
        self.collect_reply(out)?;

        let line = line.trim_end_matches(['\r', '\n']);
        let state = session.snapshot();

        if state.reply_open() {
            match line.trim() {
                ":send" => {
                    self.start_send(session, out)?;
                    self.render(session, out)?;
                }
                ":cancel" => {
                    session.cancel_reply();
                    self.render(session, out)?;
                }
                _ => {
                    let draft = if state.reply_draft().is_empty() {
                        line.to_string()
                    } else {
                        format!("{}\n{}", state.reply_draft(), line)
                    };
                    session.update_draft(draft);
                }
            }
            return Ok(Flow::Continue);
        }

        let command = line.trim();
        match command {
            "q" | "quit" => return Ok(Flow::Quit),
            "?" | "help" => {
                let mut categories = shortcuts_help();
                categories.push(shell_help());
                write!(out, "{}", render::help(&categories))?;
                return Ok(Flow::Continue);
            }
            "" => {}
            "j" | "J" => {
                session.select_relative(&self.search, true);
            }
            "k" | "K" => {
                session.select_relative(&self.search, false);
            }
            "reload" => {
                let _ = session.load_threads();
            }
            "reset" => {
                if let Ok(message) = session.reset_inbox()
                    && !message.is_empty()
                {
                    writeln!(out, "{}", message)?;
                }
            }
            _ if command.starts_with('/') => {
                self.search = command[1..].trim().to_string();
            }
            _ if command.starts_with("s ") => {
                let id = ThreadId::new(command[2..].trim());
                if !session.select_thread(&id) {
                    writeln!(out, "No thread {}", id)?;
                }
            }
            key => {
                if session.dispatch_key(key, confirm) == KeyDisposition::PassThrough {
                    writeln!(out, "Unknown command: {} (? for help)", key)?;
                    return Ok(Flow::Continue);
                }
            }
        }

        self.render(session, out)?;
        Ok(Flow::Continue)
    }
}

/// Run the shell on stdin/stdout until `q` or end of input.
///
/// A reply still in flight on exit is waited for.
pub fn run(session: Arc<Session>) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut shell = Shell::new();

    let _ = session.load_threads();
    shell.render(&session, &mut out)?;

    loop {
        write!(out, "{}", shell.prompt(&session))?;
        out.flush()?;

        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            break;
        }
        if shell.handle_line(&session, &line, &TerminalConfirm, &mut out)? == Flow::Quit {
            break;
        }
    }

    if shell.reply_in_flight() {
        writeln!(out, "Waiting for the reply to finish...")?;
    }
    shell.wait_pending(&mut out)
}
