//! Session controller for the inbox view
//!
//! Coordinates between the inbox service and the local session state.

use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{SessionError, SessionState};
use crate::api::InboxApi;
use crate::auth::AuthToken;
use crate::input::{KeyDisposition, Shortcut};
use crate::models::{ReplyPayload, SenderIdentity, Thread, ThreadId};
use crate::query;

/// Prompt shown before a thread is deleted
pub const DELETE_PROMPT: &str = "Delete this thread?";

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Owner of the thread list, the selection and the reply in progress
///
/// Every operation that talks to the service works in three steps:
/// 1. Check and update local state under the lock
/// 2. Call the service with the lock released
/// 3. Apply the outcome under the lock
///
/// Failures are recorded as `last_error` and also returned to the caller.
pub struct Session {
    api: Arc<dyn InboxApi>,
    token: AuthToken,
    sender: SenderIdentity,
    state: Mutex<SessionState>,
}

/// Holds the busy flag for one reply request, releasing it on drop
struct SendingGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .end_sending();
    }
}

impl Session {
    /// Create a session with an empty thread list
    pub fn new(api: Arc<dyn InboxApi>, token: AuthToken, sender: SenderIdentity) -> Self {
        Self {
            api,
            token,
            sender,
            state: Mutex::new(SessionState::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state, for rendering
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn selected_thread_id(&self) -> Option<ThreadId> {
        self.lock().selected_thread_id().cloned()
    }

    pub fn last_error(&self) -> Option<SessionError> {
        self.lock().last_error().cloned()
    }

    fn fail(&self, err: SessionError) -> SessionError {
        warn!("{}", err);
        self.lock().fail(err.clone());
        err
    }

    /// Fetch the thread list and select its first thread.
    ///
    /// On failure the current list is kept.
    pub fn load_threads(&self) -> Result<(), SessionError> {
        self.lock().clear_error();

        match self.api.list_threads(&self.token) {
            Ok(threads) => {
                info!("Loaded {} threads", threads.len());
                self.lock().replace_threads(threads);
                Ok(())
            }
            Err(e) => Err(self.fail(SessionError::from_api("Error loading threads", &e))),
        }
    }

    /// Select `id` if it is in the list. Unknown ids are ignored.
    pub fn select_thread(&self, id: &ThreadId) -> bool {
        self.lock().select(id)
    }

    /// Move the selection to the next or previous thread matching `search`
    pub fn select_relative(&self, search: &str, forward: bool) -> bool {
        let mut state = self.lock();
        let visible = query::filter_threads(state.threads(), search);
        state.select_relative(&visible, forward)
    }

    /// Open the reply editor on `id` with an empty draft
    pub fn open_reply(&self, id: &ThreadId) -> bool {
        self.lock().open_reply(id)
    }

    /// Replace the draft. Last write wins.
    pub fn update_draft(&self, html: impl Into<String>) {
        self.lock().set_draft(html);
    }

    /// Close the reply editor and drop the draft
    pub fn cancel_reply(&self) {
        self.lock().cancel_reply();
    }

    /// Send the draft as a reply to the selected thread.
    ///
    /// Only one reply can be in flight; a second call while one is pending
    /// fails with a busy error and leaves the draft alone. On failure the
    /// draft and the editor stay as they were so the user can retry.
    pub fn send_reply(&self) -> Result<(), SessionError> {
        let (target, payload) = {
            let mut state = self.lock();
            if !state.begin_sending() {
                let err = SessionError::reply_in_progress();
                state.fail(err.clone());
                return Err(err);
            }

            let prepared = prepare_reply(&state, &self.sender);
            let (target, payload) = match prepared {
                Ok(prepared) => prepared,
                Err(err) => {
                    state.end_sending();
                    state.fail(err.clone());
                    return Err(err);
                }
            };

            state.clear_error();
            (target, payload)
        };
        let _sending = SendingGuard { state: &self.state };

        let result = self.api.send_reply(&self.token, &target, &payload);

        let mut state = self.lock();
        match result {
            Ok(()) => {
                info!("Reply sent to thread {}", target);
                if !state.finish_reply(&target) {
                    info!("Selection changed while replying to {}; keeping editor state", target);
                }
                Ok(())
            }
            Err(e) => {
                let err = SessionError::from_api("Error sending reply", &e);
                warn!("{}", err);
                state.fail(err.clone());
                Err(err)
            }
        }
    }

    /// Delete thread `id` after the user confirms.
    ///
    /// Returns `Ok(false)` when the user declined. The thread is removed
    /// locally only once the service accepted the delete.
    pub fn delete_thread(&self, id: &ThreadId, confirm: &dyn Confirm) -> Result<bool, SessionError> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(false);
        }

        self.lock().clear_error();

        match self.api.delete_thread(&self.token, id) {
            Ok(()) => {
                if self.lock().remove_thread(id) {
                    info!("Deleted thread {}", id);
                } else {
                    info!("Deleted thread {} (not in local list)", id);
                }
                Ok(true)
            }
            Err(e) => Err(self.fail(SessionError::from_api("Error deleting thread", &e))),
        }
    }

    /// Reset the remote inbox, then reload it.
    ///
    /// The list is only replaced when both calls succeed; the reload is not
    /// attempted if the reset failed. Returns the service's reset message.
    pub fn reset_inbox(&self) -> Result<String, SessionError> {
        self.lock().clear_error();

        let message = self
            .api
            .reset(&self.token)
            .map_err(|e| self.fail(SessionError::from_api("Error resetting inbox", &e)))?;

        let threads = self
            .api
            .list_threads(&self.token)
            .map_err(|e| self.fail(SessionError::from_api("Error resetting inbox", &e)))?;

        info!("Inbox reset, {} threads", threads.len());
        let mut state = self.lock();
        state.replace_threads(threads);
        state.cancel_reply();
        Ok(message)
    }

    /// Threads whose subject matches `search`, in list order
    pub fn filter_threads(&self, search: &str) -> Vec<Thread> {
        query::filter_threads(self.lock().threads(), search)
    }

    /// Route a key press to its shortcut.
    ///
    /// Keys are only consumed when a thread is selected; otherwise (or for
    /// unbound keys) the event passes through.
    pub fn dispatch_key(&self, key: &str, confirm: &dyn Confirm) -> KeyDisposition {
        let Some(shortcut) = Shortcut::from_key(key) else {
            return KeyDisposition::PassThrough;
        };
        let Some(selected) = self.selected_thread_id() else {
            return KeyDisposition::PassThrough;
        };

        match shortcut {
            Shortcut::Delete => {
                // Failures are already recorded as last_error
                let _ = self.delete_thread(&selected, confirm);
            }
            Shortcut::Reply => {
                self.open_reply(&selected);
            }
        }
        KeyDisposition::Handled
    }
}

/// Validate the draft and build the payload for the selected thread
fn prepare_reply(
    state: &SessionState,
    sender: &SenderIdentity,
) -> Result<(ThreadId, ReplyPayload), SessionError> {
    if state.reply_draft().trim().is_empty() {
        return Err(SessionError::empty_draft());
    }
    let thread = state
        .selected_thread()
        .ok_or_else(SessionError::thread_not_found)?;

    let payload = ReplyPayload::build(thread, state.reply_draft(), sender);
    if !payload.has_valid_addresses() {
        return Err(SessionError::invalid_address());
    }
    Ok((thread.id.clone(), payload))
}
