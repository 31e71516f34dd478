//! Session state and its transitions
//!
//! Everything here is pure: no I/O, no locking. The controller wraps a
//! `SessionState` in a mutex and applies these transitions around its
//! network calls.

use super::SessionError;
use crate::models::{Thread, ThreadId};

/// In-memory state of one authenticated session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    threads: Vec<Thread>,
    selected_thread_id: Option<ThreadId>,
    reply_draft: String,
    reply_open: bool,
    sending: bool,
    last_error: Option<SessionError>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn selected_thread_id(&self) -> Option<&ThreadId> {
        self.selected_thread_id.as_ref()
    }

    pub fn reply_draft(&self) -> &str {
        &self.reply_draft
    }

    pub fn reply_open(&self) -> bool {
        self.reply_open
    }

    pub fn sending(&self) -> bool {
        self.sending
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn thread(&self, id: &ThreadId) -> Option<&Thread> {
        self.threads.iter().find(|t| &t.id == id)
    }

    /// The thread the selection points at
    pub fn selected_thread(&self) -> Option<&Thread> {
        self.selected_thread_id.as_ref().and_then(|id| self.thread(id))
    }

    /// Selection is either empty or names a thread in the list
    pub fn is_consistent(&self) -> bool {
        match &self.selected_thread_id {
            None => true,
            Some(id) => self.thread(id).is_some(),
        }
    }

    /// Replace the list wholesale and select its first thread.
    ///
    /// A reply in progress is dropped when the selection moves, so a draft
    /// never follows the cursor onto another thread.
    pub fn replace_threads(&mut self, threads: Vec<Thread>) {
        let selected = threads.first().map(|t| t.id.clone());
        if selected != self.selected_thread_id {
            self.cancel_reply();
        }
        self.selected_thread_id = selected;
        self.threads = threads;
    }

    /// Select `id` if it is in the list. Returns whether it was.
    pub fn select(&mut self, id: &ThreadId) -> bool {
        if self.thread(id).is_none() {
            return false;
        }
        self.selected_thread_id = Some(id.clone());
        true
    }

    /// Move the selection one step within `visible`, wrapping at the ends.
    ///
    /// With nothing selected (or the selection filtered out) the first
    /// visible thread is selected.
    pub fn select_relative(&mut self, visible: &[Thread], forward: bool) -> bool {
        if visible.is_empty() {
            return false;
        }
        let current = self
            .selected_thread_id
            .as_ref()
            .and_then(|id| visible.iter().position(|t| &t.id == id));
        let next = match current {
            None => 0,
            Some(i) if forward => (i + 1) % visible.len(),
            Some(0) => visible.len() - 1,
            Some(i) => i - 1,
        };
        self.select(&visible[next].id)
    }

    /// Open the reply editor for `id`, selecting it first if needed.
    ///
    /// Starts from an empty draft. Returns false (and changes nothing) when
    /// `id` is not in the list.
    pub fn open_reply(&mut self, id: &ThreadId) -> bool {
        if self.selected_thread_id.as_ref() != Some(id) && !self.select(id) {
            return false;
        }
        self.reply_open = true;
        self.reply_draft.clear();
        true
    }

    pub fn set_draft(&mut self, html: impl Into<String>) {
        self.reply_draft = html.into();
    }

    /// Close the editor and drop the draft
    pub fn cancel_reply(&mut self) {
        self.reply_open = false;
        self.reply_draft.clear();
    }

    /// Apply a successful reply to `target`.
    ///
    /// Ignored when the selection moved on while the request was in flight.
    pub fn finish_reply(&mut self, target: &ThreadId) -> bool {
        if self.selected_thread_id.as_ref() != Some(target) {
            return false;
        }
        self.cancel_reply();
        true
    }

    /// Remove `id` from the list, clearing the selection if it pointed there.
    ///
    /// Returns whether a thread was removed.
    pub fn remove_thread(&mut self, id: &ThreadId) -> bool {
        let before = self.threads.len();
        self.threads.retain(|t| &t.id != id);
        if self.selected_thread_id.as_ref() == Some(id) {
            self.selected_thread_id = None;
            self.reply_open = false;
        }
        self.threads.len() != before
    }

    /// Take the busy flag. Returns false if it was already held.
    pub fn begin_sending(&mut self) -> bool {
        if self.sending {
            return false;
        }
        self.sending = true;
        true
    }

    pub fn end_sending(&mut self) {
        self.sending = false;
    }

    pub fn fail(&mut self, err: SessionError) {
        self.last_error = Some(err);
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(id: &str) -> Thread {
        Thread::new(id, Some(format!("Subject {}", id)), format!("{}@example.com", id))
    }

    fn loaded(ids: &[&str]) -> SessionState {
        let mut state = SessionState::new();
        state.replace_threads(ids.iter().map(|id| thread(id)).collect());
        state
    }

    #[test]
    fn test_replace_closes_reply_when_selection_moves() {
        let mut state = loaded(&["a", "b"]);
        state.open_reply(&ThreadId::new("b"));
        state.set_draft("for b");

        state.replace_threads(vec![thread("a"), thread("b")]);
        assert_eq!(state.selected_thread_id(), Some(&ThreadId::new("a")));
        assert!(!state.reply_open());
        assert_eq!(state.reply_draft(), "");
    }

    #[test]
    fn test_replace_keeps_reply_when_selection_unchanged() {
        let mut state = loaded(&["a", "b"]);
        state.open_reply(&ThreadId::new("a"));
        state.set_draft("for a");

        state.replace_threads(vec![thread("a"), thread("c")]);
        assert!(state.reply_open());
        assert_eq!(state.reply_draft(), "for a");
    }

    #[test]
    fn test_replace_selects_first_or_none() {
        let mut state = loaded(&["a", "b"]);
        assert_eq!(state.selected_thread_id(), Some(&ThreadId::new("a")));

        state.replace_threads(Vec::new());
        assert_eq!(state.selected_thread_id(), None);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_select_unknown_is_noop() {
        let mut state = loaded(&["a", "b"]);
        assert!(!state.select(&ThreadId::new("zzz")));
        assert_eq!(state.selected_thread_id(), Some(&ThreadId::new("a")));

        assert!(state.select(&ThreadId::new("b")));
        assert_eq!(state.selected_thread_id(), Some(&ThreadId::new("b")));
    }

    #[test]
    fn test_open_reply_selects_and_clears_draft() {
        let mut state = loaded(&["a", "b"]);
        state.set_draft("old");

        assert!(state.open_reply(&ThreadId::new("b")));
        assert_eq!(state.selected_thread_id(), Some(&ThreadId::new("b")));
        assert!(state.reply_open());
        assert_eq!(state.reply_draft(), "");

        assert!(!state.open_reply(&ThreadId::new("missing")));
        assert_eq!(state.selected_thread_id(), Some(&ThreadId::new("b")));
    }

    #[test]
    fn test_remove_selected_clears_selection_and_closes_reply() {
        let mut state = loaded(&["a", "b"]);
        state.open_reply(&ThreadId::new("a"));

        assert!(state.remove_thread(&ThreadId::new("a")));
        assert_eq!(state.selected_thread_id(), None);
        assert!(!state.reply_open());
        assert_eq!(state.threads().len(), 1);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_remove_other_keeps_selection() {
        let mut state = loaded(&["a", "b"]);
        state.open_reply(&ThreadId::new("a"));

        assert!(state.remove_thread(&ThreadId::new("b")));
        assert_eq!(state.selected_thread_id(), Some(&ThreadId::new("a")));
        assert!(state.reply_open());
    }

    #[test]
    fn test_remove_missing_changes_nothing() {
        let mut state = loaded(&["a", "b"]);
        let before = state.clone();
        assert!(!state.remove_thread(&ThreadId::new("zzz")));
        assert_eq!(state, before);
    }

    #[test]
    fn test_finish_reply_ignores_stale_target() {
        let mut state = loaded(&["a", "b"]);
        state.open_reply(&ThreadId::new("a"));
        state.set_draft("<p>hi</p>");
        state.select(&ThreadId::new("b"));

        assert!(!state.finish_reply(&ThreadId::new("a")));
        assert_eq!(state.reply_draft(), "<p>hi</p>");

        state.select(&ThreadId::new("a"));
        assert!(state.finish_reply(&ThreadId::new("a")));
        assert!(!state.reply_open());
        assert_eq!(state.reply_draft(), "");
    }

    #[test]
    fn test_busy_flag() {
        let mut state = SessionState::new();
        assert!(state.begin_sending());
        assert!(!state.begin_sending());
        state.end_sending();
        assert!(state.begin_sending());
    }

    #[test]
    fn test_select_relative_wraps() {
        let mut state = loaded(&["a", "b", "c"]);
        let visible = state.threads().to_vec();

        state.select_relative(&visible, true);
        assert_eq!(state.selected_thread_id(), Some(&ThreadId::new("b")));
        state.select_relative(&visible, true);
        state.select_relative(&visible, true);
        assert_eq!(state.selected_thread_id(), Some(&ThreadId::new("a")));
        state.select_relative(&visible, false);
        assert_eq!(state.selected_thread_id(), Some(&ThreadId::new("c")));
    }
}
