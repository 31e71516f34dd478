//! Plain-text rendering of the session for the terminal

use inbox::{SessionState, ShortcutCategory, Thread, ThreadId};
use std::fmt::Write;

/// Render one thread row; the selected row is marked with `>`
pub fn thread_row(thread: &Thread, selected: bool) -> String {
    let marker = if selected { ">" } else { " " };
    let mut row = format!("{} [{}] {}", marker, thread.id, thread.display_subject());
    if !thread.from_address.is_empty() {
        let _ = write!(row, "  <{}>", thread.from_address);
    }
    let preview = thread.preview();
    if !preview.is_empty() {
        let _ = write!(row, "\n      {}", preview);
    }
    row
}

/// Render the visible threads, or a placeholder when there are none
pub fn thread_list(threads: &[Thread], selected: Option<&ThreadId>) -> String {
    if threads.is_empty() {
        return "No threads found".to_string();
    }
    threads
        .iter()
        .map(|t| thread_row(t, selected == Some(&t.id)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the whole view: error banner, list, and reply editor
pub fn session_view(state: &SessionState, visible: &[Thread], search: &str) -> String {
    let mut out = String::new();

    if let Some(err) = state.last_error() {
        let _ = writeln!(out, "! {}", err);
    }
    if !search.is_empty() {
        let _ = writeln!(out, "Search: {}", search);
    }
    out.push_str(&thread_list(visible, state.selected_thread_id()));

    if state.reply_open() {
        let subject = state
            .selected_thread()
            .map(|t| t.display_subject())
            .unwrap_or_default();
        let _ = write!(out, "\n\n--- Reply: Re: {} ---\n{}", subject, state.reply_draft());
        if state.sending() {
            out.push_str("\n(sending...)");
        }
    }
    out
}

/// Render help categories
pub fn help(categories: &[ShortcutCategory]) -> String {
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(out, "{}:", category.name);
        for shortcut in &category.shortcuts {
            let _ = writeln!(out, "  {:<12} {}", shortcut.keys, shortcut.description);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(id: &str, subject: Option<&str>) -> Thread {
        let mut t = Thread::new(id, subject.map(String::from), format!("{}@example.com", id));
        t.preview_text = Some(format!("preview {}", id));
        t
    }

    #[test]
    fn test_empty_list_placeholder() {
        assert_eq!(thread_list(&[], None), "No threads found");
    }

    #[test]
    fn test_selected_marker_and_placeholder_subject() {
        let threads = vec![thread("1", Some("Hello")), thread("2", None)];
        let out = thread_list(&threads, Some(&ThreadId::new("2")));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "  [1] Hello  <1@example.com>");
        assert_eq!(lines[1], "      preview 1");
        assert_eq!(lines[2], "> [2] (No Subject)  <2@example.com>");
    }

    #[test]
    fn test_session_view_shows_editor() {
        let mut state = SessionState::new();
        state.replace_threads(vec![thread("1", Some("Hello"))]);
        state.open_reply(&ThreadId::new("1"));
        state.set_draft("draft text");

        let visible = state.threads().to_vec();
        let out = session_view(&state, &visible, "");
        assert!(out.contains("--- Reply: Re: Hello ---"));
        assert!(out.ends_with("draft text"));
    }

    #[test]
    fn test_help_lists_keys() {
        let out = help(&inbox::shortcuts_help());
        assert!(out.contains("Thread actions:"));
        assert!(out.contains("Reply to selected thread"));
    }
}
