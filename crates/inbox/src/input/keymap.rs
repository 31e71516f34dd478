//! Keyboard shortcut definitions and help text

/// Actions reachable from a single key while browsing threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// D - delete the selected thread
    Delete,
    /// R - reply to the selected thread
    Reply,
}

impl Shortcut {
    /// Map a key name to its shortcut, ignoring case
    pub fn from_key(key: &str) -> Option<Self> {
        if key.eq_ignore_ascii_case("d") {
            Some(Shortcut::Delete)
        } else if key.eq_ignore_ascii_case("r") {
            Some(Shortcut::Reply)
        } else {
            None
        }
    }
}

/// What the view should do with a key event after dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The key ran a shortcut; suppress its default action
    Handled,
    /// Not ours; let the event through untouched
    PassThrough,
}

/// A category of keyboard shortcuts for display in help
pub struct ShortcutCategory {
    pub name: &'static str,
    pub shortcuts: Vec<ShortcutHelp>,
}

/// A single keyboard shortcut for display
pub struct ShortcutHelp {
    pub keys: &'static str,
    pub description: &'static str,
}

/// Returns categorized shortcuts for the help screen
pub fn shortcuts_help() -> Vec<ShortcutCategory> {
    vec![ShortcutCategory {
        name: "Thread actions",
        shortcuts: vec![
            ShortcutHelp {
                keys: "R",
                description: "Reply to selected thread",
            },
            ShortcutHelp {
                keys: "D",
                description: "Delete selected thread",
            },
        ],
    }]
}
