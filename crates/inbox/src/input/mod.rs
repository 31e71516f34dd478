//! Input handling module for keyboard shortcuts
//!
//! Key dispatch itself lives on `Session::dispatch_key`; this module holds
//! the bindings and help text.

pub mod keymap;

pub use keymap::{KeyDisposition, Shortcut, ShortcutCategory, ShortcutHelp, shortcuts_help};
