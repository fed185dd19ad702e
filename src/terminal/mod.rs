//! The Forge Shell terminal
//!
//! A single [`TerminalSession`] owns the scrollback, the input line, Tab
//! completion and the saved-session snapshots. The TUI drives it with key
//! events and carries out the [`SessionEffect`]s it returns.

pub mod autocomplete;
pub mod commands;
pub mod session;
pub mod sessions;

use chrono::Local;
use serde::{Deserialize, Serialize};

pub use autocomplete::AutocompleteState;
pub use session::{SessionEffect, TerminalSession};
pub use sessions::{SavedSession, SessionStore};

/// Kind of a scrollback line; drives icon and color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Input,
    Output,
    Error,
    Success,
    Warning,
    Info,
}

/// One scrollback line. Never edited after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalLine {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub content: String,
    pub timestamp: String,
}

impl TerminalLine {
    /// New line stamped with the local wall-clock time
    pub fn new(kind: LineKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        }
    }
}
