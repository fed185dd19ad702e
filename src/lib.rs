//! forge-shell - a terminal IDE shell with AI assistance
//!
//! The library holds the shell state machine (command grammar, Tab
//! completion, saved sessions), the AI backend abstraction with its Gemini
//! implementation, and both the CLI and TUI front ends.

pub mod ai;
pub mod cli;
pub mod core;
pub mod error;
pub mod panels;
pub mod terminal;
pub mod tui;

pub use error::{ForgeError, Result};
