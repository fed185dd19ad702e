//! CLI command definitions using clap
//!
//! Defines the command structure for the `forge` CLI tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// forge - Forge Shell terminal IDE
///
/// Run without arguments to launch the TUI.
#[derive(Parser, Debug)]
#[command(name = "forge", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one shell command and print its output
    Exec(ExecArgs),

    /// Ask the AI for a web-grounded answer
    Search(SearchArgs),

    /// Audit a file for security vulnerabilities
    Audit(FileArgs),

    /// Suggest a refactor for a file
    Refactor(FileArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for `forge exec`
#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// Command line, e.g. `forge exec session list`
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub words: Vec<String>,

    /// Use a throwaway in-memory store instead of the saved-session file
    #[arg(long)]
    pub ephemeral: bool,
}

/// Arguments for `forge search`
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Search query
    #[arg(required = true, trailing_var_arg = true)]
    pub query: Vec<String>,

    /// Bookmark the query after searching
    #[arg(long)]
    pub save: bool,
}

/// A file argument for AI commands
#[derive(Parser, Debug)]
pub struct FileArgs {
    /// File to analyze
    pub path: PathBuf,

    /// Export the result to TrackCodex
    #[arg(long)]
    pub track: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Set a configuration value
    Set {
        /// Configuration key
        key: ConfigKey,
        /// Value to set
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: ConfigKey,
    },
    /// Remove a configuration value
    Remove {
        /// Configuration key
        key: ConfigKey,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
    /// Gemini API key (stored in the system keyring)
    GeminiKey,
    /// Gemini model for refactor suggestions
    GeminiModel,
    /// Gemini model for search and audits
    AnalysisModel,
    /// Simulated formatter delay in milliseconds
    FormatDelay,
}
