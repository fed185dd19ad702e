//! Custom error types for forge-shell
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

/// Main error type for the forge-shell application
#[derive(Error, Debug)]
pub enum ForgeError {
    /// Credential storage error
    #[error("Cannot access secure storage: {0}\n\n  → On macOS: Make sure Keychain Access is available.\n  → On Linux: Ensure a secret service (like gnome-keyring) is running.")]
    Credential(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key-value store error
    #[error("Cannot write local store: {0}\n\n  → Check permissions on the forge-shell data directory.")]
    Store(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Terminal/TUI error
    #[error("Terminal error: {0}\n\n  → Try resizing your terminal or restarting it.")]
    Terminal(String),

    /// Gemini API error
    #[error("AI request failed: {0}\n\n  → Check your Gemini API key with 'forge config get gemini-key'.")]
    GeminiApi(String),

    /// Gemini API not configured
    #[error("Gemini API key is not set up.\n\n  → Get an API key from https://aistudio.google.com/apikey\n  → Run 'forge config set gemini-key YOUR_KEY' to configure it.")]
    GeminiNotConfigured,

    /// Export URL could not be built
    #[error("Cannot build export link: {0}")]
    Export(String),

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),
}

impl From<keyring::Error> for ForgeError {
    fn from(err: keyring::Error) -> Self {
        ForgeError::Credential(err.to_string())
    }
}

impl From<toml::de::Error> for ForgeError {
    fn from(err: toml::de::Error) -> Self {
        ForgeError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for ForgeError {
    fn from(err: toml::ser::Error) -> Self {
        ForgeError::Toml(err.to_string())
    }
}

impl From<url::ParseError> for ForgeError {
    fn from(err: url::ParseError) -> Self {
        ForgeError::Export(err.to_string())
    }
}

/// Result type alias using ForgeError
pub type Result<T> = std::result::Result<T, ForgeError>;
