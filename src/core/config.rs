//! Application configuration management
//!
//! Handles loading and saving application settings including:
//! - Gemini model selection
//! - Formatter delay and terminal pane height
//! - Export (track) endpoint

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};

/// Default export endpoint used by `track`
pub const DEFAULT_TRACK_URL: &str = "https://trackcodex.workspace/import";

/// Available Gemini models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,
    /// Gemini 3 Flash Preview (default)
    #[default]
    #[serde(rename = "gemini-3-flash-preview")]
    Gemini3FlashPreview,
    /// Gemini 3 Pro Preview
    #[serde(rename = "gemini-3-pro-preview")]
    Gemini3ProPreview,
}

impl GeminiModel {
    /// Get the API model identifier
    pub fn api_name(&self) -> &'static str {
        match self {
            GeminiModel::Gemini25Flash => "gemini-2.5-flash",
            GeminiModel::Gemini3FlashPreview => "gemini-3-flash-preview",
            GeminiModel::Gemini3ProPreview => "gemini-3-pro-preview",
        }
    }

    /// Get a human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            GeminiModel::Gemini25Flash => "Gemini 2.5 Flash",
            GeminiModel::Gemini3FlashPreview => "Gemini 3 Flash Preview",
            GeminiModel::Gemini3ProPreview => "Gemini 3 Pro Preview",
        }
    }

    /// Parse from string
    pub fn from_api_name(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.api_name() == s)
    }

    /// Get all available models
    pub fn all() -> &'static [GeminiModel] {
        &[
            GeminiModel::Gemini25Flash,
            GeminiModel::Gemini3FlashPreview,
            GeminiModel::Gemini3ProPreview,
        ]
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model used for quick tasks (refactor suggestions)
    #[serde(default)]
    pub gemini_model: GeminiModel,

    /// Model used for grounded search and security audits
    #[serde(default = "default_analysis_model")]
    pub analysis_model: GeminiModel,

    /// Simulated formatter latency in milliseconds
    #[serde(default = "default_format_delay")]
    pub format_delay_ms: u64,

    /// Base URL for `track` exports
    #[serde(default = "default_track_url")]
    pub track_url: String,

    /// Initial terminal pane height in rows
    #[serde(default = "default_terminal_height")]
    pub terminal_height: u16,
}

fn default_analysis_model() -> GeminiModel {
    GeminiModel::Gemini3ProPreview
}

fn default_format_delay() -> u64 {
    600
}

fn default_track_url() -> String {
    DEFAULT_TRACK_URL.to_string()
}

fn default_terminal_height() -> u16 {
    12
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_model: GeminiModel::default(),
            analysis_model: default_analysis_model(),
            format_delay_ms: default_format_delay(),
            track_url: default_track_url(),
            terminal_height: default_terminal_height(),
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "forge-shell", "forge-shell")
            .ok_or_else(|| ForgeError::Config("Could not determine config directory".into()))?;

        Ok(project_dirs.config_dir().to_path_buf())
    }

    /// Path of the key-value store backing saved sessions and queries
    pub fn store_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("store.json"))
    }

    /// Path of the log file used while the TUI owns the screen
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("forge.log"))
    }

    /// Set the Gemini model
    pub fn set_gemini_model(&mut self, model: GeminiModel) {
        self.gemini_model = model;
    }
}
