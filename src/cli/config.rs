//! Configuration CLI command handlers

use crate::cli::commands::{ConfigCommand, ConfigKey};
use crate::core::config::{Config, GeminiModel};
use crate::core::credentials::CredentialStore;
use crate::error::{ForgeError, Result};

/// Handle configuration commands
pub fn handle_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Set { key, value } => handle_set(key, value),
        ConfigCommand::Get { key } => handle_get(key),
        ConfigCommand::Remove { key } => handle_remove(key),
    }
}

fn handle_set(key: ConfigKey, value: String) -> Result<()> {
    if key == ConfigKey::GeminiKey {
        CredentialStore::store_gemini_key(&value)?;
        println!("Gemini API key has been stored securely.");
        return Ok(());
    }

    let mut config = Config::load()?;
    match key {
        ConfigKey::GeminiModel => {
            config.set_gemini_model(parse_model(&value)?);
            println!("Gemini model set to: {}", config.gemini_model.display_name());
        }
        ConfigKey::AnalysisModel => {
            config.analysis_model = parse_model(&value)?;
            println!(
                "Analysis model set to: {}",
                config.analysis_model.display_name()
            );
        }
        ConfigKey::FormatDelay => {
            config.format_delay_ms = value.trim().parse().map_err(|_| {
                ForgeError::InvalidInput(format!(
                    "Invalid delay '{}'. Expected a number of milliseconds.",
                    value
                ))
            })?;
            println!("Formatter delay set to {} ms", config.format_delay_ms);
        }
        ConfigKey::GeminiKey => unreachable!(),
    }
    config.save()
}

fn handle_get(key: ConfigKey) -> Result<()> {
    match key {
        ConfigKey::GeminiKey => match CredentialStore::get_gemini_key()? {
            Some(key) => println!("Gemini API key: {}", CredentialStore::mask_token(&key)),
            None => println!("Gemini API key: Not configured"),
        },
        ConfigKey::GeminiModel => {
            let model = Config::load()?.gemini_model;
            println!("Gemini model: {} ({})", model.display_name(), model.api_name());
        }
        ConfigKey::AnalysisModel => {
            let model = Config::load()?.analysis_model;
            println!("Analysis model: {} ({})", model.display_name(), model.api_name());
        }
        ConfigKey::FormatDelay => {
            println!("Formatter delay: {} ms", Config::load()?.format_delay_ms);
        }
    }
    Ok(())
}

fn handle_remove(key: ConfigKey) -> Result<()> {
    if key == ConfigKey::GeminiKey {
        CredentialStore::delete_gemini_key()?;
        println!("Gemini API key has been removed.");
        return Ok(());
    }

    let mut config = Config::load()?;
    let defaults = Config::default();
    match key {
        ConfigKey::GeminiModel => config.gemini_model = defaults.gemini_model,
        ConfigKey::AnalysisModel => config.analysis_model = defaults.analysis_model,
        ConfigKey::FormatDelay => config.format_delay_ms = defaults.format_delay_ms,
        ConfigKey::GeminiKey => unreachable!(),
    }
    config.save()?;
    println!("Reset {:?} to its default.", key);
    Ok(())
}

fn parse_model(value: &str) -> Result<GeminiModel> {
    GeminiModel::from_api_name(value).ok_or_else(|| {
        ForgeError::InvalidInput(format!(
            "Invalid model '{}'. Available models: {}",
            value,
            GeminiModel::all()
                .iter()
                .map(|m| m.api_name())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}
