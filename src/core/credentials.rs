//! API key storage backed by the system keyring
//!
//! The Gemini key lives in the platform keychain (macOS Keychain, Linux
//! Secret Service). `GEMINI_API_KEY` in the environment always wins, which
//! keeps CI and scripted runs keychain-free.
//!
//! Lookups are cached per process so the keychain is prompted at most once.

use std::sync::RwLock;

use keyring::Entry;
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{ForgeError, Result};

const SERVICE_NAME: &str = "forge-shell";
const GEMINI_ACCOUNT: &str = "gemini_api_key";
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

// None = keyring not consulted yet, Some(None) = consulted and empty
static GEMINI_KEY_CACHE: Lazy<RwLock<Option<Option<SecretString>>>> =
    Lazy::new(|| RwLock::new(None));

/// Credential store for the AI backend key
pub struct CredentialStore;

impl CredentialStore {
    /// Store the Gemini API key in the keyring
    pub fn store_gemini_key(key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ForgeError::InvalidInput(
                "API key cannot be empty".to_string(),
            ));
        }

        Self::entry()?.set_password(key)?;
        Self::write_cache(Some(SecretString::from(key.to_string())));
        tracing::debug!("gemini key stored in keyring");
        Ok(())
    }

    /// Look up the Gemini API key
    ///
    /// Priority: environment variable > cache > keyring
    pub fn get_gemini_key() -> Result<Option<SecretString>> {
        if let Some(key) = Self::key_from_env() {
            return Ok(Some(key));
        }

        if let Ok(cache) = GEMINI_KEY_CACHE.read() {
            if let Some(cached) = cache.as_ref() {
                return Ok(cached.clone());
            }
        }

        let fetched = match Self::entry()?.get_password() {
            Ok(password) => Some(SecretString::from(password)),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                return Err(ForgeError::Credential(format!(
                    "Cannot access system keychain. Make sure your keyring is unlocked. ({})",
                    e
                )))
            }
        };

        Self::write_cache(fetched.clone());
        Ok(fetched)
    }

    /// Remove the Gemini API key from the keyring
    pub fn delete_gemini_key() -> Result<()> {
        let result = match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ForgeError::Credential(e.to_string())),
        };

        Self::write_cache(None);
        result
    }

    /// Get the Gemini API key, returning an error if not configured
    pub fn require_gemini_key() -> Result<SecretString> {
        Self::get_gemini_key()?.ok_or(ForgeError::GeminiNotConfigured)
    }

    /// Masked form for display: first 4 and last 4 characters
    pub fn mask_token(token: &SecretString) -> String {
        let exposed = token.expose_secret();
        let chars: Vec<char> = exposed.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }

    fn key_from_env() -> Option<SecretString> {
        std::env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from)
    }

    fn entry() -> Result<Entry> {
        Ok(Entry::new(SERVICE_NAME, GEMINI_ACCOUNT)?)
    }

    fn write_cache(value: Option<SecretString>) {
        if let Ok(mut cache) = GEMINI_KEY_CACHE.write() {
            *cache = Some(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        let short = SecretString::from("abc");
        assert_eq!(CredentialStore::mask_token(&short), "***");

        let long = SecretString::from("AIzaSy1234567890abcd");
        assert_eq!(CredentialStore::mask_token(&long), "AIza...abcd");
    }

    #[test]
    fn test_store_rejects_blank_key() {
        let err = CredentialStore::store_gemini_key("   ").unwrap_err();
        assert!(matches!(err, ForgeError::InvalidInput(_)));
    }
}
