//! Export of shell actions to TrackCodex
//!
//! A payload describing the action is serialized to JSON, base64-encoded and
//! appended to the export URL, which is then opened in the user's browser.
//! Fire-and-forget: nothing is read back.

use std::process::Command;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde::Serialize;
use url::Url;

use crate::ai::{Citation, Vulnerability};
use crate::error::Result;

/// Payload sent with an export
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackPayload {
    /// Refactor result (or the raw buffer when no suggestion exists)
    CodeRefactor {
        explanation: String,
        code: String,
        source: String,
    },
    /// One finding from a security audit
    SecurityVulnerability {
        file: String,
        finding: Vulnerability,
        timestamp: String,
    },
    /// A grounded search answer
    SearchResult {
        query: String,
        content: String,
        sources: Vec<Citation>,
        timestamp: String,
    },
}

impl TrackPayload {
    /// Payload for a refactor export; falls back to the current buffer
    pub fn refactor(
        explanation: Option<&str>,
        code: &str,
        source: &str,
    ) -> Self {
        TrackPayload::CodeRefactor {
            explanation: explanation
                .unwrap_or("Manual push from terminal")
                .to_string(),
            code: code.to_string(),
            source: source.to_string(),
        }
    }

    pub fn vulnerability(file: &str, finding: Vulnerability) -> Self {
        TrackPayload::SecurityVulnerability {
            file: file.to_string(),
            finding,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn search(query: &str, content: &str, sources: Vec<Citation>) -> Self {
        TrackPayload::SearchResult {
            query: query.to_string(),
            content: content.to_string(),
            sources,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Base64 of the JSON encoding
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(STANDARD.encode(json))
    }
}

/// Build the export URL for `payload` under `base`
pub fn export_url(base: &str, payload: &TrackPayload) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .append_pair("payload", &payload.encode()?);
    Ok(url)
}

/// Build the export URL and hand it to the browser
///
/// Returns the URL so callers can show it if the browser could not start.
pub fn push(base: &str, payload: &TrackPayload) -> Result<Url> {
    let url = export_url(base, payload)?;
    if !open_browser(url.as_str()) {
        tracing::warn!(url = %url, "could not launch browser for export");
    }
    Ok(url)
}

/// Open a URL in the default browser
pub fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .is_ok()
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        let _ = url;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Severity;

    #[test]
    fn test_refactor_payload_defaults_explanation() {
        let payload = TrackPayload::refactor(None, "let x = 1;", "Managing State.tsx");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "code_refactor");
        assert_eq!(json["explanation"], "Manual push from terminal");
        assert_eq!(json["source"], "Managing State.tsx");
    }

    #[test]
    fn test_export_url_round_trips_payload() {
        let payload = TrackPayload::vulnerability(
            "main.py",
            Vulnerability {
                line: 4,
                kind: "Hardcoded Secret".into(),
                severity: Severity::High,
                description: "live key".into(),
                fix: "use env".into(),
            },
        );
        let url = export_url("https://trackcodex.workspace/import", &payload).unwrap();
        assert_eq!(url.host_str(), Some("trackcodex.workspace"));

        let (_, encoded) = url
            .query_pairs()
            .find(|(k, _)| k == "payload")
            .expect("payload param");
        let decoded = STANDARD.decode(encoded.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(json["type"], "security_vulnerability");
        assert_eq!(json["finding"]["type"], "Hardcoded Secret");
    }

    #[test]
    fn test_export_url_rejects_bad_base() {
        let payload = TrackPayload::refactor(None, "", "x");
        assert!(export_url("not a url", &payload).is_err());
    }
}
