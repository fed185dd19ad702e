//! AI integration module
//!
//! The shell only talks to AI through the [`AiBackend`] trait:
//! - Refactor suggestions for the active buffer
//! - Security audits of a file
//! - Web-grounded search with citations
//!
//! [`GeminiClient`] is the production backend.

pub mod gemini;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use gemini::GeminiClient;

/// Capability consumed by the shell and its panels
///
/// Every call may fail (network, auth, parse). Callers treat an error as
/// "no result" and never propagate it further.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Suggest a refactor of `code`
    async fn suggest_refactor(&self, code: &str) -> Result<RefactorSuggestion>;

    /// Audit `content` of `file_name` for vulnerabilities
    async fn audit_security(&self, file_name: &str, content: &str) -> Result<SecurityAudit>;

    /// Answer `query` with a synthesis grounded in web sources
    async fn search(&self, query: &str) -> Result<SearchResult>;
}

/// Refactor suggestion for a code buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefactorSuggestion {
    pub explanation: String,
    pub refactored_code: String,
}

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    /// Lenient parse; anything unrecognized counts as low
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "critical" => Severity::High,
            "medium" | "moderate" => Severity::Medium,
            _ => Severity::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// A single security finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub line: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    pub fix: String,
}

/// Result of a security audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SecurityAudit {
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
}

/// A web source backing a search synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Display marker, e.g. `[1]`
    pub id: String,
    pub title: String,
    pub url: String,
}

/// Result of a grounded search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub synthesis: String,
    pub citations: Vec<Citation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("HIGH"), Severity::High);
        assert_eq!(Severity::parse("critical"), Severity::High);
        assert_eq!(Severity::parse("medium"), Severity::Medium);
        assert_eq!(Severity::parse("unknown"), Severity::Low);
    }

    #[test]
    fn test_vulnerability_uses_type_key() {
        let json = serde_json::to_value(Vulnerability {
            line: 4,
            kind: "Hardcoded Secret".into(),
            severity: Severity::High,
            description: "API key in source".into(),
            fix: "Read it from the environment".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "Hardcoded Secret");
        assert_eq!(json["severity"], "high");
    }
}
