//! AI CLI command handlers (search, audit, refactor)

use std::fs;
use std::path::Path;

use crate::ai::{AiBackend, GeminiClient, RefactorSuggestion, SearchResult, SecurityAudit};
use crate::cli::commands::{FileArgs, SearchArgs};
use crate::core::config::Config;
use crate::core::store::FileStore;
use crate::core::track::{self, TrackPayload};
use crate::error::{ForgeError, Result};
use crate::panels::{outcome, SavedQueries};

/// Handle `forge search`
pub async fn handle_search(args: SearchArgs) -> Result<()> {
    let query = args.query.join(" ");
    if query.trim().is_empty() {
        return Err(ForgeError::InvalidInput("Search query cannot be empty".into()));
    }

    if args.save {
        let store = std::sync::Arc::new(FileStore::open(Config::store_path()?));
        if SavedQueries::load(store).save(&query) {
            println!("Saved query: {}", query.trim());
        }
    }

    let client = GeminiClient::new()?;
    println!("Searching with {}...", client.model_name());
    match outcome("search", client.search(&query).await) {
        Some(result) => println!("{}", format_search(&result)),
        None => println!("No result."),
    }
    Ok(())
}

/// Handle `forge audit <file>`
pub async fn handle_audit(args: FileArgs) -> Result<()> {
    let (name, content) = read_source(&args.path)?;
    let client = GeminiClient::new()?;

    let Some(audit) = outcome("audit", client.audit_security(&name, &content).await) else {
        println!("No result.");
        return Ok(());
    };

    println!("{}", format_audit(&name, &audit));

    if args.track {
        let base = Config::load()?.track_url;
        for finding in &audit.vulnerabilities {
            let payload = TrackPayload::vulnerability(&name, finding.clone());
            println!("Export: {}", track::export_url(&base, &payload)?);
        }
    }
    Ok(())
}

/// Handle `forge refactor <file>`
pub async fn handle_refactor(args: FileArgs) -> Result<()> {
    let (name, content) = read_source(&args.path)?;
    let client = GeminiClient::new()?;

    let Some(suggestion) = outcome("refactor", client.suggest_refactor(&content).await) else {
        println!("No result.");
        return Ok(());
    };

    println!("{}", format_refactor(&suggestion));

    if args.track {
        let payload = TrackPayload::refactor(
            Some(&suggestion.explanation),
            &suggestion.refactored_code,
            &name,
        );
        println!("Export: {}", track::export_url(&Config::load()?.track_url, &payload)?);
    }
    Ok(())
}

/// Ask `backend` for a refactor and render it, or a no-result notice
pub async fn refactor_report(backend: &dyn AiBackend, code: &str) -> String {
    match outcome("refactor", backend.suggest_refactor(code).await) {
        Some(suggestion) => format_refactor(&suggestion),
        None => "No result.".to_string(),
    }
}

/// Ask `backend` for an audit and render it, or a no-result notice
pub async fn audit_report(backend: &dyn AiBackend, file_name: &str, code: &str) -> String {
    match outcome("audit", backend.audit_security(file_name, code).await) {
        Some(audit) => format_audit(file_name, &audit),
        None => "No result.".to_string(),
    }
}

fn read_source(path: &Path) -> Result<(String, String)> {
    let content = fs::read_to_string(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, content))
}

pub fn format_refactor(suggestion: &RefactorSuggestion) -> String {
    format!(
        "{}\n\n{}",
        suggestion.explanation.trim(),
        suggestion.refactored_code.trim_end()
    )
}

pub fn format_audit(file_name: &str, audit: &SecurityAudit) -> String {
    if audit.vulnerabilities.is_empty() {
        return format!("No vulnerabilities found in {}.", file_name);
    }

    let mut out = format!(
        "{} finding(s) in {}:\n",
        audit.vulnerabilities.len(),
        file_name
    );
    for v in &audit.vulnerabilities {
        out.push_str(&format!(
            "\n[{}] line {}: {}\n  {}\n  fix: {}\n",
            v.severity.label().to_uppercase(),
            v.line,
            v.kind,
            v.description,
            v.fix
        ));
    }
    out
}

pub fn format_search(result: &SearchResult) -> String {
    let mut out = result.synthesis.trim().to_string();
    if !result.citations.is_empty() {
        out.push_str("\n\nSources:");
        for c in &result.citations {
            out.push_str(&format!("\n  {} {} <{}>", c.id, c.title, c.url));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{Citation, MockAiBackend, Severity, Vulnerability};

    #[test]
    fn test_format_audit_lists_findings() {
        let audit = SecurityAudit {
            vulnerabilities: vec![Vulnerability {
                line: 4,
                kind: "Hardcoded Secret".into(),
                severity: Severity::High,
                description: "Live key in source".into(),
                fix: "Load from env".into(),
            }],
        };
        let text = format_audit("main.py", &audit);
        assert!(text.starts_with("1 finding(s) in main.py"));
        assert!(text.contains("[HIGH] line 4: Hardcoded Secret"));

        let clean = format_audit("main.py", &SecurityAudit::default());
        assert_eq!(clean, "No vulnerabilities found in main.py.");
    }

    #[test]
    fn test_format_search_appends_sources() {
        let result = SearchResult {
            synthesis: "Answer".into(),
            citations: vec![Citation {
                id: "[1]".into(),
                title: "Docs".into(),
                url: "https://docs.rs".into(),
            }],
        };
        assert_eq!(
            format_search(&result),
            "Answer\n\nSources:\n  [1] Docs <https://docs.rs>"
        );
    }

    #[tokio::test]
    async fn test_audit_report_handles_failure() {
        let mut backend = MockAiBackend::new();
        backend
            .expect_audit_security()
            .returning(|_, _| Err(ForgeError::GeminiNotConfigured));
        assert_eq!(audit_report(&backend, "a.ts", "x").await, "No result.");
    }
}
