//! `forge exec`: run one shell command outside the TUI

use std::sync::Arc;

use crate::ai::{AiBackend, GeminiClient};
use crate::cli::ai::{audit_report, refactor_report};
use crate::cli::commands::ExecArgs;
use crate::core::config::Config;
use crate::core::formatter;
use crate::core::store::{FileStore, MemoryStore, SharedStore};
use crate::core::track::{self, TrackPayload};
use crate::error::Result;
use crate::terminal::commands::ACTIVE_FILE;
use crate::terminal::{LineKind, SessionEffect, TerminalSession, TerminalLine};

/// Handle `forge exec`
pub async fn handle_exec(args: ExecArgs) -> Result<()> {
    let config = Config::load()?;
    let store: SharedStore = if args.ephemeral {
        MemoryStore::shared()
    } else {
        Arc::new(FileStore::open(Config::store_path()?))
    };

    let backend: Option<Box<dyn AiBackend>> = match GeminiClient::new() {
        Ok(client) => Some(Box::new(client)),
        Err(e) => {
            tracing::debug!(error = %e, "AI backend unavailable for exec");
            None
        }
    };

    let mut session = TerminalSession::new(store);
    let lines = run_line(&mut session, &args.words.join(" "), backend.as_deref(), &config).await?;
    print_lines(&lines);
    Ok(())
}

/// Submit `line`, carry out its effects, and return the lines it produced
pub async fn run_line(
    session: &mut TerminalSession,
    line: &str,
    backend: Option<&dyn AiBackend>,
    config: &Config,
) -> Result<Vec<TerminalLine>> {
    let before = session.history().to_vec();
    let effects = session.submit(line);

    for effect in effects {
        match effect {
            SessionEffect::Format { code } => {
                session.complete_format(formatter::format_code(&code));
            }
            SessionEffect::Refactor { code } => {
                let report = match backend {
                    Some(backend) => refactor_report(backend, &code).await,
                    None => "No result. (Gemini API key is not set up)".to_string(),
                };
                session.log(LineKind::Output, report);
            }
            SessionEffect::Audit { file_name, code } => {
                let report = match backend {
                    Some(backend) => audit_report(backend, &file_name, &code).await,
                    None => "No result. (Gemini API key is not set up)".to_string(),
                };
                session.log(LineKind::Output, report);
            }
            SessionEffect::Track => {
                let payload = TrackPayload::refactor(None, session.code(), ACTIVE_FILE);
                let url = track::export_url(&config.track_url, &payload)?;
                session.log(LineKind::Info, format!("Export: {}", url));
            }
        }
    }

    // `clear` and `session load` replace the history wholesale
    let history = session.history();
    let produced = if history.starts_with(&before) {
        &history[before.len()..]
    } else {
        history
    };
    Ok(produced.to_vec())
}

fn print_lines(lines: &[TerminalLine]) {
    for line in lines {
        match line.kind {
            LineKind::Input => println!("> {}", line.content),
            LineKind::Error => eprintln!("{}", line.content),
            _ => println!("{}", line.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockAiBackend, RefactorSuggestion};

    fn session() -> TerminalSession {
        TerminalSession::new(MemoryStore::shared())
    }

    #[tokio::test]
    async fn test_format_applies_synchronously() {
        let mut s = session();
        let lines = run_line(&mut s, "format", None, &Config::default()).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].kind, LineKind::Success);
        assert!(s.code().contains("  const [count,setCount]=useState(0);"));
    }

    #[tokio::test]
    async fn test_clear_produces_no_lines() {
        let mut s = session();
        let lines = run_line(&mut s, "clear", None, &Config::default()).await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_refactor_uses_backend() {
        let mut backend = MockAiBackend::new();
        backend.expect_suggest_refactor().times(1).returning(|_| {
            Ok(RefactorSuggestion {
                explanation: "Extract a hook".into(),
                refactored_code: "const useCounter = () => {};".into(),
            })
        });

        let mut s = session();
        let lines = run_line(&mut s, "refactor", Some(&backend), &Config::default())
            .await
            .unwrap();
        assert!(lines.last().unwrap().content.contains("Extract a hook"));
    }

    #[tokio::test]
    async fn test_load_prints_restored_history() {
        let store = MemoryStore::shared();
        let mut first = TerminalSession::new(store.clone());
        first.submit("ls");
        first.submit("clear");
        first.submit("session save Empty");

        let mut s = TerminalSession::new(store);
        let lines = run_line(&mut s, "session load Empty", None, &Config::default())
            .await
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].content, "[SYSTEM] Loaded session: Empty");
    }

    #[tokio::test]
    async fn test_track_reports_export_url() {
        let mut s = session();
        let lines = run_line(&mut s, "track", None, &Config::default()).await.unwrap();
        let last = &lines.last().unwrap().content;
        assert!(last.starts_with("Export: https://trackcodex.workspace/import?payload="));
    }
}
