//! AI-backed result panels
//!
//! Each panel tracks one request at a time. Issuing a new request
//! supersedes the previous one: completions carrying an older
//! [`RequestId`] are dropped, so the newest request always wins.

pub mod queries;

use crate::error::Result;

pub use queries::SavedQueries;

/// Identifies one issued request within a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// What a panel currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState<T> {
    /// Nothing requested yet
    Idle,
    /// Waiting on the backend
    Pending,
    /// Backend answered
    Ready(T),
    /// Backend failed; nothing to show
    NoResult,
}

impl<T> PanelState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, PanelState::Pending)
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            PanelState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Request bookkeeping for one panel
#[derive(Debug)]
pub struct Panel<T> {
    state: PanelState<T>,
    next_id: u64,
    latest: Option<RequestId>,
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Self {
            state: PanelState::Idle,
            next_id: 0,
            latest: None,
        }
    }
}

impl<T> Panel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PanelState<T> {
        &self.state
    }

    /// Start a request; any earlier in-flight request becomes stale
    pub fn begin(&mut self) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.latest = Some(id);
        self.state = PanelState::Pending;
        id
    }

    /// Apply a completion; returns false when `id` was superseded
    pub fn complete(&mut self, id: RequestId, outcome: Option<T>) -> bool {
        if self.latest != Some(id) {
            tracing::debug!(?id, latest = ?self.latest, "dropping stale panel result");
            return false;
        }

        self.latest = None;
        self.state = match outcome {
            Some(value) => PanelState::Ready(value),
            None => PanelState::NoResult,
        };
        true
    }

    /// Drop the current result and forget any in-flight request
    pub fn reset(&mut self) {
        self.latest = None;
        self.state = PanelState::Idle;
    }
}

/// Turn a backend result into a panel outcome, logging failures
pub fn outcome<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(request = what, error = %e, "AI request returned no result");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiBackend, MockAiBackend, RefactorSuggestion};
    use crate::error::ForgeError;

    #[test]
    fn test_pending_then_ready() {
        let mut panel: Panel<u32> = Panel::new();
        assert_eq!(panel.state(), &PanelState::Idle);

        let id = panel.begin();
        assert!(panel.state().is_pending());
        assert!(panel.complete(id, Some(7)));
        assert_eq!(panel.state().result(), Some(&7));
    }

    #[test]
    fn test_failure_is_distinct_from_pending() {
        let mut panel: Panel<u32> = Panel::new();
        let id = panel.begin();
        panel.complete(id, None);
        assert_eq!(panel.state(), &PanelState::NoResult);
        assert!(!panel.state().is_pending());
    }

    #[test]
    fn test_latest_request_wins() {
        let mut panel: Panel<&str> = Panel::new();
        let first = panel.begin();
        let second = panel.begin();

        assert!(panel.complete(second, Some("new")));
        assert!(!panel.complete(first, Some("old")));
        assert_eq!(panel.state().result(), Some(&"new"));
    }

    #[test]
    fn test_reset_discards_in_flight() {
        let mut panel: Panel<u32> = Panel::new();
        let id = panel.begin();
        panel.reset();
        assert!(!panel.complete(id, Some(1)));
        assert_eq!(panel.state(), &PanelState::Idle);
    }

    #[tokio::test]
    async fn test_backend_error_becomes_no_result() {
        let mut backend = MockAiBackend::new();
        backend
            .expect_suggest_refactor()
            .returning(|_| Err(ForgeError::GeminiApi("boom".into())));

        let mut panel: Panel<RefactorSuggestion> = Panel::new();
        let id = panel.begin();
        let result = outcome("refactor", backend.suggest_refactor("code").await);
        panel.complete(id, result);
        assert_eq!(panel.state(), &PanelState::NoResult);
    }

    #[tokio::test]
    async fn test_backend_success_is_shown() {
        let mut backend = MockAiBackend::new();
        backend.expect_suggest_refactor().returning(|code| {
            Ok(RefactorSuggestion {
                explanation: "tidy".into(),
                refactored_code: format!("// tidy\n{}", code),
            })
        });

        let mut panel = Panel::new();
        let id = panel.begin();
        panel.complete(id, outcome("refactor", backend.suggest_refactor("x").await));
        let shown = panel.state().result().expect("ready");
        assert_eq!(shown.refactored_code, "// tidy\nx");
    }
}
