//! Named snapshots of the terminal and code buffer
//!
//! Snapshots are kept most-recent-first, capped at [`MAX_SAVED_SESSIONS`],
//! and mirrored to the key-value store after every save.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::store::{read_json, write_json, SharedStore};
use crate::terminal::TerminalLine;

/// Store key holding the serialized session list
pub const SESSIONS_KEY: &str = "forge_terminal_sessions";

/// Maximum number of snapshots kept
pub const MAX_SAVED_SESSIONS: usize = 10;

/// A saved terminal session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub id: Uuid,
    pub name: String,
    pub history: Vec<TerminalLine>,
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

impl SavedSession {
    /// Creation time rendered in local time
    pub fn local_timestamp(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

/// Saved sessions backed by a key-value store
pub struct SessionStore {
    store: SharedStore,
    sessions: Vec<SavedSession>,
}

impl SessionStore {
    /// Load the session list once; a missing or malformed payload is empty
    pub fn load(store: SharedStore) -> Self {
        let mut sessions: Vec<SavedSession> =
            read_json(store.as_ref(), SESSIONS_KEY).unwrap_or_default();
        sessions.truncate(MAX_SAVED_SESSIONS);
        tracing::debug!(count = sessions.len(), "loaded saved sessions");
        Self { store, sessions }
    }

    /// Snapshot `history` and `code` under `name`
    ///
    /// The new session goes first; the oldest falls off past the cap. A
    /// failed write is logged and the in-memory list is still updated.
    pub fn save(&mut self, name: &str, history: &[TerminalLine], code: &str) -> &SavedSession {
        let session = SavedSession {
            id: Uuid::new_v4(),
            name: name.to_string(),
            history: history.to_vec(),
            code: code.to_string(),
            timestamp: Utc::now(),
        };

        self.sessions.insert(0, session);
        self.sessions.truncate(MAX_SAVED_SESSIONS);

        if let Err(e) = write_json(self.store.as_ref(), SESSIONS_KEY, &self.sessions) {
            tracing::warn!(error = %e, "failed to persist saved sessions");
        }

        &self.sessions[0]
    }

    /// Most recent session with exactly this name
    pub fn find(&self, name: &str) -> Option<&SavedSession> {
        self.sessions.iter().find(|s| s.name == name)
    }

    /// All sessions, most recent first
    pub fn list(&self) -> &[SavedSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{KeyValueStore, MemoryStore};
    use crate::terminal::LineKind;

    #[test]
    fn test_save_prepends_and_caps() {
        let mut sessions = SessionStore::load(MemoryStore::shared());
        for i in 0..=MAX_SAVED_SESSIONS {
            sessions.save(&format!("s{}", i), &[], "code");
        }

        assert_eq!(sessions.len(), MAX_SAVED_SESSIONS);
        assert_eq!(sessions.list()[0].name, "s10");
        assert_eq!(sessions.list()[MAX_SAVED_SESSIONS - 1].name, "s1");
        assert!(sessions.find("s0").is_none());
    }

    #[test]
    fn test_sessions_survive_reload() {
        let store = MemoryStore::shared();
        let line = TerminalLine::new(LineKind::Output, "hello");
        SessionStore::load(store.clone()).save("keep", &[line.clone()], "let a = 1;");

        let reloaded = SessionStore::load(store);
        let session = reloaded.find("keep").expect("session persisted");
        assert_eq!(session.history, vec![line]);
        assert_eq!(session.code, "let a = 1;");
    }

    #[test]
    fn test_malformed_payload_loads_empty() {
        let store = MemoryStore::shared();
        store.set(SESSIONS_KEY, "{\"oops\": ").unwrap();
        assert!(SessionStore::load(store).is_empty());
    }

    #[test]
    fn test_find_prefers_most_recent_duplicate() {
        let mut sessions = SessionStore::load(MemoryStore::shared());
        sessions.save("dup", &[], "old");
        sessions.save("dup", &[], "new");
        assert_eq!(sessions.find("dup").map(|s| s.code.as_str()), Some("new"));
    }
}
