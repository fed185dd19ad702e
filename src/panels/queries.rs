//! Saved search queries

use crate::core::store::{read_json, write_json, SharedStore};

/// Store key holding the saved query list
pub const QUERIES_KEY: &str = "forge_saved_queries";

/// Bookmarked search queries, newest first
pub struct SavedQueries {
    store: SharedStore,
    queries: Vec<String>,
}

impl SavedQueries {
    /// Load once from the store; malformed data is treated as empty
    pub fn load(store: SharedStore) -> Self {
        let queries = read_json(store.as_ref(), QUERIES_KEY).unwrap_or_default();
        Self { store, queries }
    }

    pub fn list(&self) -> &[String] {
        &self.queries
    }

    /// Bookmark `query`; blank and duplicate queries are ignored
    pub fn save(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() || self.queries.iter().any(|q| q == query) {
            return false;
        }
        self.queries.insert(0, query.to_string());
        self.persist();
        true
    }

    pub fn remove(&mut self, query: &str) {
        let before = self.queries.len();
        self.queries.retain(|q| q != query);
        if self.queries.len() != before {
            self.persist();
        }
    }

    pub fn clear(&mut self) {
        self.queries.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = write_json(self.store.as_ref(), QUERIES_KEY, &self.queries) {
            tracing::warn!(error = %e, "failed to persist saved queries");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{KeyValueStore, MemoryStore};

    #[test]
    fn test_save_trims_and_dedupes() {
        let mut saved = SavedQueries::load(MemoryStore::shared());
        assert!(saved.save("  rust async  "));
        assert!(!saved.save("rust async"));
        assert!(!saved.save("   "));
        assert!(saved.save("tokio select"));
        assert_eq!(saved.list(), ["tokio select", "rust async"]);
    }

    #[test]
    fn test_remove_and_clear_persist() {
        let store = MemoryStore::shared();
        let mut saved = SavedQueries::load(store.clone());
        saved.save("a");
        saved.save("b");
        saved.remove("a");
        assert_eq!(SavedQueries::load(store.clone()).list(), ["b"]);

        saved.clear();
        assert!(SavedQueries::load(store).list().is_empty());
    }

    #[test]
    fn test_malformed_store_loads_empty() {
        let store = MemoryStore::shared();
        store.set(QUERIES_KEY, "not json").unwrap();
        assert!(SavedQueries::load(store).list().is_empty());
    }
}
