//! Debate Memory Store
//!
//! A bounded key-value store shared by the participants of a debate. Each
//! entry carries a JSON value, the UTC time it was written and
//! the name of whoever wrote it. Participants record tool results and their
//! own insights here, and the prompt builder renders the newest entries back
//! into every prompt as "relevant context".
//!
//! The store optionally persists to a single JSON file mapping key → entry.
//! Persistence never fails a debate: unreadable files load as an empty store
//! and write failures are logged.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use symposium_engine::memory::MemoryStore;
//!
//! let mut memory = MemoryStore::new(100);
//! memory.add("initial_question", json!("What is justice?"), "user");
//!
//! assert_eq!(memory.get("initial_question"), Some(&json!("What is justice?")));
//! assert!(memory.render(5).starts_with("Recent relevant context:"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use sdk::errors::EngineError;

use crate::config::MemoryConfig;

/// UTC timestamp layout; sorts lexically in chronological order
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// A single memory record
///
/// This is also the on-disk entry shape. A file entry without `key` takes
/// the key of its enclosing JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    #[serde(default)]
    pub key: String,
    pub value: Value,
    pub timestamp: String,
    #[serde(default)]
    pub source: String,
}

impl MemoryEntry {
    /// Value as prompt text: strings raw, everything else as compact JSON
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Read-only view of the store, as returned by `memory show --json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    /// Entries, newest first
    pub entries: Vec<MemoryEntry>,
    pub count: usize,
    pub persist_path: Option<PathBuf>,
}

/// Bounded key-value memory
#[derive(Debug, Clone)]
pub struct MemoryStore {
    /// Entries in insertion order; an upsert moves the entry to the back
    entries: Vec<MemoryEntry>,

    /// Upper bound on `entries.len()`
    max_entries: usize,

    /// JSON file backing the store, if any
    persist_path: Option<PathBuf>,

    /// Flush after every mutation
    auto_save: bool,
}

impl MemoryStore {
    /// Create an in-memory store with no persistence
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
            persist_path: None,
            auto_save: false,
        }
    }

    /// Create a store backed by `path`, loading whatever it already holds
    pub fn open(path: impl Into<PathBuf>, max_entries: usize, auto_save: bool) -> Self {
        let mut store = Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
            persist_path: Some(path.into()),
            auto_save,
        };
        store.load();
        store
    }

    /// Build a store from the `[memory]` config section
    pub fn from_config(config: &MemoryConfig) -> Self {
        if config.persist {
            Self::open(&config.persist_path, config.max_entries, config.auto_save)
        } else {
            Self::new(config.max_entries)
        }
    }

    /// Insert or replace `key`
    ///
    /// The entry is stamped with the current UTC time. When the store
    /// grows past `max_entries`, the entry with the oldest timestamp is
    /// evicted (earliest inserted wins ties).
    pub fn add(&mut self, key: impl Into<String>, value: Value, source: impl Into<String>) {
        let key = key.into();

        if let Some(pos) = self.entries.iter().position(|e| e.key == key) {
            self.entries.remove(pos);
        }

        self.entries.push(MemoryEntry {
            key,
            value,
            timestamp: now_timestamp(),
            source: source.into(),
        });

        self.enforce_bound();

        if self.auto_save {
            self.save();
        }
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entry(key).map(|e| &e.value)
    }

    /// Full entry stored under `key`
    pub fn entry(&self, key: &str) -> Option<&MemoryEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Case-insensitive substring search over keys and values, newest first
    pub fn search(&self, query: &str, limit: usize) -> Vec<&MemoryEntry> {
        let needle = query.to_lowercase();

        self.newest_first()
            .into_iter()
            .filter(|e| {
                e.key.to_lowercase().contains(&needle)
                    || e.value_text().to_lowercase().contains(&needle)
            })
            .take(limit)
            .collect()
    }

    /// The `n` newest entries, newest first
    pub fn recent(&self, n: usize) -> Vec<&MemoryEntry> {
        let mut entries = self.newest_first();
        entries.truncate(n);
        entries
    }

    /// Render the newest `limit` entries as a prompt section
    pub fn render(&self, limit: usize) -> String {
        if self.entries.is_empty() {
            return "No relevant memory.".to_string();
        }

        let mut lines = vec!["Recent relevant context:".to_string()];
        for entry in self.recent(limit) {
            lines.push(format!(
                "- {}: {} (from {})",
                entry.key,
                entry.value_text(),
                entry.source
            ));
        }
        lines.join("\n")
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        if self.auto_save {
            self.save();
        }
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            entries: self.newest_first().into_iter().cloned().collect(),
            count: self.entries.len(),
            persist_path: self.persist_path.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save
    }

    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }

    /// Replace the contents with what the backing file holds
    ///
    /// A missing file yields an empty store. A file that cannot be read or
    /// parsed also yields an empty store, with a warning.
    pub fn load(&mut self) {
        self.entries.clear();

        let Some(path) = self.persist_path.clone() else {
            return;
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No memory file yet, starting empty");
            return;
        }

        match read_entries(&path) {
            Ok(entries) => {
                self.entries = entries;
                self.enforce_bound();
                tracing::debug!(
                    path = %path.display(),
                    entries = self.entries.len(),
                    "Loaded memory"
                );
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to load memory, starting empty: {}", e);
            }
        }
    }

    /// Flush to the backing file; failures are logged and swallowed
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            tracing::error!("Failed to save memory: {}", e);
        }
    }

    /// Flush to the backing file, reporting failures
    pub fn try_save(&self) -> Result<(), EngineError> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let map: BTreeMap<&str, &MemoryEntry> =
            self.entries.iter().map(|e| (e.key.as_str(), e)).collect();

        let json = serde_json::to_string_pretty(&map)
            .map_err(|e| EngineError::Memory(format!("Failed to serialize memory: {}", e)))?;

        fs::write(path, json)?;
        Ok(())
    }

    /// Entries ordered newest first (timestamp, then insertion order)
    fn newest_first(&self) -> Vec<&MemoryEntry> {
        let mut indexed: Vec<(usize, &MemoryEntry)> = self.entries.iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| b.timestamp.cmp(&a.timestamp).then(ib.cmp(ia)));
        indexed.into_iter().map(|(_, e)| e).collect()
    }

    /// Evict oldest entries until the bound holds
    fn enforce_bound(&mut self) {
        while self.entries.len() > self.max_entries {
            // min_by_key keeps the first of equal minima, i.e. the earliest inserted
            let oldest = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| e.timestamp.as_str())
                .map(|(i, _)| i);

            match oldest {
                Some(index) => {
                    let evicted = self.entries.remove(index);
                    tracing::debug!(key = %evicted.key, "Evicted oldest memory entry");
                }
                None => break,
            }
        }
    }
}

/// Parse the on-disk map into entries ordered oldest first
fn read_entries(path: &Path) -> Result<Vec<MemoryEntry>, EngineError> {
    let contents = fs::read_to_string(path)?;
    let map: BTreeMap<String, MemoryEntry> = serde_json::from_str(&contents)
        .map_err(|e| EngineError::Memory(format!("Invalid memory file: {}", e)))?;

    // The object key is authoritative
    let mut entries: Vec<MemoryEntry> = map
        .into_iter()
        .map(|(key, entry)| MemoryEntry { key, ..entry })
        .collect();

    entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    Ok(entries)
}

fn now_timestamp() -> String {
    format_timestamp(&chrono::Utc::now())
}

/// Normalize to UTC so wall-clock shifts (DST) never reorder entries
fn format_timestamp<Tz: chrono::TimeZone>(at: &chrono::DateTime<Tz>) -> String {
    at.with_timezone(&chrono::Utc)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_store_is_empty() {
        let memory = MemoryStore::new(10);
        assert!(memory.is_empty());
        assert_eq!(memory.max_entries(), 10);
        assert!(memory.persist_path().is_none());
        assert_eq!(memory.render(5), "No relevant memory.");
    }

    #[test]
    fn test_add_and_get() {
        let mut memory = MemoryStore::new(10);
        memory.add("k", json!({"a": 1}), "tester");

        assert_eq!(memory.get("k"), Some(&json!({"a": 1})));
        assert_eq!(memory.entry("k").unwrap().source, "tester");
        assert_eq!(memory.get("missing"), None);
    }

    #[test]
    fn test_upsert_replaces_value() {
        let mut memory = MemoryStore::new(10);
        memory.add("k", json!("first"), "a");
        memory.add("k", json!("second"), "b");

        assert_eq!(memory.len(), 1);
        assert_eq!(memory.get("k"), Some(&json!("second")));
        assert_eq!(memory.entry("k").unwrap().source, "b");
    }

    #[test]
    fn test_eviction_removes_earliest_inserted() {
        let mut memory = MemoryStore::new(2);
        memory.add("a", json!(1), "s");
        memory.add("b", json!(2), "s");
        memory.add("c", json!(3), "s");

        assert_eq!(memory.len(), 2);
        assert!(memory.get("a").is_none());
        assert!(memory.get("b").is_some());
        assert!(memory.get("c").is_some());
    }

    #[test]
    fn test_upsert_counts_as_fresh_insertion() {
        let mut memory = MemoryStore::new(2);
        memory.add("a", json!(1), "s");
        memory.add("b", json!(2), "s");
        memory.add("a", json!(10), "s");
        memory.add("c", json!(3), "s");

        assert!(memory.get("b").is_none());
        assert_eq!(memory.get("a"), Some(&json!(10)));
    }

    #[test]
    fn test_search_is_case_insensitive_over_key_and_value() {
        let mut memory = MemoryStore::new(10);
        memory.add("tool_calculate_3", json!("Result: 8"), "Aristotle");
        memory.add("plato_insight_2", json!("The Forms are eternal"), "Plato");
        memory.add("count", json!(42), "system");

        let hits = memory.search("FORMS", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "plato_insight_2");

        let hits = memory.search("calculate", 10);
        assert_eq!(hits[0].key, "tool_calculate_3");

        let hits = memory.search("42", 10);
        assert_eq!(hits[0].key, "count");
    }

    #[test]
    fn test_search_string_values_match_without_quotes() {
        let mut memory = MemoryStore::new(10);
        memory.add("k", json!("abc"), "s");
        assert!(memory.search("\"abc\"", 10).is_empty());
        assert_eq!(memory.search("abc", 10).len(), 1);
    }

    #[test]
    fn test_search_newest_first_with_limit() {
        let mut memory = MemoryStore::new(10);
        memory.add("insight_1", json!("x"), "s");
        memory.add("insight_2", json!("x"), "s");
        memory.add("insight_3", json!("x"), "s");

        let hits = memory.search("insight", 2);
        let keys: Vec<&str> = hits.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["insight_3", "insight_2"]);
    }

    #[test]
    fn test_render_format() {
        let mut memory = MemoryStore::new(10);
        memory.add("initial_question", json!("What is virtue?"), "user");
        memory.add("n", json!(7), "system");

        assert_eq!(
            memory.render(5),
            "Recent relevant context:\n- n: 7 (from system)\n- initial_question: What is virtue? (from user)"
        );
        assert_eq!(
            memory.render(1),
            "Recent relevant context:\n- n: 7 (from system)"
        );
    }

    #[test]
    fn test_clear() {
        let mut memory = MemoryStore::new(10);
        memory.add("a", json!(1), "s");
        memory.clear();
        assert!(memory.is_empty());
    }

    #[test]
    fn test_snapshot() {
        let mut memory = MemoryStore::new(10);
        memory.add("a", json!(1), "s");
        memory.add("b", json!(2), "s");

        let snapshot = memory.snapshot();
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.entries[0].key, "b");
        assert!(snapshot.persist_path.is_none());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = now_timestamp();
        // 2024-01-01T12:00:00.000000Z
        assert_eq!(ts.len(), 27);
        assert_eq!(&ts[10..11], "T");
        assert_eq!(&ts[19..20], ".");
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn test_timestamps_sort_across_dst_fall_back() {
        use chrono::DateTime;

        // 01:50 EDT, then twenty minutes later the clock reads 01:10 EST
        let before = DateTime::parse_from_rfc3339("2024-11-03T01:50:00-04:00").unwrap();
        let after = DateTime::parse_from_rfc3339("2024-11-03T01:10:00-05:00").unwrap();

        let (before, after) = (format_timestamp(&before), format_timestamp(&after));
        assert_eq!(before, "2024-11-03T05:50:00.000000Z");
        assert_eq!(after, "2024-11-03T06:10:00.000000Z");
        assert!(before < after);
    }

    #[test]
    fn test_eviction_follows_utc_order() {
        let mut memory = MemoryStore::new(2);
        memory.entries.push(MemoryEntry {
            key: "older".to_string(),
            value: json!(1),
            timestamp: "2024-11-03T05:50:00.000000Z".to_string(),
            source: "s".to_string(),
        });
        memory.entries.push(MemoryEntry {
            key: "newer".to_string(),
            value: json!(2),
            timestamp: "2024-11-03T06:10:00.000000Z".to_string(),
            source: "s".to_string(),
        });
        memory.add("fresh", json!(3), "s");

        assert!(memory.get("older").is_none());
        assert!(memory.get("newer").is_some());
        assert!(memory.get("fresh").is_some());
    }

    #[test]
    fn test_file_entry_key_filled_from_object_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("memory.json");
        fs::write(
            &path,
            r#"{"legacy": {"value": "v", "timestamp": "2024-01-01T00:00:00.000000Z"},
                "renamed": {"key": "stale", "value": 1, "timestamp": "2024-01-02T00:00:00.000000Z", "source": "s"}}"#,
        )
        .unwrap();

        let memory = MemoryStore::open(&path, 10, false);
        assert_eq!(memory.entry("legacy").unwrap().key, "legacy");
        assert_eq!(memory.entry("legacy").unwrap().source, "");
        assert_eq!(memory.get("renamed"), Some(&json!(1)));
        assert!(memory.get("stale").is_none());
    }
}
