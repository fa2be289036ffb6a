//! Bounded statement history
//!
//! Every recognized statement, successful or not, is recorded newest-first.
//! The log drops its oldest entries once it reaches capacity.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One executed statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    /// Statement text, truncated
    pub query: String,
    /// Short outcome label: the statement kind on success, the error code otherwise
    pub result_label: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    /// Wall-clock duration in milliseconds
    pub execution_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_rows: Option<usize>,
}

/// Newest-first, capacity-bounded history log
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    next_id: u64,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            next_id: 1,
        }
    }

    /// Rebuild from persisted entries, keeping at most `capacity` of them.
    pub fn from_entries(entries: Vec<HistoryEntry>, capacity: usize) -> Self {
        let next_id = entries.iter().map(|e| e.id).max().map_or(1, |max| max + 1);
        let mut entries: VecDeque<HistoryEntry> = entries.into();
        entries.truncate(capacity);
        Self {
            entries,
            capacity,
            next_id,
        }
    }

    /// Prepend an entry, assigning its id. Returns the assigned id.
    pub fn record(&mut self, mut entry: HistoryEntry) -> u64 {
        entry.id = self.next_id;
        self.next_id += 1;
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        self.next_id - 1
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Serialise the entries as a JSON array, newest first
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries)
    }
}

/// Cut `query` to at most `max_chars` characters, on a character boundary.
pub fn truncate_query(query: &str, max_chars: usize) -> String {
    match query.char_indices().nth(max_chars) {
        Some((end, _)) => query[..end].to_string(),
        None => query.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(query: &str) -> HistoryEntry {
        HistoryEntry {
            id: 0,
            query: query.to_string(),
            result_label: "SELECT".to_string(),
            timestamp: Utc::now(),
            success: true,
            execution_time: 0.1,
            row_count: Some(1),
            affected_rows: None,
        }
    }

    #[test]
    fn test_newest_first_and_bounded() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.record(entry(&format!("q{}", i)));
        }
        let queries: Vec<&str> = history.entries().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["q4", "q3", "q2"]);
        let ids: Vec<u64> = history.entries().map(|e| e.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn test_from_entries_continues_ids() {
        let mut first = History::new(10);
        first.record(entry("a"));
        first.record(entry("b"));
        let restored: Vec<HistoryEntry> =
            serde_json::from_str(&first.to_json().unwrap()).unwrap();

        let mut history = History::from_entries(restored, 10);
        assert_eq!(history.len(), 2);
        assert_eq!(history.record(entry("c")), 3);
        assert_eq!(history.entries().next().unwrap().query, "c");
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_string(&entry("x")).unwrap();
        assert!(json.contains("\"resultLabel\""));
        assert!(json.contains("\"executionTime\""));
        assert!(json.contains("\"rowCount\""));
        assert!(!json.contains("affectedRows"));
    }

    #[test]
    fn test_truncate_query() {
        assert_eq!(truncate_query("SELECT 1", 200), "SELECT 1");
        assert_eq!(truncate_query("abcdef", 3), "abc");
        assert_eq!(truncate_query("ééé", 2), "éé");
    }
}
