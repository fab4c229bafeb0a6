//! Scanned-payload history.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered log of every distinct payload observed in a session.
///
/// Payloads are compared as raw strings, so `"SN001"` and `" sn001"` are two
/// separate entries.
///
/// # Examples
///
/// ```
/// use snaplocate_pipeline::ScanHistory;
///
/// let mut history = ScanHistory::new();
/// assert!(history.record("SN001"));
/// assert!(!history.record("SN001"));
/// assert!(history.record("sn001"));
/// assert_eq!(history.entries(), ["SN001", "sn001"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ScanHistory {
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl ScanHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `payload` unless already present.
    ///
    /// Returns `true` when the payload was new.
    pub fn record(&mut self, payload: &str) -> bool {
        if self.seen.contains(payload) {
            return false;
        }

        self.seen.insert(payload.to_string());
        self.entries.push(payload.to_string());
        true
    }

    /// Check whether `payload` was recorded.
    pub fn contains(&self, payload: &str) -> bool {
        self.seen.contains(payload)
    }

    /// Recorded payloads in first-seen order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of distinct payloads.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every payload.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen.clear();
    }
}

impl From<Vec<String>> for ScanHistory {
    fn from(payloads: Vec<String>) -> Self {
        let mut history = Self::new();
        for payload in &payloads {
            history.record(payload);
        }
        history
    }
}

impl From<ScanHistory> for Vec<String> {
    fn from(history: ScanHistory) -> Self {
        history.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deduplicates_exact_strings() {
        let mut history = ScanHistory::new();
        assert!(history.record("SN001"));
        assert!(history.record("SN002"));
        assert!(!history.record("SN001"));
        assert!(history.record(" SN001"));

        assert_eq!(history.len(), 3);
        assert_eq!(history.entries(), ["SN001", "SN002", " SN001"]);
    }

    #[test]
    fn test_contains() {
        let mut history = ScanHistory::new();
        history.record("abc");
        assert!(history.contains("abc"));
        assert!(!history.contains("ABC"));
    }

    #[test]
    fn test_clear() {
        let mut history = ScanHistory::new();
        history.record("abc");
        history.clear();

        assert!(history.is_empty());
        assert!(history.record("abc"));
    }

    #[test]
    fn test_empty_payload_recorded_once() {
        let mut history = ScanHistory::new();
        assert!(history.record(""));
        assert!(!history.record(""));
    }

    #[test]
    fn test_serializes_as_list() {
        let mut history = ScanHistory::new();
        history.record("b");
        history.record("a");

        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"["b","a"]"#);

        let back: ScanHistory = serde_json::from_str(r#"["b","a","b"]"#).unwrap();
        assert_eq!(back.entries(), ["b", "a"]);
    }
}
