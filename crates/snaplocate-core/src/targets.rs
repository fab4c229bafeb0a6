//! The mutable set of serial numbers being searched for.

use crate::constants::TARGET_INPUT_SEPARATOR;
use crate::normalize_payload;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared, ordered list of target serial numbers.
///
/// Entries are stored as entered; comparison against payloads happens on
/// the normalized form, computed at lookup time. The handle is cheap to
/// clone and every clone sees the same list, so the hosting application can
/// keep editing it while a pipeline reads from it. A mutation is visible to
/// the very next lookup.
///
/// # Examples
///
/// ```
/// use snaplocate_core::TargetSet;
///
/// let targets = TargetSet::new();
/// let pipeline_view = targets.clone();
///
/// targets.add("SN001");
/// assert!(pipeline_view.contains_normalized("sn001"));
///
/// targets.clear();
/// assert!(!pipeline_view.contains_normalized("sn001"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    entries: Arc<RwLock<Vec<String>>>,
}

impl TargetSet {
    /// Create an empty target set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a target set pre-populated with entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: Arc::new(RwLock::new(entries.into_iter().map(Into::into).collect())),
        }
    }

    // A panicked writer leaves a plain Vec<String> behind, which is still
    // a usable list.
    fn read(&self) -> RwLockReadGuard<'_, Vec<String>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<String>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a serial number.
    pub fn add(&self, serial: impl Into<String>) {
        self.write().push(serial.into());
    }

    /// Append serial numbers typed as one comma-separated string.
    ///
    /// Each fragment is trimmed; empty fragments are skipped. Returns the
    /// number of entries appended.
    ///
    /// # Examples
    ///
    /// ```
    /// use snaplocate_core::TargetSet;
    ///
    /// let targets = TargetSet::new();
    /// assert_eq!(targets.submit(" SN001, sn002 ,, SN003"), 3);
    /// assert_eq!(targets.snapshot(), vec!["SN001", "sn002", "SN003"]);
    /// ```
    pub fn submit(&self, input: &str) -> usize {
        let fresh: Vec<String> = input
            .split(TARGET_INPUT_SEPARATOR)
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(String::from)
            .collect();

        let count = fresh.len();
        self.write().extend(fresh);
        count
    }

    /// Remove every entry equal to `serial` after normalization.
    ///
    /// Returns the number of entries removed.
    pub fn remove(&self, serial: &str) -> usize {
        let needle = normalize_payload(serial);
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|entry| normalize_payload(entry) != needle);
        before - entries.len()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of the current entries, in insertion order, as entered.
    pub fn snapshot(&self) -> Vec<String> {
        self.read().clone()
    }

    /// Check whether an already-normalized payload matches any entry.
    ///
    /// Every entry is normalized at call time, so edits made since the last
    /// call are always honoured.
    pub fn contains_normalized(&self, normalized: &str) -> bool {
        self.read()
            .iter()
            .any(|entry| normalize_payload(entry) == normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_is_empty() {
        let targets = TargetSet::new();
        assert!(targets.is_empty());
        assert_eq!(targets.len(), 0);
    }

    #[test]
    fn test_add_keeps_entry_as_entered() {
        let targets = TargetSet::new();
        targets.add("  SN001 ");
        assert_eq!(targets.snapshot(), vec!["  SN001 "]);
        assert!(targets.contains_normalized("sn001"));
    }

    #[test]
    fn test_clones_share_entries() {
        let targets = TargetSet::new();
        let view = targets.clone();

        targets.add("xyz");
        assert!(view.contains_normalized("xyz"));

        view.remove("XYZ");
        assert!(targets.is_empty());
    }

    #[rstest]
    #[case("SN001", 1)]
    #[case("SN001,SN002", 2)]
    #[case(" a , b , c ", 3)]
    #[case(",,", 0)]
    #[case("", 0)]
    fn test_submit_counts(#[case] input: &str, #[case] expected: usize) {
        let targets = TargetSet::new();
        assert_eq!(targets.submit(input), expected);
        assert_eq!(targets.len(), expected);
    }

    #[test]
    fn test_submit_appends_in_order() {
        let targets = TargetSet::from_entries(["first"]);
        targets.submit("second, third");
        assert_eq!(targets.snapshot(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_remove_is_normalized() {
        let targets = TargetSet::from_entries(["SN001", " sn001", "SN002"]);
        assert_eq!(targets.remove("Sn001 "), 2);
        assert_eq!(targets.snapshot(), vec!["SN002"]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let targets = TargetSet::from_entries(["SN001"]);
        assert_eq!(targets.remove("SN999"), 0);
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn test_clear() {
        let targets = TargetSet::from_entries(["a", "b"]);
        targets.clear();
        assert!(targets.is_empty());
    }

    #[test]
    fn test_contains_normalized_is_exact() {
        let targets = TargetSet::from_entries(["abc123"]);
        assert!(targets.contains_normalized("abc123"));
        assert!(!targets.contains_normalized("abc1234"));
        assert!(!targets.contains_normalized("abc12"));
    }

    #[test]
    fn test_concurrent_writers() {
        let targets = TargetSet::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let targets = targets.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        targets.add(format!("SN{i}-{j}"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(targets.len(), 100);
        assert!(targets.contains_normalized("sn3-24"));
    }
}
