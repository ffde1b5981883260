//! Case-preserving map with dual-sensitivity lookup
//!
//! Stores entries under their ASCII-lowercased key while retaining the
//! original spelling, so one table answers both case-sensitive and
//! case-insensitive queries. Used for union discriminators.

use rustc_hash::FxHashMap;

pub(crate) struct MultiCaseMap<V> {
    entries: FxHashMap<String, (String, V)>,
}

impl<V> MultiCaseMap<V> {
    pub(crate) fn new() -> Self {
        MultiCaseMap { entries: FxHashMap::default() }
    }

    /// Insert an entry. Returns false when the key collides with an existing
    /// entry up to case (the entry is not replaced).
    pub(crate) fn insert(&mut self, key: &str, value: V) -> bool {
        let canonical = key.to_ascii_lowercase();
        if self.entries.contains_key(&canonical) {
            return false;
        }
        self.entries.insert(canonical, (key.to_owned(), value));
        true
    }

    pub(crate) fn get(&self, key: &str, ignore_case: bool) -> Option<&V> {
        let (original, value) = self.entries.get(&key.to_ascii_lowercase())?;
        if ignore_case || original == key {
            Some(value)
        } else {
            None
        }
    }

    /// Original spellings of all keys.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(original, _)| original.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_respects_sensitivity() {
        let mut map = MultiCaseMap::new();
        assert!(map.insert("Sword", 1));
        assert_eq!(map.get("sword", true), Some(&1));
        assert_eq!(map.get("sword", false), None);
        assert_eq!(map.get("Sword", false), Some(&1));
    }

    #[test]
    fn test_insert_rejects_case_collisions() {
        let mut map = MultiCaseMap::new();
        assert!(map.insert("Bow", 1));
        assert!(!map.insert("bow", 2));
        assert_eq!(map.get("Bow", false), Some(&1));
        assert_eq!(map.len(), 1);
    }
}
