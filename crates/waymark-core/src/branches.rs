//! Literal branch storage for trie nodes.
//!
//! Most nodes have only a handful of literal children, where a linear scan
//! over a small vector beats hashing. Nodes with a wide fan-out are promoted
//! to a hash map once they grow past [`LIST_THRESHOLD`] entries and never
//! go back.

use std::collections::HashMap;

/// Maximum number of entries kept in the linear list representation.
pub const LIST_THRESHOLD: usize = 11;

/// A small string-keyed map with a size-dependent representation.
#[derive(Debug, Clone)]
pub enum Branches<V> {
    /// Linear list of `(key, value)` pairs.
    List(Vec<(Box<str>, V)>),
    /// Hash map, used once the list outgrows [`LIST_THRESHOLD`].
    Map(HashMap<Box<str>, V>),
}

impl<V> Branches<V> {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Branches::List(Vec::new())
    }

    /// Look up the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        match self {
            Branches::List(list) => list.iter().find(|(k, _)| &**k == key).map(|(_, v)| v),
            Branches::Map(map) => map.get(key),
        }
    }

    /// Look up the value for `key` mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        match self {
            Branches::List(list) => list
                .iter_mut()
                .find(|(k, _)| &**k == key)
                .map(|(_, v)| v),
            Branches::Map(map) => map.get_mut(key),
        }
    }

    /// Insert a value, replacing any previous value for the same key.
    ///
    /// Promotes the list to a map when it grows past the threshold.
    pub fn insert(&mut self, key: impl Into<Box<str>>, value: V) -> Option<V> {
        let key = key.into();
        match self {
            Branches::List(list) => {
                if let Some((_, slot)) = list.iter_mut().find(|(k, _)| **k == *key) {
                    return Some(std::mem::replace(slot, value));
                }
                list.push((key, value));
                if list.len() > LIST_THRESHOLD {
                    self.promote();
                }
                None
            }
            Branches::Map(map) => map.insert(key, value),
        }
    }

    /// Get the value for `key`, inserting one built by `default` if absent.
    pub fn get_or_insert_with(&mut self, key: &str, default: impl FnOnce() -> V) -> &mut V {
        if let Branches::List(list) = self {
            if list.len() >= LIST_THRESHOLD && !list.iter().any(|(k, _)| &**k == key) {
                self.promote();
            }
        }
        match self {
            Branches::List(list) => {
                let index = match list.iter().position(|(k, _)| &**k == key) {
                    Some(index) => index,
                    None => {
                        list.push((key.into(), default()));
                        list.len() - 1
                    }
                };
                &mut list[index].1
            }
            Branches::Map(map) => map.entry(key.into()).or_insert_with(default),
        }
    }

    fn promote(&mut self) {
        if let Branches::List(list) = self {
            let map = std::mem::take(list).into_iter().collect();
            *self = Branches::Map(map);
        }
    }

    /// All keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        let (list, map) = match self {
            Branches::List(list) => (Some(list.iter().map(|(k, _)| &**k)), None),
            Branches::Map(map) => (None, Some(map.keys().map(|k| &**k))),
        };
        list.into_iter().flatten().chain(map.into_iter().flatten())
    }

    /// All values, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        let (list, map) = match self {
            Branches::List(list) => (Some(list.iter().map(|(_, v)| v)), None),
            Branches::Map(map) => (None, Some(map.values())),
        };
        list.into_iter().flatten().chain(map.into_iter().flatten())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Branches::List(list) => list.len(),
            Branches::Map(map) => map.len(),
        }
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once the collection has been promoted to a hash map.
    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Branches::Map(_))
    }
}

impl<V> Default for Branches<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_list_get_insert() {
        let mut branches = Branches::new();
        assert!(branches.is_empty());

        assert_eq!(branches.insert("a", 1), None);
        assert_eq!(branches.insert("b", 2), None);
        assert_eq!(branches.get("a"), Some(&1));
        assert_eq!(branches.get("c"), None);
        assert_eq!(branches.len(), 2);
        assert!(!branches.is_map());

        // Replacing keeps the size
        assert_eq!(branches.insert("a", 10), Some(1));
        assert_eq!(branches.get("a"), Some(&10));
        assert_eq!(branches.len(), 2);
    }

    #[test]
    fn test_promotion_to_map() {
        let mut branches = Branches::new();
        for i in 0..LIST_THRESHOLD {
            branches.insert(format!("k{}", i), i);
        }
        assert!(!branches.is_map());

        branches.insert("overflow", 99);
        assert!(branches.is_map());
        assert_eq!(branches.len(), LIST_THRESHOLD + 1);

        for i in 0..LIST_THRESHOLD {
            assert_eq!(branches.get(&format!("k{}", i)), Some(&i));
        }
        assert_eq!(branches.get("overflow"), Some(&99));
    }

    #[test]
    fn test_get_or_insert_with() {
        let mut branches: Branches<Vec<u32>> = Branches::new();
        branches.get_or_insert_with("x", Vec::new).push(1);
        branches.get_or_insert_with("x", Vec::new).push(2);
        assert_eq!(branches.get("x"), Some(&vec![1, 2]));

        // Insertion that triggers promotion still hands back the new slot
        for i in 0..LIST_THRESHOLD {
            branches.get_or_insert_with(&format!("k{}", i), Vec::new);
        }
        assert!(branches.is_map());
        branches.get_or_insert_with("k3", Vec::new).push(3);
        assert_eq!(branches.get("k3"), Some(&vec![3]));
    }

    #[test]
    fn test_get_mut() {
        let mut branches = Branches::new();
        branches.insert("a", 1);
        if let Some(v) = branches.get_mut("a") {
            *v += 1;
        }
        assert_eq!(branches.get("a"), Some(&2));
        assert!(branches.get_mut("missing").is_none());
    }

    #[test]
    fn test_keys_both_representations() {
        let mut branches = Branches::new();
        branches.insert("a", ());
        branches.insert("b", ());
        let keys: HashSet<&str> = branches.keys().collect();
        assert_eq!(keys, HashSet::from(["a", "b"]));

        for i in 0..20 {
            branches.insert(format!("n{}", i), ());
        }
        assert!(branches.is_map());
        assert_eq!(branches.keys().count(), 22);
        assert_eq!(branches.values().count(), 22);
    }
}
