//! Tag Index Module
//!
//! Reverse index from tag to the set of keys currently carrying that
//! tag, so bulk invalidation costs O(affected keys) instead of a full
//! cache scan.

use std::collections::{HashMap, HashSet};

// == Tag Index ==
/// Maps each tag to the keys tagged with it.
///
/// A reverse key-to-tags map is kept alongside so that overwriting a key
/// with a different tag set drops its old edges first; no orphan
/// tag-to-key edges survive a set/invalidate cycle.
#[derive(Debug, Default)]
pub struct TagIndex {
    /// tag -> keys carrying that tag
    by_tag: HashMap<String, HashSet<String>>,
    /// key -> tags it was last associated with
    by_key: HashMap<String, HashSet<String>>,
}

impl TagIndex {
    // == Constructor ==
    /// Creates a new empty tag index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Associate ==
    /// Adds `key` to each tag's set, dropping any previous associations
    /// the key had under other tags.
    pub fn associate(&mut self, key: &str, tags: &HashSet<String>) {
        self.remove(key);

        if tags.is_empty() {
            return;
        }

        for tag in tags {
            self.by_tag
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
        self.by_key.insert(key.to_string(), tags.clone());
    }

    // == Keys For Tags ==
    /// Returns the deduplicated union of keys across the given tags.
    ///
    /// Tags with no associated keys contribute nothing; asking for them
    /// is a successful no-op, not an error.
    pub fn keys_for_tags<S: AsRef<str>>(&self, tags: &[S]) -> HashSet<String> {
        let mut keys = HashSet::new();
        for tag in tags {
            if let Some(tagged) = self.by_tag.get(tag.as_ref()) {
                keys.extend(tagged.iter().cloned());
            }
        }
        keys
    }

    // == Remove ==
    /// Strips `key` from every tag set it belongs to.
    ///
    /// Called on every deletion path (expiry, explicit invalidate,
    /// pattern invalidate) so the index never drifts from the tiers.
    pub fn remove(&mut self, key: &str) {
        let Some(tags) = self.by_key.remove(key) else {
            return;
        };

        for tag in tags {
            if let Some(tagged) = self.by_tag.get_mut(&tag) {
                tagged.remove(key);
                if tagged.is_empty() {
                    self.by_tag.remove(&tag);
                }
            }
        }
    }

    // == Length ==
    /// Returns the number of keys currently indexed.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns true if no key is indexed.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn tag_set(tags: &[&str]) -> HashSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_associate_and_lookup() {
        let mut index = TagIndex::new();

        index.associate("e1", &tag_set(&["events"]));
        index.associate("e2", &tag_set(&["events", "content"]));
        index.associate("u1", &tag_set(&["other"]));

        let keys = index.keys_for_tags(&["events"]);
        assert_eq!(keys, tag_set(&["e1", "e2"]));
    }

    #[test]
    fn test_union_is_deduplicated() {
        let mut index = TagIndex::new();

        index.associate("e1", &tag_set(&["events", "content"]));
        index.associate("e2", &tag_set(&["content"]));

        let keys = index.keys_for_tags(&["events", "content"]);
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_unknown_tag_is_noop() {
        let index = TagIndex::new();
        assert!(index.keys_for_tags(&["missing"]).is_empty());
    }

    #[test]
    fn test_reassociate_drops_stale_edges() {
        let mut index = TagIndex::new();

        index.associate("k", &tag_set(&["old"]));
        index.associate("k", &tag_set(&["new"]));

        assert!(index.keys_for_tags(&["old"]).is_empty());
        assert_eq!(index.keys_for_tags(&["new"]), tag_set(&["k"]));
    }

    #[test]
    fn test_remove_strips_all_tags() {
        let mut index = TagIndex::new();

        index.associate("k", &tag_set(&["a", "b"]));
        index.remove("k");

        assert!(index.keys_for_tags(&["a", "b"]).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_unknown_key_is_noop() {
        let mut index = TagIndex::new();
        index.associate("k", &tag_set(&["a"]));

        index.remove("unknown");

        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_empty_tag_set_leaves_key_unindexed() {
        let mut index = TagIndex::new();
        index.associate("k", &HashSet::new());

        assert!(index.is_empty());
    }

    #[test]
    fn test_empty_tag_buckets_are_pruned() {
        let mut index = TagIndex::new();

        index.associate("k1", &tag_set(&["shared"]));
        index.associate("k2", &tag_set(&["shared"]));
        index.remove("k1");
        index.remove("k2");

        assert!(index.by_tag.is_empty());
    }
}
