//! Global source-to-output path registry.
//!
//! # Architecture
//!
//! The index is built in two phases separated by a type-level barrier:
//! [`PathIndexBuilder`] accepts registrations, [`PathIndexBuilder::freeze`]
//! produces the read-only [`PathIndex`] handed to the resolvers. Nothing can
//! resolve against a builder and nothing can register into a frozen index,
//! so "index everything before resolving anything" holds by construction.

use std::collections::HashMap;

use crate::output_name::output_name;

/// One registered document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathIndexEntry {
    /// Normalized source key: forward slashes, no leading `./`.
    pub source_key: String,
    /// Site-relative output path.
    pub output_path: String,
    /// Lowercased source key, precomputed for case-insensitive matching.
    case_normalized: String,
}

/// Mutable registration phase of the index.
#[derive(Debug, Default)]
pub struct PathIndexBuilder {
    entries: Vec<PathIndexEntry>,
    by_key: HashMap<String, usize>,
}

impl PathIndexBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under its source key with an explicit output
    /// path.
    ///
    /// Keys are normalized (backslashes to forward slashes, leading `./`
    /// stripped) so that every producer registers the same document under
    /// the same key. Registering a key twice replaces the earlier entry and
    /// logs a warning.
    pub fn register(&mut self, source_key: &str, output_path: impl Into<String>) {
        let key = normalize_key(source_key);
        let entry = PathIndexEntry {
            case_normalized: key.to_lowercase(),
            source_key: key.clone(),
            output_path: output_path.into(),
        };

        if let Some(&slot) = self.by_key.get(&key) {
            tracing::warn!(key = %key, "source key registered twice; last registration wins");
            self.entries[slot] = entry;
        } else {
            self.by_key.insert(key, self.entries.len());
            self.entries.push(entry);
        }
    }

    /// Register a markdown document, deriving its output path from the key
    /// via [`output_name`].
    pub fn register_document(&mut self, source_key: &str) {
        let key = normalize_key(source_key);
        let output = output_name(&key);
        self.register(&key, output);
    }

    /// Finish registration. After this point the index is immutable.
    #[must_use]
    pub fn freeze(self) -> PathIndex {
        tracing::debug!(documents = self.entries.len(), "path index frozen");
        PathIndex {
            entries: self.entries,
            by_key: self.by_key,
        }
    }
}

/// Immutable, fully-populated index.
#[derive(Debug)]
pub struct PathIndex {
    entries: Vec<PathIndexEntry>,
    by_key: HashMap<String, usize>,
}

impl PathIndex {
    /// Number of registered documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a document by exact source key.
    #[must_use]
    pub fn get(&self, source_key: &str) -> Option<&PathIndexEntry> {
        let key = normalize_key(source_key);
        self.by_key.get(&key).map(|&slot| &self.entries[slot])
    }

    /// Resolve a link target to a registered document.
    ///
    /// First an exact match on the normalized key, then a case-insensitive
    /// suffix match: the target's path segments are compared right to left
    /// against each entry's segments, and an entry matches when every
    /// compared pair agrees up to the shorter of the two. Among several
    /// suffix matches the first in registration order wins.
    #[must_use]
    pub fn resolve(&self, target: &str) -> Option<&PathIndexEntry> {
        let key = normalize_key(target);
        if let Some(entry) = self.get(&key) {
            return Some(entry);
        }

        let needle = key.to_lowercase();
        let needle_segments: Vec<&str> = needle.split('/').collect();
        self.entries
            .iter()
            .find(|entry| suffix_matches(&needle_segments, &entry.case_normalized))
    }
}

/// Normalize a source key or link target for index comparison.
fn normalize_key(raw: &str) -> String {
    let mut key = raw.replace('\\', "/");
    while let Some(stripped) = key.strip_prefix("./") {
        key = stripped.to_owned();
    }
    key.trim_start_matches('/').to_owned()
}

/// Right-to-left segment comparison up to the shorter path.
fn suffix_matches(needle_segments: &[&str], candidate: &str) -> bool {
    let candidate_segments: Vec<&str> = candidate.split('/').collect();
    needle_segments
        .iter()
        .rev()
        .zip(candidate_segments.iter().rev())
        .all(|(a, b)| a == b)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn index(keys: &[&str]) -> PathIndex {
        let mut builder = PathIndexBuilder::new();
        for key in keys {
            builder.register_document(key);
        }
        builder.freeze()
    }

    #[test]
    fn test_register_then_resolve_round_trip() {
        let idx = index(&["guide/setup.md", "guide/advanced/tuning.md", "README.md"]);
        for key in ["guide/setup.md", "guide/advanced/tuning.md", "README.md"] {
            let entry = idx.resolve(key).unwrap();
            assert_eq!(entry.source_key, key);
            assert_eq!(entry.output_path, output_name(key));
        }
    }

    #[test]
    fn test_key_normalization_unifies_producers() {
        let mut builder = PathIndexBuilder::new();
        builder.register_document("./guide/setup.md");
        let idx = builder.freeze();

        assert!(idx.get("guide/setup.md").is_some());
        assert!(idx.resolve("guide\\setup.md").is_some());
    }

    #[test]
    fn test_duplicate_key_last_registration_wins() {
        let mut builder = PathIndexBuilder::new();
        builder.register("page.md", "first/page.html");
        builder.register("page.md", "second/page.html");
        let idx = builder.freeze();

        assert_eq!(idx.len(), 1);
        assert_eq!(idx.get("page.md").unwrap().output_path, "second/page.html");
    }

    #[test]
    fn test_suffix_match_is_case_insensitive() {
        let idx = index(&["docs/Setup.md"]);
        let entry = idx.resolve("setup.md").unwrap();
        assert_eq!(entry.source_key, "docs/Setup.md");
    }

    #[test]
    fn test_suffix_match_compares_whole_segments() {
        let idx = index(&["docs/mysetup.md"]);
        // "setup.md" must not match the longer segment "mysetup.md".
        assert!(idx.resolve("setup.md").is_none());
    }

    #[test]
    fn test_suffix_match_longer_needle_than_entry() {
        let idx = index(&["guide/start.md"]);
        // Extra leading segments on the needle are ignored beyond the
        // entry's own length.
        let entry = idx.resolve("some/other/guide/start.md").unwrap();
        assert_eq!(entry.source_key, "guide/start.md");
    }

    #[test]
    fn test_ambiguous_suffix_first_registration_wins() {
        // Registration order is the tie-breaker, pinned here so a change
        // shows up as a test failure rather than silent output churn.
        let idx = index(&["alpha/notes.md", "beta/notes.md"]);
        let entry = idx.resolve("notes.md").unwrap();
        assert_eq!(entry.source_key, "alpha/notes.md");
    }

    #[test]
    fn test_exact_match_beats_suffix_match() {
        let idx = index(&["other/deep/page.md", "page.md"]);
        let entry = idx.resolve("page.md").unwrap();
        assert_eq!(entry.source_key, "page.md");
    }

    #[test]
    fn test_unresolvable_target() {
        let idx = index(&["guide/setup.md"]);
        assert!(idx.resolve("missing.md").is_none());
    }
}
