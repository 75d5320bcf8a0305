//! Per-directory hierarchy description (`toc.yaml`) parsing.
//!
//! The file is a YAML list where each entry is a single-key mapping from a
//! display title to either a bare string (file, folder with trailing slash,
//! or repository URL) or a detailed object:
//!
//! ```yaml
//! - Overview: index.md
//! - Getting Started: guide/
//! - Widgets: https://github.com/acme/widgets
//! - API:
//!     path: api/
//!     alias: api-reference
//!     section: true
//! ```
//!
//! Entries with an unrecognized shape are skipped with a warning, never
//! fatal. Shape classification into file/folder/repository happens in the
//! tree builder, not here.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Hierarchy description filename searched in every source directory.
pub const TOC_FILENAME: &str = "toc.yaml";

/// Detailed entry target with optional metadata.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TocDetails {
    /// Target path, folder (trailing slash), or repository URL.
    pub path: Option<String>,
    /// Explicit alias override; derived from the title when absent.
    pub alias: Option<String>,
    /// Optional description (carried for templating, not used structurally).
    pub description: Option<String>,
    /// Group children without an own path segment when nested in a section.
    #[serde(default)]
    pub section: bool,
    /// Inline child entries, overriding directory scanning.
    #[serde(default)]
    pub sub: Vec<RawEntry>,
}

/// Entry target: bare string or detailed object.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TocTarget {
    /// Bare string target.
    Plain(String),
    /// Object target with metadata.
    Detailed(TocDetails),
}

impl TocTarget {
    /// The raw target path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Plain(s) => Some(s),
            Self::Detailed(d) => d.path.as_deref(),
        }
    }

    /// Explicit alias override, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Detailed(d) => d.alias.as_deref(),
        }
    }

    /// Section flag (always false for bare strings).
    #[must_use]
    pub fn section(&self) -> bool {
        match self {
            Self::Plain(_) => false,
            Self::Detailed(d) => d.section,
        }
    }

    /// Flattened inline child entries.
    #[must_use]
    pub fn sub_entries(&self) -> Vec<TocEntry> {
        match self {
            Self::Plain(_) => Vec::new(),
            Self::Detailed(d) => d.sub.iter().cloned().filter_map(flatten_entry).collect(),
        }
    }
}

/// Raw single-key mapping as it appears in YAML.
pub type RawEntry = BTreeMap<String, TocTarget>;

/// A flattened hierarchy entry: title plus target.
#[derive(Clone, Debug, PartialEq)]
pub struct TocEntry {
    /// Display title (the mapping key).
    pub title: String,
    /// Entry target.
    pub target: TocTarget,
}

/// Parse a `toc.yaml` document into flattened entries.
///
/// Entries that are not single-key mappings are skipped with a warning.
///
/// # Errors
///
/// Returns the underlying YAML error when the document itself does not
/// parse as a list of mappings. Callers treat this as a recoverable
/// per-directory failure.
pub fn parse_toc(text: &str) -> Result<Vec<TocEntry>, serde_yaml::Error> {
    let raw: Vec<RawEntry> = serde_yaml::from_str(text)?;
    Ok(raw.into_iter().filter_map(flatten_entry).collect())
}

/// Convert a raw mapping to a [`TocEntry`], skipping unrecognized shapes.
fn flatten_entry(mut raw: RawEntry) -> Option<TocEntry> {
    if raw.len() != 1 {
        tracing::warn!(
            keys = raw.len(),
            "skipping hierarchy entry that is not a single title-keyed mapping"
        );
        return None;
    }
    let (title, target) = raw.pop_first()?;
    Some(TocEntry { title, target })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_plain_entries() {
        let entries = parse_toc(
            "- Overview: index.md\n\
             - Guide: guide/\n\
             - Widgets: https://github.com/acme/widgets\n",
        )
        .unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].title, "Overview");
        assert_eq!(entries[0].target, TocTarget::Plain("index.md".to_owned()));
        assert_eq!(entries[1].target.path(), Some("guide/"));
        assert_eq!(
            entries[2].target.path(),
            Some("https://github.com/acme/widgets")
        );
    }

    #[test]
    fn test_parse_detailed_entry() {
        let entries = parse_toc(
            "- API:\n\
            \x20   path: api/\n\
            \x20   alias: api-reference\n\
            \x20   section: true\n",
        )
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "API");
        assert_eq!(entries[0].target.path(), Some("api/"));
        assert_eq!(entries[0].target.alias(), Some("api-reference"));
        assert!(entries[0].target.section());
    }

    #[test]
    fn test_parse_inline_sub_entries() {
        let entries = parse_toc(
            "- Section:\n\
            \x20   path: section/\n\
            \x20   sub:\n\
            \x20     - First: first.md\n\
            \x20     - Second: second.md\n",
        )
        .unwrap();

        let sub = entries[0].target.sub_entries();
        assert_eq!(sub.len(), 2);
        assert_eq!(sub[0].title, "First");
        assert_eq!(sub[1].target.path(), Some("second.md"));
    }

    #[test]
    fn test_multi_key_entry_skipped() {
        let entries = parse_toc("- A: a.md\n- {B: b.md, C: c.md}\n- D: d.md\n").unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "A");
        assert_eq!(entries[1].title, "D");
    }

    #[test]
    fn test_invalid_document_is_error() {
        assert!(parse_toc("not: a\nlist: here\n").is_err());
    }
}
