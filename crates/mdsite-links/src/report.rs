//! Link resolution diagnostics.
//!
//! Every document-link resolution attempt is recorded here; the build
//! summary reports unresolved targets grouped by URL so a broken link
//! referenced from many pages shows up once.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// What kind of target a link was classified as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkClass {
    /// Document inside the site, resolved through the path index.
    Internal,
    /// External scheme, left as written.
    External,
    /// Image asset, resolved through the asset store.
    Asset,
    /// Fragment-only target within the same document.
    AnchorOnly,
}

/// Outcome of resolving one link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The target mapped to a registered output path.
    Resolved(String),
    /// No registered document matched; the fallback transform was emitted.
    Unresolved,
}

/// One resolution attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRecord {
    /// Target exactly as written in the source, fragment included.
    pub raw_target: String,
    /// Source key of the document containing the link.
    pub source_document: String,
    /// Target classification.
    pub classification: LinkClass,
    /// Resolution outcome.
    pub resolution: Resolution,
}

/// One line of the diagnostics report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Link target as written.
    pub url: String,
    /// Documents that reference this target, sorted and deduplicated.
    pub source_documents: Vec<String>,
    /// Whether the target resolved.
    pub resolved: bool,
}

/// Thread-safe collector of link records.
///
/// Shared by every rewriting worker; recording is append-only so order
/// between workers does not affect the grouped report.
#[derive(Debug, Default)]
pub struct LinkReport {
    records: Mutex<Vec<LinkRecord>>,
}

impl LinkReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one resolution attempt.
    pub fn record(&self, record: LinkRecord) {
        self.lock().push(record);
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<LinkRecord> {
        self.lock().clone()
    }

    /// Number of resolved and unresolved records.
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        let records = self.lock();
        let unresolved = records
            .iter()
            .filter(|r| r.resolution == Resolution::Unresolved)
            .count();
        (records.len() - unresolved, unresolved)
    }

    /// Diagnostics grouped by target URL, unresolved targets only.
    #[must_use]
    pub fn unresolved(&self) -> Vec<Diagnostic> {
        let records = self.lock();
        let mut by_url: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for record in records.iter() {
            if record.resolution == Resolution::Unresolved {
                by_url
                    .entry(record.raw_target.clone())
                    .or_default()
                    .push(record.source_document.clone());
            }
        }

        by_url
            .into_iter()
            .map(|(url, mut sources)| {
                sources.sort();
                sources.dedup();
                Diagnostic {
                    url,
                    source_documents: sources,
                    resolved: false,
                }
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LinkRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(target: &str, source: &str, resolution: Resolution) -> LinkRecord {
        LinkRecord {
            raw_target: target.to_owned(),
            source_document: source.to_owned(),
            classification: LinkClass::Internal,
            resolution,
        }
    }

    #[test]
    fn test_counts() {
        let report = LinkReport::new();
        report.record(record("a.md", "x.md", Resolution::Resolved("a.html".to_owned())));
        report.record(record("b.md", "x.md", Resolution::Unresolved));
        report.record(record("b.md", "y.md", Resolution::Unresolved));

        assert_eq!(report.counts(), (1, 2));
    }

    #[test]
    fn test_unresolved_grouped_and_deduplicated() {
        let report = LinkReport::new();
        report.record(record("gone.md", "b.md", Resolution::Unresolved));
        report.record(record("gone.md", "a.md", Resolution::Unresolved));
        report.record(record("gone.md", "a.md", Resolution::Unresolved));
        report.record(record("ok.md", "a.md", Resolution::Resolved("ok.html".to_owned())));

        let diagnostics = report.unresolved();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].url, "gone.md");
        assert_eq!(diagnostics[0].source_documents, vec!["a.md", "b.md"]);
        assert!(!diagnostics[0].resolved);
    }
}
