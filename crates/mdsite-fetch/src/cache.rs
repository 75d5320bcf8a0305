//! On-disk manifest cache.
//!
//! Manifests are stored as JSON under
//! `{root}/manifests/{owner}/{repo}/{branch}.json` and considered fresh for
//! a fixed window keyed by file mtime. Cache errors are never fatal; a
//! failed read is a miss and a failed write is logged and ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::manifest::RepositoryManifest;

/// Default manifest freshness window.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// File-backed manifest cache keyed by `(owner, repo, branch)`.
pub struct ManifestCache {
    root: PathBuf,
    max_age: Duration,
}

impl ManifestCache {
    /// Create a cache rooted at `root` with the default freshness window.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            max_age: DEFAULT_MAX_AGE,
        }
    }

    /// Override the freshness window.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    fn manifest_path(&self, owner: &str, repo: &str, branch: &str) -> PathBuf {
        self.root
            .join("manifests")
            .join(owner)
            .join(repo)
            .join(format!("{branch}.json"))
    }

    /// Get a fresh cached manifest, if one exists.
    #[must_use]
    pub fn get(&self, owner: &str, repo: &str, branch: &str) -> Option<RepositoryManifest> {
        let path = self.manifest_path(owner, repo, branch);
        if !is_fresh(&path, self.max_age) {
            return None;
        }
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(manifest) => Some(manifest),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "discarding unreadable cached manifest");
                None
            }
        }
    }

    /// Store a manifest. Failures are logged, never propagated.
    pub fn set(&self, manifest: &RepositoryManifest) {
        let path = self.manifest_path(&manifest.owner, &manifest.repo_name, &manifest.branch);
        let Some(parent) = path.parent() else {
            return;
        };
        if let Err(error) = fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), %error, "failed to create manifest cache directory");
            return;
        }
        match serde_json::to_vec_pretty(manifest) {
            Ok(bytes) => {
                if let Err(error) = fs::write(&path, bytes) {
                    tracing::warn!(path = %path.display(), %error, "failed to write cached manifest");
                }
            }
            Err(error) => {
                tracing::warn!(%error, "failed to serialize manifest");
            }
        }
    }
}

/// Whether a cache file exists and is younger than `max_age`.
fn is_fresh(path: &Path, max_age: Duration) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    let Ok(mtime) = metadata.modified() else {
        return false;
    };
    SystemTime::now()
        .duration_since(mtime)
        .is_ok_and(|age| age <= max_age)
}
