//! Repository manifest types.
//!
//! A manifest is the complete fetcher output for one repository: which
//! files were mirrored and where they live on disk. The path index and the
//! link resolver depend on exactly this shape and nothing else from the
//! fetcher.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of mirrored file. Only markdown and images are mirrored; every
/// other blob type is ignored at fetch time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Markdown document.
    Markdown,
    /// Image asset.
    Image,
}

/// One mirrored file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path within the repository, forward slashes regardless of host OS.
    pub original_path: String,
    /// On-disk mirror location.
    pub local_path: PathBuf,
    /// File kind.
    pub kind: EntryKind,
}

/// Complete fetch result for one repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryManifest {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo_name: String,
    /// Mirrored branch.
    pub branch: String,
    /// Output directory name override; defaults to the repository name.
    pub alias: Option<String>,
    /// Mirrored files. `original_path` is unique within one manifest.
    pub entries: Vec<ManifestEntry>,
}

impl RepositoryManifest {
    /// Create an empty manifest (used when a fetch fails).
    #[must_use]
    pub fn empty(owner: &str, repo_name: &str, branch: &str, alias: Option<&str>) -> Self {
        Self {
            owner: owner.to_owned(),
            repo_name: repo_name.to_owned(),
            branch: branch.to_owned(),
            alias: alias.map(str::to_owned),
            entries: Vec::new(),
        }
    }

    /// The output directory name for this repository.
    #[must_use]
    pub fn alias_or_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.repo_name)
    }

    /// Canonical `owner/name` lookup key.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.owner, self.repo_name)
    }

    /// The repository's main file: the first README found at the repository
    /// root, else the first markdown entry.
    ///
    /// The main file receives the output name `index.html` regardless of
    /// its original name.
    #[must_use]
    pub fn main_file(&self) -> Option<&ManifestEntry> {
        self.entries
            .iter()
            .find(|e| {
                e.kind == EntryKind::Markdown
                    && !e.original_path.contains('/')
                    && e.original_path.to_lowercase().starts_with("readme")
            })
            .or_else(|| self.entries.iter().find(|e| e.kind == EntryKind::Markdown))
    }

    /// Canonical GitHub URL for a file or directory inside this repository.
    ///
    /// Paths with an extension get a `blob` URL, bare directory names a
    /// `tree` URL.
    #[must_use]
    pub fn origin_url(&self, repo_path: &str) -> String {
        let kind = if repo_path.rsplit('/').next().is_some_and(|n| n.contains('.')) {
            "blob"
        } else {
            "tree"
        };
        format!(
            "https://github.com/{}/{}/{kind}/{}/{}",
            self.owner,
            self.repo_name,
            self.branch,
            repo_path.trim_start_matches('/')
        )
    }
}

/// Classify a repository blob path, returning `None` for blob types that
/// are not mirrored.
#[must_use]
pub fn classify_blob(path: &str) -> Option<EntryKind> {
    let ext = path.rsplit('.').next()?.to_lowercase();
    match ext.as_str() {
        "md" | "markdown" => Some(EntryKind::Markdown),
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "bmp" => Some(EntryKind::Image),
        _ => None,
    }
}
