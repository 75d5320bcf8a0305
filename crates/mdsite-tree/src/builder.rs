//! Tree construction from the source directory.
//!
//! Walks the source root, parsing `toc.yaml` hierarchy descriptions where
//! present and falling back to markdown auto-discovery where not. All
//! classification of raw entry strings (file vs folder vs repository)
//! happens here, once, producing typed [`DocumentNode`] variants.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::node::{DocumentNode, RepoSource};
use crate::slug::slugify;
use crate::toc::{TOC_FILENAME, TocEntry, parse_toc};

/// Fatal tree construction errors.
///
/// Everything below the root is recoverable: missing referenced paths and
/// malformed hierarchy files are skipped with a warning.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The source root directory does not exist.
    #[error("source root not found: {}", .0.display())]
    RootNotFound(PathBuf),
}

/// Build the document tree rooted at `root`.
///
/// Returns the root folder node with an empty alias. The tree is immutable
/// after construction.
///
/// # Errors
///
/// Returns [`TreeError::RootNotFound`] if `root` is not a directory. All
/// other problems degrade to warnings.
pub fn build_tree(root: &Path) -> Result<DocumentNode, TreeError> {
    if !root.is_dir() {
        return Err(TreeError::RootNotFound(root.to_path_buf()));
    }
    let children = build_directory(root, root);
    Ok(DocumentNode::folder("", "", false, children))
}

/// Build child nodes for one directory, preferring its `toc.yaml`.
fn build_directory(root: &Path, dir: &Path) -> Vec<DocumentNode> {
    let toc_path = dir.join(TOC_FILENAME);
    if toc_path.is_file() {
        match fs::read_to_string(&toc_path).map_err(|e| e.to_string()).and_then(|text| {
            parse_toc(&text).map_err(|e| e.to_string())
        }) {
            Ok(entries) => return build_entries(root, dir, &entries),
            Err(error) => {
                tracing::warn!(
                    path = %toc_path.display(),
                    %error,
                    "failed to parse hierarchy description, falling back to directory scan"
                );
            }
        }
    }
    scan_directory(root, dir)
}

/// Build nodes from parsed hierarchy entries.
fn build_entries(root: &Path, dir: &Path, entries: &[TocEntry]) -> Vec<DocumentNode> {
    let mut nodes = Vec::with_capacity(entries.len());
    let mut seen_aliases: HashSet<String> = HashSet::new();

    for entry in entries {
        let Some(node) = build_entry(root, dir, entry) else {
            continue;
        };
        if !node.alias.is_empty() && !seen_aliases.insert(node.alias.clone()) {
            tracing::warn!(
                alias = %node.alias,
                title = %entry.title,
                "alias collision: entry shadows an earlier sibling with the same alias"
            );
        }
        nodes.push(node);
    }

    nodes
}

/// Build a single node from one hierarchy entry.
///
/// Classification rules:
/// - absolute `http(s)` URL on a recognized host -> repository
/// - trailing slash -> folder
/// - anything else -> file (the ambiguous default)
fn build_entry(root: &Path, dir: &Path, entry: &TocEntry) -> Option<DocumentNode> {
    let alias = entry
        .target
        .alias()
        .map_or_else(|| slugify(&entry.title), str::to_owned);
    let section = entry.target.section();

    let Some(raw_path) = entry.target.path() else {
        // No path: only valid as an inline grouping with sub entries.
        let sub = entry.target.sub_entries();
        if sub.is_empty() {
            tracing::warn!(title = %entry.title, "skipping hierarchy entry with no target");
            return None;
        }
        let children = build_entries(root, dir, &sub);
        return Some(DocumentNode::folder(&entry.title, alias, section, children));
    };

    if raw_path.starts_with("http://") || raw_path.starts_with("https://") {
        return match parse_repo_url(raw_path) {
            Some(source) => Some(DocumentNode::repository(&entry.title, alias, source, section)),
            None => {
                tracing::warn!(
                    title = %entry.title,
                    url = raw_path,
                    "skipping repository entry with unrecognized host"
                );
                None
            }
        };
    }

    if let Some(folder_name) = raw_path.strip_suffix('/') {
        let folder_dir = dir.join(folder_name);
        if !folder_dir.is_dir() {
            tracing::warn!(
                title = %entry.title,
                path = %folder_dir.display(),
                "skipping missing folder"
            );
            return None;
        }
        let sub = entry.target.sub_entries();
        let children = if sub.is_empty() {
            build_directory(root, &folder_dir)
        } else {
            build_entries(root, &folder_dir, &sub)
        };
        return Some(DocumentNode::folder(&entry.title, alias, section, children));
    }

    // Default: file.
    let file_path = dir.join(raw_path);
    if !file_path.is_file() {
        tracing::warn!(
            title = %entry.title,
            path = %file_path.display(),
            "skipping missing file"
        );
        return None;
    }
    Some(DocumentNode::file(
        &entry.title,
        alias,
        source_key(root, &file_path),
    ))
}

/// Auto-discover markdown files and subdirectories in `dir`.
///
/// Used when a directory has no `toc.yaml`. Files are titled from their
/// filename; the readme family becomes "Overview". Subdirectories with no
/// markdown anywhere below them are dropped.
fn scan_directory(root: &Path, dir: &Path) -> Vec<DocumentNode> {
    let Ok(read) = fs::read_dir(dir) else {
        tracing::warn!(path = %dir.display(), "failed to read directory");
        return Vec::new();
    };

    let mut entries: Vec<_> = read.filter_map(Result::ok).collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);

    let mut nodes = Vec::new();
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();

        if path.is_dir() {
            let children = build_directory(root, &path);
            if children.is_empty() {
                continue;
            }
            let title = title_case(&name);
            nodes.push(DocumentNode::folder(
                title,
                name.to_lowercase(),
                false,
                children,
            ));
        } else if path.extension().is_some_and(|e| e == "md") {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let title = file_title(&stem);
            let alias = slugify(&title);
            nodes.push(DocumentNode::file(title, alias, source_key(root, &path)));
        }
    }

    nodes
}

/// Title for an auto-discovered file from its stem.
fn file_title(stem: &str) -> String {
    match stem.to_lowercase().as_str() {
        "readme" | "index" | "root" | "home" => "Overview".to_owned(),
        _ => title_case(stem),
    }
}

/// Title-case a raw filename segment: `setup-guide` -> `Setup Guide`.
fn title_case(raw: &str) -> String {
    raw.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Source key for a local file: path relative to the site root with
/// forward slashes and no leading `./`.
fn source_key(root: &Path, path: &Path) -> PathBuf {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    PathBuf::from(joined)
}

/// Parse a GitHub repository URL into a [`RepoSource`].
///
/// Recognized forms:
/// - `https://github.com/{owner}/{repo}`
/// - `https://github.com/{owner}/{repo}/tree/{branch}`
///
/// The branch defaults to `main` when not present in the URL.
#[must_use]
pub(crate) fn parse_repo_url(url: &str) -> Option<RepoSource> {
    let rest = url
        .strip_prefix("https://github.com/")
        .or_else(|| url.strip_prefix("http://github.com/"))?;
    let rest = rest.trim_end_matches('/');
    let mut parts = rest.split('/');

    let owner = parts.next().filter(|s| !s.is_empty())?;
    let name = parts.next().filter(|s| !s.is_empty())?;
    let name = name.strip_suffix(".git").unwrap_or(name);

    let branch = match (parts.next(), parts.next()) {
        (Some("tree"), Some(branch)) => branch.to_owned(),
        (None, _) => "main".to_owned(),
        _ => return None,
    };

    Some(RepoSource {
        owner: owner.to_owned(),
        name: name.to_owned(),
        branch,
        url: url.to_owned(),
    })
}
