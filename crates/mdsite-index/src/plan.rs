//! Indexing pass: tree and manifests into a frozen [`PathIndex`].
//!
//! # Architecture
//!
//! [`plan_site`] is the single entry point. It walks the document tree
//! depth-first, registers every markdown document and image it finds
//! (local files and repository manifest entries alike), and returns the
//! frozen index together with one [`DocumentPlan`] per document to render.
//! Because the only way to obtain a [`PathIndex`] is through this function,
//! every manifest is complete before the first lookup can happen.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use mdsite_fetch::{EntryKind, RepositoryManifest, classify_blob};
use mdsite_tree::{DocumentNode, NodeKind};

use crate::assets::AssetStore;
use crate::output_name::output_name;
use crate::path_index::{PathIndex, PathIndexBuilder};

/// Where a planned document came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentOrigin {
    /// Local file under the site root.
    Local,
    /// Mirrored repository file; the key addresses the manifest map.
    Repository {
        /// `owner/name` manifest key.
        manifest_key: String,
    },
}

/// One document scheduled for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentPlan {
    /// Display title from the hierarchy, when the hierarchy provides one.
    pub title: Option<String>,
    /// Where to read the markdown from.
    pub disk_path: PathBuf,
    /// The key this document is registered under in the index.
    pub source_key: String,
    /// Site-relative output path.
    pub output_path: String,
    /// Provenance, used for origin-link rewriting.
    pub origin: DocumentOrigin,
}

/// Walk the tree and manifests, registering every document and asset.
///
/// Returns the frozen index and the render plan. Repository nodes with no
/// manifest in `manifests` are skipped with a warning; their subtree
/// contributes nothing.
#[must_use]
pub fn plan_site(
    tree: &DocumentNode,
    root: &Path,
    manifests: &HashMap<String, RepositoryManifest>,
    assets: &AssetStore,
) -> (PathIndex, Vec<DocumentPlan>) {
    let mut builder = PathIndexBuilder::new();
    let mut plans = Vec::new();

    tree.walk(&mut |node, prefix, inside_section| match &node.kind {
        NodeKind::File { source } => {
            plan_local_file(node, source, prefix, root, &mut builder, &mut plans);
        }
        NodeKind::Repository { source, .. } => {
            let Some(manifest) = manifests.get(&source.key()) else {
                tracing::warn!(repo = %source.key(), "no manifest for repository; skipping");
                return;
            };
            plan_repository(
                node,
                manifest,
                prefix,
                inside_section,
                &mut builder,
                &mut plans,
                assets,
            );
        }
        NodeKind::Folder { .. } => {}
    });

    register_local_images(root, root, assets);

    (builder.freeze(), plans)
}

fn plan_local_file(
    node: &DocumentNode,
    source: &Path,
    prefix: &str,
    root: &Path,
    builder: &mut PathIndexBuilder,
    plans: &mut Vec<DocumentPlan>,
) {
    let source_key = source.to_string_lossy().replace('\\', "/");
    let basename = source_key.rsplit('/').next().unwrap_or(&source_key);
    let output_path = join_output(prefix, &output_name(basename));

    builder.register(&source_key, output_path.clone());
    plans.push(DocumentPlan {
        title: Some(node.title.clone()),
        disk_path: root.join(source),
        source_key,
        output_path,
        origin: DocumentOrigin::Local,
    });
}

fn plan_repository(
    node: &DocumentNode,
    manifest: &RepositoryManifest,
    prefix: &str,
    inside_section: bool,
    builder: &mut PathIndexBuilder,
    plans: &mut Vec<DocumentPlan>,
    assets: &AssetStore,
) {
    let alias = &node.alias;
    // A section repository nested inside another section container drops
    // its alias segment, same as a nested section folder.
    let repo_root = if node.is_section_container() && inside_section {
        prefix.to_owned()
    } else {
        join_output(prefix, alias)
    };
    let main = manifest.main_file().map(|e| e.original_path.clone());

    for entry in &manifest.entries {
        let source_key = format!("{alias}/{}", entry.original_path);
        match entry.kind {
            EntryKind::Markdown => {
                // The main file is the repository landing page whatever its
                // original name was.
                let relative_output = if main.as_deref() == Some(entry.original_path.as_str()) {
                    "index.html".to_owned()
                } else {
                    output_name(&entry.original_path)
                };
                let output_path = join_output(&repo_root, &relative_output);

                builder.register(&source_key, output_path.clone());
                plans.push(DocumentPlan {
                    title: None,
                    disk_path: entry.local_path.clone(),
                    source_key,
                    output_path,
                    origin: DocumentOrigin::Repository {
                        manifest_key: manifest.key(),
                    },
                });
            }
            EntryKind::Image => {
                assets.register(&source_key, entry.local_path.clone());
            }
        }
    }
}

/// Recursively register local images under the site root, keyed by their
/// root-relative path.
fn register_local_images(root: &Path, dir: &Path, assets: &AssetStore) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!(path = %dir.display(), %error, "cannot scan directory for images");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        if path.is_dir() {
            register_local_images(root, &path, assets);
        } else if let Ok(relative) = path.strip_prefix(root) {
            let key = relative.to_string_lossy().replace('\\', "/");
            if classify_blob(&key) == Some(EntryKind::Image) {
                assets.register(&key, path);
            }
        }
    }
}

fn join_output(prefix: &str, tail: &str) -> String {
    if prefix.is_empty() {
        tail.to_owned()
    } else {
        format!("{prefix}/{tail}")
    }
}

#[cfg(test)]
mod tests {
    use mdsite_fetch::ManifestEntry;
    use mdsite_tree::RepoSource;
    use pretty_assertions::assert_eq;

    use super::*;

    fn widgets_manifest() -> RepositoryManifest {
        RepositoryManifest {
            owner: "acme".to_owned(),
            repo_name: "widgets".to_owned(),
            branch: "main".to_owned(),
            alias: Some("widgets".to_owned()),
            entries: vec![
                ManifestEntry {
                    original_path: "README.md".to_owned(),
                    local_path: PathBuf::from("/mirror/README.md"),
                    kind: EntryKind::Markdown,
                },
                ManifestEntry {
                    original_path: "docs/api.md".to_owned(),
                    local_path: PathBuf::from("/mirror/docs/api.md"),
                    kind: EntryKind::Markdown,
                },
                ManifestEntry {
                    original_path: "docs/diagram.png".to_owned(),
                    local_path: PathBuf::from("/mirror/docs/diagram.png"),
                    kind: EntryKind::Image,
                },
            ],
        }
    }

    fn repo_node() -> DocumentNode {
        DocumentNode::repository(
            "Widgets",
            "widgets",
            RepoSource {
                owner: "acme".to_owned(),
                name: "widgets".to_owned(),
                branch: "main".to_owned(),
                url: "https://github.com/acme/widgets".to_owned(),
            },
            false,
        )
    }

    #[test]
    fn test_local_file_outputs_under_ancestor_aliases() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = DocumentNode::folder(
            "Root",
            "",
            false,
            vec![DocumentNode::folder(
                "Guide",
                "guide",
                false,
                vec![DocumentNode::file(
                    "Getting Started",
                    "getting-started",
                    PathBuf::from("docs/start.md"),
                )],
            )],
        );

        let assets = AssetStore::new();
        let (index, plans) = plan_site(&tree, tmp.path(), &HashMap::new(), &assets);

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].output_path, "guide/start.html");
        assert_eq!(plans[0].source_key, "docs/start.md");
        assert_eq!(
            index.resolve("docs/start.md").unwrap().output_path,
            "guide/start.html"
        );
    }

    #[test]
    fn test_repository_entries_rooted_at_alias() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = DocumentNode::folder("Root", "", false, vec![repo_node()]);
        let mut manifests = HashMap::new();
        manifests.insert("acme/widgets".to_owned(), widgets_manifest());

        let assets = AssetStore::new();
        let (index, plans) = plan_site(&tree, tmp.path(), &manifests, &assets);

        let outputs: Vec<&str> = plans.iter().map(|p| p.output_path.as_str()).collect();
        assert_eq!(outputs, vec!["widgets/index.html", "widgets/docs/api.html"]);
        assert_eq!(
            index.resolve("widgets/README.md").unwrap().output_path,
            "widgets/index.html"
        );
        assert_eq!(
            index.resolve("widgets/docs/api.md").unwrap().output_path,
            "widgets/docs/api.html"
        );
    }

    #[test]
    fn test_nested_section_repository_drops_alias_segment() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = DocumentNode::repository(
            "Widgets",
            "widgets",
            RepoSource {
                owner: "acme".to_owned(),
                name: "widgets".to_owned(),
                branch: "main".to_owned(),
                url: "https://github.com/acme/widgets".to_owned(),
            },
            true,
        );
        let outer = DocumentNode::folder("Outer", "outer", true, vec![repo]);
        let tree = DocumentNode::folder("Root", "", false, vec![outer]);
        let mut manifests = HashMap::new();
        manifests.insert("acme/widgets".to_owned(), widgets_manifest());

        let assets = AssetStore::new();
        let (index, plans) = plan_site(&tree, tmp.path(), &manifests, &assets);

        // The outer section is top-level and keeps its segment; the
        // section repository nested inside it drops its own.
        let outputs: Vec<&str> = plans.iter().map(|p| p.output_path.as_str()).collect();
        assert_eq!(outputs, vec!["outer/index.html", "outer/docs/api.html"]);
        assert_eq!(
            index.resolve("widgets/README.md").unwrap().output_path,
            "outer/index.html"
        );
    }

    #[test]
    fn test_repository_main_file_without_root_readme() {
        let tmp = tempfile::tempdir().unwrap();
        let mut manifest = widgets_manifest();
        manifest.entries.remove(0);
        let tree = DocumentNode::folder("Root", "", false, vec![repo_node()]);
        let mut manifests = HashMap::new();
        manifests.insert("acme/widgets".to_owned(), manifest);

        let assets = AssetStore::new();
        let (index, _) = plan_site(&tree, tmp.path(), &manifests, &assets);

        // First markdown entry becomes the landing page.
        assert_eq!(
            index.resolve("widgets/docs/api.md").unwrap().output_path,
            "widgets/index.html"
        );
    }

    #[test]
    fn test_missing_manifest_skips_repository() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = DocumentNode::folder("Root", "", false, vec![repo_node()]);

        let assets = AssetStore::new();
        let (index, plans) = plan_site(&tree, tmp.path(), &HashMap::new(), &assets);

        assert!(plans.is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_local_images_registered_by_relative_path() {
        let tmp = tempfile::tempdir().unwrap();
        let img_dir = tmp.path().join("docs").join("img");
        fs::create_dir_all(&img_dir).unwrap();
        fs::write(img_dir.join("logo.png"), b"pixels").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"not an image").unwrap();

        let tree = DocumentNode::folder("Root", "", false, Vec::new());
        let assets = AssetStore::new();
        let _ = plan_site(&tree, tmp.path(), &HashMap::new(), &assets);

        assert!(assets.resolve("docs/img/logo.png").is_some());
        assert!(assets.resolve("notes.txt").is_none());
    }

    #[test]
    fn test_repository_image_registered_under_alias() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = tmp.path().join("diagram.png");
        fs::write(&mirror, b"png bytes").unwrap();
        let mut manifest = widgets_manifest();
        manifest.entries[2].local_path.clone_from(&mirror);

        let tree = DocumentNode::folder("Root", "", false, vec![repo_node()]);
        let mut manifests = HashMap::new();
        manifests.insert("acme/widgets".to_owned(), manifest);

        let assets = AssetStore::new();
        let _ = plan_site(&tree, tmp.path(), &manifests, &assets);

        assert!(assets.resolve("widgets/docs/diagram.png").is_some());
    }
}
