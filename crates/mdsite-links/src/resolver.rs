//! Link classification and rewriting.
//!
//! # Architecture
//!
//! Every link target found in a document falls into exactly one class:
//!
//! 1. external / fragment-only / non-path — left untouched;
//! 2. image asset — resolved through the [`AssetStore`];
//! 3. markdown document — resolved through the frozen [`PathIndex`] and
//!    rewritten relative to the containing document's output directory;
//! 4. anything else inside a mirrored repository — rewritten to its
//!    canonical URL on the origin host.
//!
//! Asset-vs-document is decided by the syntactic image marker (`![...]`
//! in markdown, `src` in HTML) before any extension check. Document and
//! asset resolutions are recorded in the shared [`LinkReport`]; an
//! unresolved document target degrades to the bare extension-swap
//! transform and never fails the document.

use std::sync::LazyLock;

use mdsite_fetch::{EntryKind, RepositoryManifest, classify_blob};
use mdsite_index::{AssetStore, PathIndex, output_name};
use regex::{Captures, Regex};

use crate::relative::{join, parent_dir, relative_from};
use crate::report::{LinkClass, LinkRecord, LinkReport, Resolution};

/// Inline markdown links and images: `[text](target)` / `![alt](target "title")`.
static MARKDOWN_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(!?)\[([^\]]*)\]\(([^()\s]+)(\s+"[^"]*")?\)"#).unwrap()
});

/// `href`/`src` attributes in raw HTML passages.
static HTML_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\b(href|src)\s*=\s*"([^"]*)""#).unwrap());

/// The document a set of links is being rewritten for.
#[derive(Clone, Copy, Debug)]
pub struct DocumentContext<'a> {
    /// Source key the document is registered under.
    pub source_key: &'a str,
    /// The document's own output path.
    pub output_path: &'a str,
    /// Manifest of the repository this document was mirrored from, if any.
    pub manifest: Option<&'a RepositoryManifest>,
}

/// Rewrites link targets against the frozen index.
///
/// Cheap to construct; holds only borrows, so one resolver can be shared by
/// every rendering worker.
#[derive(Clone, Copy)]
pub struct LinkResolver<'a> {
    index: &'a PathIndex,
    assets: &'a AssetStore,
    report: &'a LinkReport,
}

impl<'a> LinkResolver<'a> {
    #[must_use]
    pub fn new(index: &'a PathIndex, assets: &'a AssetStore, report: &'a LinkReport) -> Self {
        Self {
            index,
            assets,
            report,
        }
    }

    /// Rewrite every markdown link and image target in `text`.
    #[must_use]
    pub fn rewrite_markdown(&self, text: &str, doc: &DocumentContext<'_>) -> String {
        MARKDOWN_LINK_RE
            .replace_all(text, |caps: &Captures<'_>| {
                let bang = &caps[1];
                let label = &caps[2];
                let target = &caps[3];
                let title = caps.get(4).map_or("", |m| m.as_str());
                match self.rewrite_target(target, !bang.is_empty(), doc) {
                    Some(rewritten) => format!("{bang}[{label}]({rewritten}{title})"),
                    None => caps[0].to_owned(),
                }
            })
            .into_owned()
    }

    /// Rewrite `href`/`src` attributes in raw HTML.
    ///
    /// Markdown documents may contain literal HTML passages; those links go
    /// through the same classification as markdown ones.
    #[must_use]
    pub fn rewrite_html(&self, html: &str, doc: &DocumentContext<'_>) -> String {
        HTML_ATTR_RE
            .replace_all(html, |caps: &Captures<'_>| {
                let attr = &caps[1];
                let target = &caps[2];
                let is_image = attr.eq_ignore_ascii_case("src");
                match self.rewrite_target(target, is_image, doc) {
                    Some(rewritten) => format!(r#"{attr}="{rewritten}""#),
                    None => caps[0].to_owned(),
                }
            })
            .into_owned()
    }

    /// Classify and rewrite one target. `None` means "leave as written".
    ///
    /// `is_image` carries the syntactic marker (`![...]` in markdown, `src`
    /// in HTML); it decides asset-vs-document before any extension check.
    fn rewrite_target(
        &self,
        target: &str,
        is_image: bool,
        doc: &DocumentContext<'_>,
    ) -> Option<String> {
        if target.is_empty() || is_external(target) || target.starts_with('#') {
            return None;
        }

        let (path, fragment) = split_fragment(target);
        if path.is_empty() {
            return None;
        }

        if is_image {
            return self.rewrite_asset(target, path, doc);
        }

        if is_markdown_path(path) {
            return Some(self.rewrite_document(target, path, fragment, doc));
        }

        // A plain link to an image file still goes through the asset store.
        if classify_blob(path) == Some(EntryKind::Image) {
            return self.rewrite_asset(target, path, doc);
        }

        // Already-rewritten output paths come back through the post-render
        // HTML pass; they are final.
        if path.to_lowercase().ends_with(".html") {
            return None;
        }

        self.rewrite_origin(path, doc)
    }

    /// Class 3: markdown document target.
    fn rewrite_document(
        &self,
        raw: &str,
        path: &str,
        fragment: &str,
        doc: &DocumentContext<'_>,
    ) -> String {
        let source_dir = parent_dir(doc.source_key);
        let output_dir = parent_dir(doc.output_path);

        // A path relative to the current document is the common case, so
        // try the joined form before the index's own suffix fallback.
        let joined = join(source_dir, path);
        let entry = self
            .index
            .get(&joined)
            .or_else(|| self.index.resolve(path));

        match entry {
            Some(entry) => {
                let rewritten = relative_from(output_dir, &entry.output_path);
                self.report.record(LinkRecord {
                    raw_target: raw.to_owned(),
                    source_document: doc.source_key.to_owned(),
                    classification: LinkClass::Internal,
                    resolution: Resolution::Resolved(entry.output_path.clone()),
                });
                format!("{rewritten}{fragment}")
            }
            None => {
                tracing::debug!(
                    target = %raw,
                    source = %doc.source_key,
                    "link target not in index; using fallback transform"
                );
                self.report.record(LinkRecord {
                    raw_target: raw.to_owned(),
                    source_document: doc.source_key.to_owned(),
                    classification: LinkClass::Internal,
                    resolution: Resolution::Unresolved,
                });
                format!("{}{fragment}", output_name(path))
            }
        }
    }

    /// Class 2: image asset target. Unresolved assets degrade silently and
    /// stay as written.
    fn rewrite_asset(&self, raw: &str, path: &str, doc: &DocumentContext<'_>) -> Option<String> {
        let source_dir = parent_dir(doc.source_key);
        let output_dir = parent_dir(doc.output_path);

        let asset = self
            .assets
            .resolve(&join(source_dir, path))
            .or_else(|| self.assets.resolve(path))?;
        self.report.record(LinkRecord {
            raw_target: raw.to_owned(),
            source_document: doc.source_key.to_owned(),
            classification: LinkClass::Asset,
            resolution: Resolution::Resolved(asset.output_path.clone()),
        });
        Some(relative_from(output_dir, &asset.output_path))
    }

    /// Class 4: non-document, non-asset path inside a mirrored repository
    /// points back at the origin host. Local documents keep such links as
    /// written.
    fn rewrite_origin(&self, path: &str, doc: &DocumentContext<'_>) -> Option<String> {
        let manifest = doc.manifest?;
        let alias_prefix = format!("{}/", manifest.alias_or_name());
        let repo_source = doc.source_key.strip_prefix(&alias_prefix)?;
        let repo_path = join(parent_dir(repo_source), path);
        Some(manifest.origin_url(&repo_path))
    }
}

/// Schemes and pseudo-targets that are never rewritten.
fn is_external(target: &str) -> bool {
    target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("//")
        || target.starts_with("mailto:")
        || target.starts_with("tel:")
        || target.starts_with("data:")
}

fn split_fragment(target: &str) -> (&str, &str) {
    match target.find('#') {
        Some(pos) => (&target[..pos], &target[pos..]),
        None => (target, ""),
    }
}

fn is_markdown_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.ends_with(".md") || lower.ends_with(".markdown")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use mdsite_fetch::ManifestEntry;
    use mdsite_index::PathIndexBuilder;
    use pretty_assertions::assert_eq;

    use super::*;

    fn index(keys: &[&str]) -> PathIndex {
        let mut builder = PathIndexBuilder::new();
        for key in keys {
            builder.register_document(key);
        }
        builder.freeze()
    }

    fn ctx<'a>(source_key: &'a str, output_path: &'a str) -> DocumentContext<'a> {
        DocumentContext {
            source_key,
            output_path,
            manifest: None,
        }
    }

    #[test]
    fn test_sibling_folder_link() {
        let idx = index(&["docs/setup.md", "guide/start.md"]);
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let out = resolver.rewrite_markdown(
            "[Next](../guide/start.md)",
            &ctx("docs/setup.md", "docs/setup.html"),
        );
        assert_eq!(out, "[Next](../guide/start.html)");
    }

    #[test]
    fn test_same_directory_link() {
        let idx = index(&["docs/a.md", "docs/b.md"]);
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let out = resolver.rewrite_markdown("[B](b.md)", &ctx("docs/a.md", "docs/a.html"));
        assert_eq!(out, "[B](b.html)");
    }

    #[test]
    fn test_fragment_is_reattached_unchanged() {
        let idx = index(&["docs/a.md", "docs/b.md"]);
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let out = resolver.rewrite_markdown(
            "[B](b.md#Section-Two)",
            &ctx("docs/a.md", "docs/a.html"),
        );
        assert_eq!(out, "[B](b.html#Section-Two)");
    }

    #[test]
    fn test_external_and_fragment_only_untouched() {
        let idx = index(&["a.md"]);
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let text = "[x](https://example.com/a.md) [y](#top) [z](mailto:a@b.c)";
        let out = resolver.rewrite_markdown(text, &ctx("a.md", "index.html"));
        assert_eq!(out, text);
        assert!(report.records().is_empty());
    }

    #[test]
    fn test_unresolved_falls_back_and_is_recorded() {
        let idx = index(&["a.md"]);
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let out = resolver.rewrite_markdown("[gone](missing/page.md)", &ctx("a.md", "index.html"));
        assert_eq!(out, "[gone](missing/page.html)");

        let diagnostics = report.unresolved();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].url, "missing/page.md");
        assert_eq!(diagnostics[0].source_documents, vec!["a.md"]);
    }

    #[test]
    fn test_repository_link_back_to_main_file() {
        let idx = {
            let mut builder = PathIndexBuilder::new();
            builder.register("widgets/README.md", "widgets/index.html");
            builder.register("widgets/docs/api.md", "widgets/docs/api.html");
            builder.freeze()
        };
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let out = resolver.rewrite_markdown(
            "[Home](../README.md)",
            &ctx("widgets/docs/api.md", "widgets/docs/api.html"),
        );
        assert_eq!(out, "[Home](../index.html)");
    }

    #[test]
    fn test_image_target_uses_asset_store() {
        let tmp = tempfile::tempdir().unwrap();
        let img = tmp.path().join("logo.png");
        std::fs::write(&img, b"pixels").unwrap();

        let idx = index(&["docs/a.md"]);
        let assets = AssetStore::new();
        assets.register("docs/img/logo.png", img);
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let out =
            resolver.rewrite_markdown("![Logo](img/logo.png)", &ctx("docs/a.md", "docs/a.html"));
        assert!(out.starts_with("![Logo](../assets/"), "got {out}");
        assert!(out.ends_with("-logo.png)"));
    }

    #[test]
    fn test_image_marker_beats_markdown_extension() {
        // `![...]` targets go through the asset store even when the path
        // has a markdown extension; they never resolve as documents.
        let idx = index(&["a.md", "snapshots/page.md"]);
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let text = "![render](snapshots/page.md)";
        let out = resolver.rewrite_markdown(text, &ctx("a.md", "index.html"));
        assert_eq!(out, text);
        assert!(report.records().is_empty());
    }

    #[test]
    fn test_image_marker_resolves_unclassified_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("arch.drawio");
        std::fs::write(&file, b"diagram").unwrap();

        let idx = index(&["a.md"]);
        let assets = AssetStore::new();
        assets.register("fig/arch.drawio", file);
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let out = resolver.rewrite_markdown(
            "![Arch](fig/arch.drawio)",
            &ctx("a.md", "index.html"),
        );
        assert!(out.starts_with("![Arch](assets/"), "got {out}");
        assert!(out.ends_with("-arch.drawio)"));

        let records = report.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].classification, LinkClass::Asset);
    }

    #[test]
    fn test_unregistered_image_left_as_written() {
        let idx = index(&["a.md"]);
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let text = "![x](nothing.png)";
        assert_eq!(resolver.rewrite_markdown(text, &ctx("a.md", "index.html")), text);
    }

    #[test]
    fn test_repository_code_link_points_at_origin() {
        let manifest = RepositoryManifest {
            owner: "acme".to_owned(),
            repo_name: "widgets".to_owned(),
            branch: "main".to_owned(),
            alias: Some("widgets".to_owned()),
            entries: vec![ManifestEntry {
                original_path: "docs/api.md".to_owned(),
                local_path: PathBuf::from("/mirror/docs/api.md"),
                kind: EntryKind::Markdown,
            }],
        };
        let idx = {
            let mut builder = PathIndexBuilder::new();
            builder.register("widgets/docs/api.md", "widgets/docs/api.html");
            builder.freeze()
        };
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let doc = DocumentContext {
            source_key: "widgets/docs/api.md",
            output_path: "widgets/docs/api.html",
            manifest: Some(&manifest),
        };
        let out = resolver.rewrite_markdown("[impl](../src/lib.rs)", &doc);
        assert_eq!(
            out,
            "[impl](https://github.com/acme/widgets/blob/main/src/lib.rs)"
        );
    }

    #[test]
    fn test_html_pass_leaves_rewritten_targets_alone() {
        let manifest = RepositoryManifest {
            owner: "acme".to_owned(),
            repo_name: "widgets".to_owned(),
            branch: "main".to_owned(),
            alias: Some("widgets".to_owned()),
            entries: Vec::new(),
        };
        let idx = index(&[]);
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let doc = DocumentContext {
            source_key: "widgets/docs/api.md",
            output_path: "widgets/docs/api.html",
            manifest: Some(&manifest),
        };
        // Output of the markdown pass fed back through the HTML pass.
        let html = r#"<a href="../index.html">Home</a>"#;
        assert_eq!(resolver.rewrite_html(html, &doc), html);
    }

    #[test]
    fn test_local_code_link_left_as_written() {
        let idx = index(&["a.md"]);
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let text = "[src](src/lib.rs)";
        assert_eq!(resolver.rewrite_markdown(text, &ctx("a.md", "index.html")), text);
    }

    #[test]
    fn test_html_href_and_src_rewritten() {
        let tmp = tempfile::tempdir().unwrap();
        let img = tmp.path().join("pic.png");
        std::fs::write(&img, b"pixels").unwrap();

        let idx = index(&["docs/a.md", "docs/b.md"]);
        let assets = AssetStore::new();
        assets.register("docs/pic.png", img);
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let html = r#"<a href="b.md">B</a> <img src="pic.png">"#;
        let out = resolver.rewrite_html(html, &ctx("docs/a.md", "docs/a.html"));
        assert!(out.contains(r#"href="b.html""#), "got {out}");
        assert!(out.contains(r#"src="../assets/"#), "got {out}");
    }

    #[test]
    fn test_link_title_preserved() {
        let idx = index(&["a.md", "b.md"]);
        let assets = AssetStore::new();
        let report = LinkReport::new();
        let resolver = LinkResolver::new(&idx, &assets, &report);

        let out = resolver.rewrite_markdown(
            r#"[B](b.md "See also")"#,
            &ctx("a.md", "index.html"),
        );
        assert_eq!(out, r#"[B](b.html "See also")"#);
    }
}
