//! Build pipeline.
//!
//! # Architecture
//!
//! The build runs in strictly ordered phases:
//!
//! 1. parse the document tree;
//! 2. fetch every repository mirror (parallel, failures degrade to empty
//!    manifests) — all manifests are in hand before phase 3 starts;
//! 3. index everything and freeze the path index;
//! 4. render documents in parallel against the frozen index;
//! 5. copy resolved assets and report.
//!
//! Per-document and per-repository failures never abort the build; only a
//! missing root or unparseable configuration is fatal.

use std::collections::HashMap;

use mdsite_fetch::{FetchRequest, RepositoryFetcher, RepositoryManifest};
use mdsite_index::{AssetStore, DocumentOrigin, DocumentPlan, output_name, plan_site};
use mdsite_links::{Diagnostic, DocumentContext, LinkReport, LinkResolver};
use mdsite_tree::{DocumentNode, NodeKind, TreeError, build_tree, derive_breadcrumb, navigation};
use rayon::prelude::*;

use crate::config::Config;
use crate::renderer::render_markdown;
use crate::template::{PageContext, render_page};
use crate::writer::SiteWriter;

/// Fatal build errors.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// One document that could not be generated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedDocument {
    /// Source key of the document.
    pub source_key: String,
    /// Human-readable reason.
    pub reason: String,
}

/// End-of-build report.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Documents written to the output tree.
    pub generated: usize,
    /// Documents skipped due to errors, enumerated by name.
    pub failed: Vec<FailedDocument>,
    /// Links that resolved against the index.
    pub links_resolved: usize,
    /// Links that fell back to the naive transform.
    pub links_unresolved: usize,
    /// Unresolved link targets grouped by URL.
    pub broken_links: Vec<Diagnostic>,
}

/// Run a complete site build.
///
/// # Errors
///
/// Returns [`BuildError`] only for a missing root directory; everything
/// else degrades and is reported in the summary.
pub fn build_site(
    config: &Config,
    fetcher: &dyn RepositoryFetcher,
) -> Result<BuildSummary, BuildError> {
    let tree = build_tree(&config.root)?;

    let manifests = fetch_repositories(&tree, fetcher);

    let assets = AssetStore::new();
    let (index, plans) = plan_site(&tree, &config.root, &manifests, &assets);
    tracing::info!(documents = plans.len(), "site indexed");

    let report = LinkReport::new();
    let resolver = LinkResolver::new(&index, &assets, &report);
    let writer = SiteWriter::new(config.out_dir.clone());

    // Repository mirrors first, then local files. The frozen index makes
    // the output independent of this order; keeping the phases explicit
    // keeps each one testable on its own.
    let (repo_plans, local_plans): (Vec<&DocumentPlan>, Vec<&DocumentPlan>) = plans
        .iter()
        .partition(|plan| matches!(plan.origin, DocumentOrigin::Repository { .. }));

    let mut summary = BuildSummary::default();
    render_phase(&repo_plans, &tree, config, &manifests, resolver, &writer, &mut summary);
    render_phase(&local_plans, &tree, config, &manifests, resolver, &writer, &mut summary);

    for asset in assets.exports() {
        if let Err(error) = writer.copy_asset(&asset) {
            tracing::warn!(asset = %asset.output_path, %error, "failed to copy asset");
        }
    }

    (summary.links_resolved, summary.links_unresolved) = report.counts();
    summary.broken_links = report.unresolved();

    tracing::info!(
        generated = summary.generated,
        failed = summary.failed.len(),
        links_resolved = summary.links_resolved,
        links_unresolved = summary.links_unresolved,
        "build finished"
    );
    Ok(summary)
}

/// Phase 2: fetch every repository referenced by the tree.
///
/// Fetches run in parallel; a failed fetch contributes an empty manifest
/// and is logged once.
fn fetch_repositories(
    tree: &DocumentNode,
    fetcher: &dyn RepositoryFetcher,
) -> HashMap<String, RepositoryManifest> {
    let mut seen = std::collections::HashSet::new();
    let mut requests: Vec<FetchRequest> = Vec::new();
    tree.walk(&mut |node, _, _| {
        if let NodeKind::Repository { source, .. } = &node.kind
            && seen.insert(source.key())
        {
            requests.push(FetchRequest {
                owner: source.owner.clone(),
                repo: source.name.clone(),
                branch: source.branch.clone(),
                alias: Some(node.alias.clone()),
            });
        }
    });

    requests
        .par_iter()
        .map(|request| {
            let manifest = fetcher.fetch(request).unwrap_or_else(|error| {
                tracing::warn!(
                    owner = %request.owner,
                    repo = %request.repo,
                    %error,
                    "repository fetch failed; contributing no files"
                );
                RepositoryManifest::empty(
                    &request.owner,
                    &request.repo,
                    &request.branch,
                    request.alias.as_deref(),
                )
            });
            (manifest.key(), manifest)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// Render one batch of documents in parallel, accumulating into the
/// summary.
fn render_phase(
    plans: &[&DocumentPlan],
    tree: &DocumentNode,
    config: &Config,
    manifests: &HashMap<String, RepositoryManifest>,
    resolver: LinkResolver<'_>,
    writer: &SiteWriter,
    summary: &mut BuildSummary,
) {
    let results: Vec<Result<(), FailedDocument>> = plans
        .par_iter()
        .map(|plan| render_document(plan, tree, config, manifests, resolver, writer))
        .collect();

    for result in results {
        match result {
            Ok(()) => summary.generated += 1,
            Err(failed) => {
                tracing::warn!(document = %failed.source_key, reason = %failed.reason, "document skipped");
                summary.failed.push(failed);
            }
        }
    }
}

/// Phases 4 and 5 for one document: read, rewrite, render, write.
fn render_document(
    plan: &DocumentPlan,
    tree: &DocumentNode,
    config: &Config,
    manifests: &HashMap<String, RepositoryManifest>,
    resolver: LinkResolver<'_>,
    writer: &SiteWriter,
) -> Result<(), FailedDocument> {
    let fail = |reason: String| FailedDocument {
        source_key: plan.source_key.clone(),
        reason,
    };

    let markdown = std::fs::read_to_string(&plan.disk_path)
        .map_err(|e| fail(format!("cannot read {}: {e}", plan.disk_path.display())))?;

    let manifest = match &plan.origin {
        DocumentOrigin::Local => None,
        DocumentOrigin::Repository { manifest_key } => manifests.get(manifest_key),
    };
    let doc = DocumentContext {
        source_key: &plan.source_key,
        output_path: &plan.output_path,
        manifest,
    };

    let rewritten = resolver.rewrite_markdown(&markdown, &doc);
    let rendered = render_markdown(&rewritten);
    let body = resolver.rewrite_html(&rendered.html, &doc);

    let title = plan
        .title
        .clone()
        .or(rendered.title)
        .unwrap_or_else(|| fallback_title(&plan.source_key));

    let crumb = derive_breadcrumb(&plan.output_path, tree);
    let breadcrumb = if crumb.is_empty() {
        config.site.title.clone()
    } else {
        format!("{} › {crumb}", config.site.title)
    };
    let nav = navigation(tree, &plan.output_path, &|name| output_name(name));

    let page = render_page(&PageContext {
        title: &title,
        site_title: &config.site.title,
        breadcrumb: &breadcrumb,
        output_path: &plan.output_path,
        nav: &nav,
        body: &body,
    });

    writer
        .write_page(&plan.output_path, &page)
        .map_err(|e| fail(format!("cannot write {}: {e}", plan.output_path)))
}

/// Title of last resort, from the source filename.
fn fallback_title(source_key: &str) -> String {
    let basename = source_key.rsplit('/').next().unwrap_or(source_key);
    let stem = basename.rsplit_once('.').map_or(basename, |(s, _)| s);
    stem.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
