//! Breadcrumb and navigation derivation.
//!
//! Both are pure functions of `(output_path, tree)` with no hidden state.
//! Breadcrumbs map ancestor output-path segments back to human titles from
//! the tree; navigation mirrors the tree into a linkable item list.

use std::path::Path;

use crate::node::{DocumentNode, NodeKind};

/// Maximum display length of a joined breadcrumb string.
const BREADCRUMB_BUDGET: usize = 80;

/// Separator between breadcrumb segments.
const SEPARATOR: &str = " › ";

/// Breadcrumb segment with a display title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreadcrumbItem {
    /// Display title.
    pub title: String,
    /// Output directory path for the segment (site-root-relative).
    pub path: String,
}

/// Navigation item for the page menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavItem {
    /// Display title.
    pub title: String,
    /// Link target (site-root-relative output path).
    pub href: String,
    /// Whether this item is the page being rendered.
    pub active: bool,
    /// Child items in declaration order.
    pub children: Vec<NavItem>,
}

/// Derive the breadcrumb display string for a document's output path.
///
/// Walks the ancestor directory segments of `output_path`, resolving each to
/// its human title from the tree (falling back to a formatted version of the
/// raw segment), joins with a separator, and truncates from the right
/// (deepest segment first) when the joined string exceeds the display
/// budget.
#[must_use]
pub fn derive_breadcrumb(output_path: &str, tree: &DocumentNode) -> String {
    let dir = output_path.rsplit_once('/').map_or("", |(dir, _)| dir);
    if dir.is_empty() {
        return String::new();
    }

    let mut titles = Vec::new();
    let mut level = tree;
    for segment in dir.split('/') {
        match find_by_alias(level, segment) {
            Some(node) => {
                titles.push(node.title.clone());
                level = node;
            }
            None => titles.push(format_segment(segment)),
        }
    }

    let mut joined = titles.join(SEPARATOR);
    while joined.chars().count() > BREADCRUMB_BUDGET && titles.len() > 1 {
        titles.pop();
        joined = titles.join(SEPARATOR);
    }
    joined
}

/// Find a child node by alias, looking through section containers that do
/// not contribute their own path segment.
fn find_by_alias<'a>(parent: &'a DocumentNode, alias: &str) -> Option<&'a DocumentNode> {
    for child in parent.children() {
        if child.alias == alias {
            return Some(child);
        }
        if child.is_section_container()
            && let Some(found) = find_by_alias(child, alias)
        {
            return Some(found);
        }
    }
    None
}

/// Fallback formatting for a raw path segment: `setup-guide` -> `Setup Guide`.
fn format_segment(segment: &str) -> String {
    segment
        .split(['-', '_'])
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

/// Build the navigation item tree for the page menu.
///
/// `output_name` maps a source filename to its output filename and must be
/// the same transform used by the indexing pass, so menu links agree with
/// registered output paths. `active` is the output path of the page being
/// rendered.
#[must_use]
pub fn navigation(
    tree: &DocumentNode,
    active: &str,
    output_name: &dyn Fn(&str) -> String,
) -> Vec<NavItem> {
    build_items(tree, "", false, active, output_name)
}

fn build_items(
    parent: &DocumentNode,
    prefix: &str,
    inside_section: bool,
    active: &str,
    output_name: &dyn Fn(&str) -> String,
) -> Vec<NavItem> {
    let mut items = Vec::new();

    for child in parent.children() {
        let child_prefix = join_prefix(prefix, child, inside_section);
        match &child.kind {
            NodeKind::File { source } => {
                let file_name = Path::new(source)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let href = join_path(prefix, &output_name(&file_name));
                items.push(NavItem {
                    title: child.title.clone(),
                    active: href == active,
                    href,
                    children: Vec::new(),
                });
            }
            NodeKind::Folder { .. } => {
                let children = build_items(
                    child,
                    &child_prefix,
                    inside_section || child.is_section_container(),
                    active,
                    output_name,
                );
                let href = join_path(&child_prefix, "index.html");
                items.push(NavItem {
                    title: child.title.clone(),
                    active: href == active,
                    href,
                    children,
                });
            }
            NodeKind::Repository { .. } => {
                let href = join_path(&child_prefix, "index.html");
                items.push(NavItem {
                    title: child.title.clone(),
                    active: href == active,
                    href,
                    children: Vec::new(),
                });
            }
        }
    }

    items
}

/// Path prefix for a node's children.
fn join_prefix(prefix: &str, node: &DocumentNode, inside_section: bool) -> String {
    if (node.is_section_container() && inside_section) || node.alias.is_empty() {
        prefix.to_owned()
    } else if prefix.is_empty() {
        node.alias.clone()
    } else {
        format!("{prefix}/{}", node.alias)
    }
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}
