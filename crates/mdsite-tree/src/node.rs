//! Document tree node types.
//!
//! One [`DocumentNode`] per addressable unit in the hierarchy. The variant is
//! decided once at parse time; downstream code switches on [`NodeKind`] and
//! never re-inspects raw strings.

use std::path::PathBuf;

/// Remote repository reference parsed from a hierarchy entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoSource {
    /// Repository owner (e.g., "acme").
    pub owner: String,
    /// Repository name (e.g., "widgets").
    pub name: String,
    /// Branch to mirror.
    pub branch: String,
    /// Original URL as written in the hierarchy entry.
    pub url: String,
}

impl RepoSource {
    /// Canonical `owner/name` key used for manifest lookup.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Node variant data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A single markdown file. `source` is relative to the site root,
    /// forward slashes.
    File {
        /// Source path relative to the site root.
        source: PathBuf,
    },
    /// A folder of child nodes.
    Folder {
        /// Group children without contributing a path segment when nested
        /// inside another section container.
        section: bool,
        /// Child nodes in declaration order.
        children: Vec<DocumentNode>,
    },
    /// A mirrored remote repository.
    Repository {
        /// Remote source reference.
        source: RepoSource,
        /// Same grouping semantics as folders.
        section: bool,
    },
}

/// One addressable unit in the document hierarchy.
///
/// Constructed once per build from the parsed configuration and immutable
/// after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentNode {
    /// Human-readable display title.
    pub title: String,
    /// URL-safe path segment, derived from the title unless given explicitly.
    pub alias: String,
    /// Variant data.
    pub kind: NodeKind,
}

impl DocumentNode {
    /// Create a file node.
    #[must_use]
    pub fn file(title: impl Into<String>, alias: impl Into<String>, source: PathBuf) -> Self {
        Self {
            title: title.into(),
            alias: alias.into(),
            kind: NodeKind::File { source },
        }
    }

    /// Create a folder node.
    #[must_use]
    pub fn folder(
        title: impl Into<String>,
        alias: impl Into<String>,
        section: bool,
        children: Vec<DocumentNode>,
    ) -> Self {
        Self {
            title: title.into(),
            alias: alias.into(),
            kind: NodeKind::Folder { section, children },
        }
    }

    /// Create a repository node.
    #[must_use]
    pub fn repository(
        title: impl Into<String>,
        alias: impl Into<String>,
        source: RepoSource,
        section: bool,
    ) -> Self {
        Self {
            title: title.into(),
            alias: alias.into(),
            kind: NodeKind::Repository { source, section },
        }
    }

    /// Whether this node groups children without its own path segment
    /// when nested inside another section container.
    #[must_use]
    pub fn is_section_container(&self) -> bool {
        match &self.kind {
            NodeKind::Folder { section, .. } | NodeKind::Repository { section, .. } => *section,
            NodeKind::File { .. } => false,
        }
    }

    /// Child nodes, empty for files and repositories.
    #[must_use]
    pub fn children(&self) -> &[DocumentNode] {
        match &self.kind {
            NodeKind::Folder { children, .. } => children,
            _ => &[],
        }
    }

    /// Depth-first traversal visiting every node with its accumulated
    /// ancestor alias path.
    ///
    /// The path passed to `visit` is the node's *own* directory prefix
    /// (ancestor segments joined by `/`, empty at the root). Section
    /// containers nested inside other section containers do not contribute
    /// a segment; top-level sections do. The third argument tells the
    /// visitor whether the node sits inside a section container, so
    /// consumers that expand leaf nodes into subtrees (repositories) can
    /// apply the same segment-dropping rule.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a DocumentNode, &str, bool),
    {
        self.walk_inner(String::new(), false, visit);
    }

    fn walk_inner<'a, F>(&'a self, prefix: String, inside_section: bool, visit: &mut F)
    where
        F: FnMut(&'a DocumentNode, &str, bool),
    {
        visit(self, &prefix, inside_section);

        let drops_segment = self.is_section_container() && inside_section;
        let child_prefix = if drops_segment || self.alias.is_empty() {
            prefix
        } else if prefix.is_empty() {
            self.alias.clone()
        } else {
            format!("{prefix}/{}", self.alias)
        };

        let child_inside = inside_section || self.is_section_container();
        for child in self.children() {
            child.walk_inner(child_prefix.clone(), child_inside, visit);
        }
    }
}
