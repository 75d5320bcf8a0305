//! Source tree model for mdsite.
//!
//! Parses per-directory `toc.yaml` hierarchy descriptions into an in-memory
//! [`DocumentNode`] tree, resolving aliases and per-folder overrides.
//! Directories without a `toc.yaml` fall back to markdown auto-discovery.
//!
//! # Architecture
//!
//! The tree is built once per build and is immutable afterwards:
//! - [`build_tree`] walks the source root and produces the root folder node
//! - [`DocumentNode`] is a tagged union: file, folder, or repository
//! - [`derive_breadcrumb`] and [`navigation`] derive display structures from
//!   the finished tree without any hidden state

mod breadcrumbs;
mod builder;
mod node;
mod slug;
mod toc;

pub use breadcrumbs::{BreadcrumbItem, NavItem, derive_breadcrumb, navigation};
pub use builder::{TreeError, build_tree};
pub use node::{DocumentNode, NodeKind, RepoSource};
pub use slug::slugify;
pub use toc::{TOC_FILENAME, TocEntry, TocTarget, parse_toc};
