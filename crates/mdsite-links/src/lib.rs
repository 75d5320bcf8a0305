//! Link resolution for mdsite.
//!
//! Rewrites every link and image reference in a document's markdown or
//! HTML into a path relative to that document's own output location, using
//! the frozen path index. Classification, relative-path arithmetic, and
//! the diagnostics side-channel live here.

mod relative;
mod report;
mod resolver;

pub use relative::{join, parent_dir, relative_from};
pub use report::{Diagnostic, LinkClass, LinkRecord, LinkReport, Resolution};
pub use resolver::{DocumentContext, LinkResolver};
