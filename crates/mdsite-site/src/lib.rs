//! Site assembly for mdsite.
//!
//! Ties the tree model, fetcher, index, and link resolver together into
//! the ordered build pipeline, and owns the plumbing around it: config
//! loading, markdown rendering, the page shell, and the output writer.

mod config;
mod pipeline;
mod renderer;
mod template;
mod writer;

pub use config::{CONFIG_FILENAME, Config, ConfigError, FetchSection, GithubSection, SiteSection};
pub use pipeline::{BuildError, BuildSummary, FailedDocument, build_site};
pub use renderer::{Rendered, render_markdown};
pub use template::{PageContext, render_page};
pub use writer::SiteWriter;
