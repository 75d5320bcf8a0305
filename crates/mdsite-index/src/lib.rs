//! Global path index for mdsite.
//!
//! Maps every known source document (local markdown files and mirrored
//! repository files) to its final output path, and registers image assets
//! for content-hash deduplication.
//!
//! # Architecture
//!
//! Indexing is strictly two-phase. [`plan_site`] consumes the document tree
//! and the fetched manifests, registers everything through
//! [`PathIndexBuilder`], and freezes the result into an immutable
//! [`PathIndex`] before returning. Link resolution only ever sees the
//! frozen index, so lookups are point-in-time complete with no backfill.

mod assets;
mod output_name;
mod path_index;
mod plan;

pub use assets::{ASSET_DIR, AssetStore, ResolvedAsset};
pub use output_name::{is_index_stem, output_name};
pub use path_index::{PathIndex, PathIndexBuilder, PathIndexEntry};
pub use plan::{DocumentOrigin, DocumentPlan, plan_site};
