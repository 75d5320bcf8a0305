//! Image asset registry.
//!
//! Assets are registered under source keys just like documents, but their
//! output names are derived from file content: `assets/<hash12>-<basename>`
//! where `hash12` is the first twelve hex characters of the file's SHA-256.
//! Identical files registered under different keys therefore collapse into
//! one output file. Hashing is lazy and memoized, so assets nothing links
//! to are never read.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sha2::{Digest, Sha256};

/// Directory under the output root that holds all images.
pub const ASSET_DIR: &str = "assets";

/// Hex characters of the content hash kept in the output name.
const HASH_PREFIX_LEN: usize = 12;

/// Resolved asset location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// On-disk source of the image.
    pub disk_path: PathBuf,
    /// Site-relative output path, e.g. `assets/3f2a9c8b1d0e-logo.png`.
    pub output_path: String,
}

#[derive(Debug, Default)]
struct StoreState {
    /// Normalized source key to disk path.
    sources: HashMap<String, PathBuf>,
    /// Keys in registration order; the basename fallback scans this so an
    /// ambiguous target resolves the same way in every build.
    order: Vec<String>,
    /// Memoized resolutions keyed by source key.
    resolved: HashMap<String, ResolvedAsset>,
}

/// Thread-safe asset registry.
///
/// Registration happens during indexing; resolution happens during link
/// rewriting, potentially from several rayon workers at once.
#[derive(Debug, Default)]
pub struct AssetStore {
    state: Mutex<StoreState>,
}

impl AssetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image under its source key. A repeated key keeps the
    /// first registration.
    pub fn register(&self, source_key: &str, disk_path: PathBuf) {
        let key = normalize(source_key);
        let mut state = self.lock();
        if !state.sources.contains_key(&key) {
            state.sources.insert(key.clone(), disk_path);
            state.order.push(key);
        }
    }

    /// Resolve a link target against the registered assets.
    ///
    /// Exact key match first, then a case-insensitive basename match taking
    /// the first registration when several share a basename. The file is
    /// hashed on first resolution and the result memoized.
    #[must_use]
    pub fn resolve(&self, target: &str) -> Option<ResolvedAsset> {
        let key = normalize(target);
        let mut state = self.lock();

        if let Some(hit) = state.resolved.get(&key) {
            return Some(hit.clone());
        }

        let source_key = if state.sources.contains_key(&key) {
            key.clone()
        } else {
            let basename = key.rsplit('/').next()?.to_lowercase();
            state
                .order
                .iter()
                .find(|k| {
                    k.rsplit('/')
                        .next()
                        .is_some_and(|b| b.eq_ignore_ascii_case(&basename))
                })?
                .clone()
        };

        let disk_path = state.sources[&source_key].clone();
        let resolved = match hash_output_path(&disk_path) {
            Ok(output_path) => ResolvedAsset {
                disk_path,
                output_path,
            },
            Err(error) => {
                tracing::warn!(key = %source_key, %error, "failed to hash asset; leaving link untouched");
                return None;
            }
        };
        state.resolved.insert(key, resolved.clone());
        Some(resolved)
    }

    /// All assets that were actually resolved, for the copy phase. Each
    /// distinct output path appears once.
    #[must_use]
    pub fn exports(&self) -> Vec<ResolvedAsset> {
        let state = self.lock();
        let mut seen = HashMap::new();
        for asset in state.resolved.values() {
            seen.entry(asset.output_path.clone())
                .or_insert_with(|| asset.clone());
        }
        let mut exports: Vec<ResolvedAsset> = seen.into_values().collect();
        exports.sort_by(|a, b| a.output_path.cmp(&b.output_path));
        exports
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Derive the content-addressed output path for an asset file.
fn hash_output_path(disk_path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(disk_path)?;
    let digest = Sha256::digest(&bytes);
    let hash = &hex::encode(digest)[..HASH_PREFIX_LEN];
    let basename = disk_path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "asset".to_owned());
    Ok(format!("{ASSET_DIR}/{hash}-{basename}"))
}

fn normalize(raw: &str) -> String {
    let mut key = raw.replace('\\', "/");
    while let Some(stripped) = key.strip_prefix("./") {
        key = stripped.to_owned();
    }
    key.trim_start_matches('/').to_owned()
}
