//! Repository mirror fetching for mdsite.
//!
//! Given a remote repository reference, retrieves its markdown and image
//! files into a local mirror directory and produces a
//! [`RepositoryManifest`] mapping original repository paths to mirror
//! paths. The manifest shape is the only contract consumed by the rest of
//! the build.
//!
//! # Idempotency
//!
//! [`CachingFetcher`] wraps any [`RepositoryFetcher`] with the on-disk
//! [`ManifestCache`]: repeated fetches of the same `(owner, repo, branch)`
//! within the freshness window return the cached manifest without touching
//! the network. Fetch failures contribute an empty manifest and are logged,
//! never propagated as build failures.

mod cache;
mod github;
mod manifest;

pub use cache::{DEFAULT_MAX_AGE, ManifestCache};
pub use github::GithubFetcher;
pub use manifest::{EntryKind, ManifestEntry, RepositoryManifest, classify_blob};

/// Fetch request identifying one repository branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch to mirror.
    pub branch: String,
    /// Optional output directory name override.
    pub alias: Option<String>,
}

/// Fetch errors. All of these degrade to an empty manifest at the build
/// level; none abort the build.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (includes timeouts).
    #[error("http error: {0}")]
    Http(#[from] ureq::Error),

    /// Non-success API response.
    #[error("api error (status {status}): {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or context.
        detail: String,
    },

    /// Local mirror I/O failure.
    #[error("mirror i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Repository fetcher contract.
///
/// Object-safe so the build can hold `Box<dyn RepositoryFetcher>` and tests
/// can substitute a counting spy.
pub trait RepositoryFetcher: Send + Sync {
    /// Fetch one repository branch, producing its manifest.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network, API, or mirror I/O failure.
    fn fetch(&self, request: &FetchRequest) -> Result<RepositoryManifest, FetchError>;
}

/// Caching wrapper making any fetcher idempotent per `(owner, repo,
/// branch)` within the cache freshness window.
pub struct CachingFetcher<F> {
    inner: F,
    cache: ManifestCache,
}

impl<F: RepositoryFetcher> CachingFetcher<F> {
    /// Wrap `inner` with `cache`.
    #[must_use]
    pub fn new(inner: F, cache: ManifestCache) -> Self {
        Self { inner, cache }
    }
}

impl<F: RepositoryFetcher> RepositoryFetcher for CachingFetcher<F> {
    fn fetch(&self, request: &FetchRequest) -> Result<RepositoryManifest, FetchError> {
        if let Some(mut cached) = self.cache.get(&request.owner, &request.repo, &request.branch) {
            tracing::debug!(
                owner = %request.owner,
                repo = %request.repo,
                branch = %request.branch,
                "using cached manifest"
            );
            // The alias is a per-build concern, not part of the cached identity.
            cached.alias.clone_from(&request.alias);
            return Ok(cached);
        }

        let manifest = self.inner.fetch(request)?;
        self.cache.set(&manifest);
        Ok(manifest)
    }
}
