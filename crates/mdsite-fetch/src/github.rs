//! GitHub repository fetcher.
//!
//! Lists the repository tree via the git trees API (`recursive=1`) and
//! mirrors markdown and image blobs from `raw.githubusercontent.com` into
//! the local mirror directory. All other blob types are ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ureq::Agent;

use crate::manifest::{EntryKind, ManifestEntry, RepositoryManifest, classify_blob};
use crate::{FetchError, FetchRequest, RepositoryFetcher};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// One node in the git trees API response.
#[derive(Debug, serde::Deserialize)]
struct TreeNode {
    path: String,
    #[serde(rename = "type")]
    node_type: String,
}

/// Git trees API response.
#[derive(Debug, serde::Deserialize)]
struct TreeResponse {
    tree: Vec<TreeNode>,
    #[serde(default)]
    truncated: bool,
}

/// Fetcher backed by the GitHub API.
pub struct GithubFetcher {
    agent: Agent,
    mirror_root: PathBuf,
    token: Option<String>,
}

impl GithubFetcher {
    /// Create a fetcher mirroring into `mirror_root` with the default
    /// timeout.
    #[must_use]
    pub fn new(mirror_root: PathBuf) -> Self {
        Self::with_timeout(mirror_root, Duration::from_secs(DEFAULT_TIMEOUT))
    }

    /// Create a fetcher with an explicit HTTP timeout. Timeouts are treated
    /// as fetch failure by callers.
    #[must_use]
    pub fn with_timeout(mirror_root: PathBuf, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            mirror_root,
            token: None,
        }
    }

    /// Attach a bearer token for the GitHub API.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// List mirrorable blobs for a branch.
    fn list_tree(&self, request: &FetchRequest) -> Result<Vec<(String, EntryKind)>, FetchError> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/git/trees/{}?recursive=1",
            request.owner, request.repo, request.branch
        );

        let mut builder = self
            .agent
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "mdsite");
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }

        let response = builder.call().map_err(FetchError::Http)?;
        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let detail = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(FetchError::Api { status, detail });
        }

        let tree: TreeResponse = body.read_json().map_err(FetchError::Http)?;
        if tree.truncated {
            tracing::warn!(
                owner = %request.owner,
                repo = %request.repo,
                "repository tree listing was truncated by the API; mirror may be incomplete"
            );
        }

        Ok(tree
            .tree
            .into_iter()
            .filter(|node| node.node_type == "blob")
            .filter_map(|node| classify_blob(&node.path).map(|kind| (node.path, kind)))
            .collect())
    }

    /// Download one blob into the mirror directory.
    fn download_blob(
        &self,
        request: &FetchRequest,
        repo_path: &str,
        dest: &Path,
    ) -> Result<(), FetchError> {
        let url = format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}",
            request.owner, request.repo, request.branch, repo_path
        );

        let response = self
            .agent
            .get(&url)
            .header("User-Agent", "mdsite")
            .call()
            .map_err(FetchError::Http)?;
        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            return Err(FetchError::Api {
                status,
                detail: format!("downloading {repo_path}"),
            });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(FetchError::Io)?;
        }
        let bytes = body
            .with_config()
            .limit(64 * 1024 * 1024)
            .read_to_vec()
            .map_err(FetchError::Http)?;
        fs::write(dest, bytes).map_err(FetchError::Io)?;
        Ok(())
    }
}

impl RepositoryFetcher for GithubFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<RepositoryManifest, FetchError> {
        let blobs = self.list_tree(request)?;
        let mirror_dir = self
            .mirror_root
            .join(&request.owner)
            .join(&request.repo)
            .join(&request.branch);

        let mut entries = Vec::with_capacity(blobs.len());
        for (repo_path, kind) in blobs {
            let local_path = mirror_dir.join(repo_path.replace('/', std::path::MAIN_SEPARATOR_STR));
            if let Err(error) = self.download_blob(request, &repo_path, &local_path) {
                // A single failed blob degrades that file, not the mirror.
                tracing::warn!(path = %repo_path, %error, "failed to mirror file");
                continue;
            }
            entries.push(ManifestEntry {
                original_path: repo_path,
                local_path,
                kind,
            });
        }

        tracing::info!(
            owner = %request.owner,
            repo = %request.repo,
            branch = %request.branch,
            files = entries.len(),
            "mirrored repository"
        );

        Ok(RepositoryManifest {
            owner: request.owner.clone(),
            repo_name: request.repo.clone(),
            branch: request.branch.clone(),
            alias: request.alias.clone(),
            entries,
        })
    }
}
