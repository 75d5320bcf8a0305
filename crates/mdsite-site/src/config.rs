//! Build configuration.
//!
//! Parses `mdsite.toml` with serde. Every field except `root` has a
//! default, so a one-line config is enough for a local-only site. A config
//! file that exists but fails to parse is a fatal error; a missing config
//! file falls back to defaults with `root = "docs"`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename looked up in the working directory.
pub const CONFIG_FILENAME: &str = "mdsite.toml";

/// Fatal configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level build configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root directory of the local document tree.
    pub root: PathBuf,
    /// Output directory for the generated site.
    pub out_dir: PathBuf,
    /// Cache directory for repository mirrors and manifests.
    pub cache_dir: PathBuf,
    /// Site presentation settings.
    pub site: SiteSection,
    /// Repository fetch settings.
    pub fetch: FetchSection,
    /// GitHub access settings.
    pub github: GithubSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("docs"),
            out_dir: PathBuf::from("site"),
            cache_dir: PathBuf::from(".mdsite-cache"),
            site: SiteSection::default(),
            fetch: FetchSection::default(),
            github: GithubSection::default(),
        }
    }
}

/// `[site]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Site title shown in the page header and the root breadcrumb.
    pub title: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Documentation".to_owned(),
        }
    }
}

/// `[fetch]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSection {
    /// HTTP timeout per request, in seconds.
    pub timeout_secs: u64,
    /// Manifest cache freshness window, in hours.
    pub max_age_hours: u64,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_age_hours: 12,
        }
    }
}

/// `[github]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubSection {
    /// Bearer token for the GitHub API. Falls back to anonymous access.
    pub token: Option<String>,
}

impl Config {
    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `mdsite.toml` from `dir` when present, defaults otherwise.
    ///
    /// # Errors
    ///
    /// A config file that exists but cannot be read or parsed is an error;
    /// a missing file is not.
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILENAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }
}
