//! CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use mdsite_fetch::{CachingFetcher, GithubFetcher, ManifestCache};
use mdsite_site::{Config, build_site};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the `build` command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the document root directory.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Override the output directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// GitHub API token for repository mirroring.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_or_default(&PathBuf::from("."))?,
        };
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(out) = self.out {
            config.out_dir = out;
        }
        if self.token.is_some() {
            config.github.token = self.token;
        }

        let cache = ManifestCache::new(config.cache_dir.clone())
            .with_max_age(Duration::from_secs(config.fetch.max_age_hours * 3600));
        let fetcher = GithubFetcher::with_timeout(
            config.cache_dir.join("mirrors"),
            Duration::from_secs(config.fetch.timeout_secs),
        )
        .with_token(config.github.token.clone());
        let fetcher = CachingFetcher::new(fetcher, cache);

        let summary = build_site(&config, &fetcher)?;

        for failed in &summary.failed {
            output.warning(&format!("skipped {}: {}", failed.source_key, failed.reason));
        }
        for broken in &summary.broken_links {
            output.warning(&format!(
                "broken link {} (from {})",
                broken.url,
                broken.source_documents.join(", ")
            ));
        }

        if summary.failed.is_empty() && summary.broken_links.is_empty() {
            output.success(&format!(
                "Generated {} pages into {}",
                summary.generated,
                config.out_dir.display()
            ));
        } else {
            output.info(&format!(
                "Generated {} pages into {} ({} skipped, {} broken links)",
                summary.generated,
                config.out_dir.display(),
                summary.failed.len(),
                summary.broken_links.len()
            ));
        }
        Ok(())
    }
}
