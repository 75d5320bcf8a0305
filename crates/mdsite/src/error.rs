//! CLI error type.

use mdsite_site::{BuildError, ConfigError};

/// Errors surfaced to the user with a non-zero exit code.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),
}
