//! CLI error types.

use hb_config::ConfigError;
use hb_site::{BuildError, ManifestError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Manifest(#[from] ManifestError),

    #[error("{0}")]
    Build(#[from] BuildError),
}
