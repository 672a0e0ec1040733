//! `hb check` command implementation.

use std::path::PathBuf;

use clap::Args;
use hb_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Book manifest (default: from hb.toml, or book.yaml).
    manifest: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover hb.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl CheckArgs {
    /// Run the whole pipeline without writing output.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            manifest_path: self.manifest,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let builder = super::site_builder(&config, &output)?;
        for chapter in builder.missing_chapters() {
            output.warning(&format!(
                "Missing chapter '{}': {}",
                chapter.title, chapter.path
            ));
        }
        let site = builder.check()?;

        output.success(&format!("All {} chapters OK", site.len()));
        Ok(())
    }
}
