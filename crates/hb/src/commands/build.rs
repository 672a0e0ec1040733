//! `hb build` command implementation.

use std::path::PathBuf;

use clap::Args;
use hb_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Book manifest (default: from hb.toml, or book.yaml).
    manifest: Option<PathBuf>,

    /// Output directory for the generated site (default: from hb.toml, or site/).
    #[arg(short, long, env = "HB_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover hb.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Warn about links to unknown chapters instead of failing.
    #[arg(long)]
    no_strict_links: bool,

    /// Worker threads for chapter processing (0 = one per CPU).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Render code blocks one after another instead of side-by-side panels.
    #[arg(long)]
    no_compare: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            manifest_path: self.manifest,
            output_dir: self.output,
            strict_links: self.no_strict_links.then_some(false),
            jobs: self.jobs,
            compare_code: self.no_compare.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let output_dir = &config.build_resolved.output_dir;

        let builder = super::site_builder(&config, &output)?;
        output.info(&format!("Output: {}", output_dir.display()));

        let site = builder.build(output_dir)?;

        output.success(&format!(
            "Built {} chapters to {}",
            site.len(),
            output_dir.display()
        ));
        Ok(())
    }
}
