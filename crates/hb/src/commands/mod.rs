//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod check;

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;

use hb_config::Config;
use hb_site::{BuildOptions, Manifest, SiteBuilder};

use crate::error::CliError;
use crate::output::Output;

/// Load the manifest named by `config` and prepare a builder for it.
fn site_builder(config: &Config, output: &Output) -> Result<SiteBuilder, CliError> {
    let manifest_path = &config.book_resolved.manifest_path;
    let manifest = Manifest::load(manifest_path)?;

    output.info(&format!(
        "Manifest: {} ({} chapters)",
        manifest_path.display(),
        manifest.len()
    ));
    if !config.build_resolved.strict_links {
        output.warning("Links to unknown chapters are reported as warnings only");
    }

    Ok(SiteBuilder::new(manifest).with_options(BuildOptions {
        strict_links: config.build_resolved.strict_links,
        compare_code: config.html.compare_code,
        site_title: config.html.site_title.clone(),
        jobs: config.build_resolved.jobs,
    }))
}
