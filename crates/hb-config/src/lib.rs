//! Configuration management for hb.
//!
//! Parses `hb.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `book.manifest`
//! - `build.output_dir`
//! - `html.site_title`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override manifest path.
    pub manifest_path: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override strict link checking.
    pub strict_links: Option<bool>,
    /// Override worker thread count.
    pub jobs: Option<usize>,
    /// Override dual-language code panels.
    pub compare_code: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "hb.toml";

/// Default manifest filename, relative to the config directory.
const DEFAULT_MANIFEST: &str = "book.yaml";

/// Default output directory, relative to the config directory.
const DEFAULT_OUTPUT_DIR: &str = "site";

/// Upper bound for `build.jobs`.
const MAX_JOBS: usize = 256;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Book configuration (paths are relative strings from TOML).
    book: BookConfigRaw,
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,
    /// HTML output configuration.
    pub html: HtmlConfig,

    /// Resolved book configuration (set after loading).
    #[serde(skip)]
    pub book_resolved: BookConfig,
    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw book configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BookConfigRaw {
    manifest: Option<String>,
}

/// Resolved book configuration with absolute paths.
#[derive(Debug, Default)]
pub struct BookConfig {
    /// Path to the chapter manifest.
    pub manifest_path: PathBuf,
}

/// Raw build configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    output_dir: Option<String>,
    strict_links: Option<bool>,
    jobs: Option<usize>,
}

/// Resolved build configuration.
#[derive(Debug)]
pub struct BuildConfig {
    /// Directory the rendered site is written to.
    pub output_dir: PathBuf,
    /// Treat links to unknown chapters as fatal.
    pub strict_links: bool,
    /// Worker threads for per-chapter processing (0 = rayon default).
    pub jobs: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            strict_links: true,
            jobs: 0,
        }
    }
}

/// HTML output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Wrap consecutive code blocks in different languages into a comparison panel.
    pub compare_code: bool,
    /// Site title shown in the sidebar and on the contents page.
    ///
    /// Overrides the manifest title when set.
    pub site_title: Option<String>,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            compare_code: true,
            site_title: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`build.output_dir`").
        field: String,
        /// Error message (e.g., "${`HB_OUT`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `hb.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(manifest_path) = &settings.manifest_path {
            self.book_resolved.manifest_path.clone_from(manifest_path);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(strict_links) = settings.strict_links {
            self.build_resolved.strict_links = strict_links;
        }
        if let Some(jobs) = settings.jobs {
            self.build_resolved.jobs = jobs;
        }
        if let Some(compare_code) = settings.compare_code {
            self.html.compare_code = compare_code;
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.book_resolved.manifest_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "book.manifest cannot be empty".to_owned(),
            ));
        }
        if self.build_resolved.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "build.output_dir cannot be empty".to_owned(),
            ));
        }
        if self.build_resolved.jobs > MAX_JOBS {
            return Err(ConfigError::Validation(format!(
                "build.jobs cannot exceed {MAX_JOBS}"
            )));
        }
        if let Some(title) = &self.html.site_title
            && title.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "html.site_title cannot be blank".to_owned(),
            ));
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            book: BookConfigRaw::default(),
            build: BuildConfigRaw::default(),
            html: HtmlConfig::default(),
            book_resolved: BookConfig {
                manifest_path: base.join(DEFAULT_MANIFEST),
            },
            build_resolved: BuildConfig {
                output_dir: base.join(DEFAULT_OUTPUT_DIR),
                ..BuildConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref manifest) = self.book.manifest {
            self.book.manifest = Some(expand::expand_env(manifest, "book.manifest")?);
        }
        if let Some(ref output_dir) = self.build.output_dir {
            self.build.output_dir = Some(expand::expand_env(output_dir, "build.output_dir")?);
        }
        if let Some(ref title) = self.html.site_title {
            self.html.site_title = Some(expand::expand_env(title, "html.site_title")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.book_resolved = BookConfig {
            manifest_path: resolve(self.book.manifest.as_deref(), DEFAULT_MANIFEST),
        };
        self.build_resolved = BuildConfig {
            output_dir: resolve(self.build.output_dir.as_deref(), DEFAULT_OUTPUT_DIR),
            strict_links: self.build.strict_links.unwrap_or(true),
            jobs: self.build.jobs.unwrap_or(0),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(
            config.book_resolved.manifest_path,
            PathBuf::from("/test/book.yaml")
        );
        assert_eq!(config.build_resolved.output_dir, PathBuf::from("/test/site"));
        assert!(config.build_resolved.strict_links);
        assert_eq!(config.build_resolved.jobs, 0);
        assert!(config.html.compare_code);
        assert!(config.html.site_title.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.html.compare_code);
        assert!(config.book.manifest.is_none());
    }

    #[test]
    fn test_parse_html_config() {
        let toml = r#"
[html]
compare_code = false
site_title = "Python Mastery Handbook"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.html.compare_code);
        assert_eq!(
            config.html.site_title.as_deref(),
            Some("Python Mastery Handbook")
        );
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[book]
manifest = "content/toc.yaml"

[build]
output_dir = "public"
strict_links = false
jobs = 4
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.book_resolved.manifest_path,
            PathBuf::from("/project/content/toc.yaml")
        );
        assert_eq!(
            config.build_resolved.output_dir,
            PathBuf::from("/project/public")
        );
        assert!(!config.build_resolved.strict_links);
        assert_eq!(config.build_resolved.jobs, 4);
    }

    #[test]
    fn test_resolve_paths_defaults() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.book_resolved.manifest_path,
            PathBuf::from("/project/book.yaml")
        );
        assert_eq!(
            config.build_resolved.output_dir,
            PathBuf::from("/project/site")
        );
        assert!(config.build_resolved.strict_links);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hb.toml");
        std::fs::write(&path, "[build]\noutput_dir = \"out\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.build_resolved.output_dir, dir.path().join("out"));
        assert_eq!(config.book_resolved.manifest_path, dir.path().join("book.yaml"));
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/hb.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hb.toml");
        std::fs::write(&path, "[build\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_expands_env_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hb.toml");
        std::fs::write(
            &path,
            "[build]\noutput_dir = \"${HB_TEST_SURELY_UNSET_OUT:-dist}\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.build_resolved.output_dir, dir.path().join("dist"));
    }

    #[test]
    fn test_cli_settings_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hb.toml");
        std::fs::write(&path, "[build]\nstrict_links = true\n").unwrap();

        let settings = CliSettings {
            manifest_path: Some(PathBuf::from("/elsewhere/book.yaml")),
            output_dir: Some(PathBuf::from("/tmp/out")),
            strict_links: Some(false),
            jobs: Some(2),
            compare_code: Some(false),
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(
            config.book_resolved.manifest_path,
            PathBuf::from("/elsewhere/book.yaml")
        );
        assert_eq!(config.build_resolved.output_dir, PathBuf::from("/tmp/out"));
        assert!(!config.build_resolved.strict_links);
        assert_eq!(config.build_resolved.jobs, 2);
        assert!(!config.html.compare_code);
    }

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_jobs_too_high() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.build_resolved.jobs = 1000;
        assert_validation_error(&config, &["build.jobs", "256"]);
    }

    #[test]
    fn test_validate_empty_manifest() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.book_resolved.manifest_path = PathBuf::new();
        assert_validation_error(&config, &["book.manifest", "empty"]);
    }

    #[test]
    fn test_validate_blank_site_title() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.html.site_title = Some("   ".to_owned());
        assert_validation_error(&config, &["html.site_title"]);
    }
}
