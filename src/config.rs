//! Application configuration management.
//!
//! Settings are merged from several layers, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config PATH`, or `config.toml` in the platform config dir)
//! 3. environment variables prefixed `DUPESWEEP_` (`__` separates nested keys)
//! 4. command-line flags
//!
//! ```toml
//! skip_dirs = ["$RECYCLE.BIN", "System Volume Information", "themes", "Backups"]
//! io_threads = 8
//! report_path = "duplicate_log.txt"
//! follow_symlinks = false
//! mmap_threshold = 67108864
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::output::report::DEFAULT_REPORT_NAME;
use crate::scanner::hasher::DEFAULT_MMAP_THRESHOLD;
use crate::scanner::{SkipSet, WalkerConfig, DEFAULT_SKIP_DIRS};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPESWEEP_";

/// Errors while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or had the wrong shape.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] figment::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
    /// Hashing pool size; derived from the CPU count when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_threads: Option<usize>,
    /// Plain-text report location.
    pub report_path: PathBuf,
    /// Follow symbolic links during the walk.
    pub follow_symlinks: bool,
    /// Files at least this many bytes are hashed through a memory map.
    pub mmap_threshold: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| (*s).to_string()).collect(),
            io_threads: None,
            report_path: PathBuf::from(DEFAULT_REPORT_NAME),
            follow_symlinks: false,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// `explicit` must exist when given; the platform default file is used
    /// only if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the explicit file is missing or any layer is malformed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };
        Self::figment(file.as_deref()).extract().map_err(ConfigError::from)
    }

    /// The layered figment, exposed so tests can inspect individual layers.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            log::debug!("Loading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Platform-specific default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupesweep").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line overrides.
    ///
    /// `--no-default-skips` discards the configured names before `--skip`
    /// names are added.
    #[must_use]
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if cli.no_default_skips {
            self.skip_dirs.clear();
        }
        self.skip_dirs.extend(cli.skip.iter().cloned());
        if let Some(threads) = cli.io_threads {
            self.io_threads = Some(threads as usize);
        }
        if let Some(threshold) = cli.mmap_threshold {
            self.mmap_threshold = threshold;
        }
        if let Some(ref report) = cli.report {
            self.report_path = report.clone();
        }
        self.follow_symlinks |= cli.follow_symlinks;
        self
    }

    /// The configured skip names as a matcher.
    #[must_use]
    pub fn skip_set(&self) -> SkipSet {
        SkipSet::new(&self.skip_dirs)
    }

    /// Walker settings derived from this configuration.
    ///
    /// The report file is excluded so a previous run's report is never
    /// scanned as a candidate.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.skip_set(), self.follow_symlinks)
            .with_excluded_file(&self.report_path)
    }

    /// Render as TOML for `--print-config`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
