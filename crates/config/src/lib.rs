//! Run configuration.
//!
//! Settings are layered with [`figment`], later sources winning:
//!
//! 1. defaults (everything off, default cache location)
//! 2. a configuration file: the one given explicitly, otherwise
//!    `<config dir>/modeldump/config.toml` when it exists. TOML, YAML and
//!    JSON are recognised by extension.
//! 3. `MODELDUMP_*` environment variables (`MODELDUMP_CACHE`,
//!    `MODELDUMP_CONVERT`, `MODELDUMP_KEEP_GOING`)
//! 4. command-line flags, passed in as [`Settings`] overrides
//!
//! The output directory only ever comes from the command line.

pub mod error;
mod locate;

pub use crate::locate::{CacheRoot, SENTINEL, default_cache, locate, validate};

use crate::error::{ErrorKind, Result};
use directories::BaseDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "MODELDUMP_";
const APP_DIR: &str = "modeldump";
const CONFIG_FILE: &str = "config.toml";

/// Everything a run needs. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Cache directory; `None` selects the default location.
    pub cache: Option<PathBuf>,
    /// Output directory for raw and converted models.
    pub models: PathBuf,
    /// Convert every model to OBJ/MTL after dumping it.
    pub convert: bool,
    /// Log and skip failing archives instead of stopping at the first one.
    pub keep_going: bool,
}

impl Config {
    pub fn new(models: impl Into<PathBuf>) -> Self {
        Self {
            cache: None,
            models: models.into(),
            convert: false,
            keep_going: false,
        }
    }

    /// Merge defaults, `file` (or the default file), the environment and
    /// `overrides`.
    pub fn load(file: Option<&Path>, overrides: Settings, models: impl Into<PathBuf>) -> Result<Self> {
        let file = file.map(Path::to_path_buf).or_else(default_file);
        let settings = Settings::figment(file.as_deref())?
            .merge(Serialized::defaults(overrides))
            .extract::<Settings>()
            .or_raise(|| ErrorKind::Invalid)?;
        Ok(settings.into_config(models))
    }
}

/// The configurable part of [`Config`].
///
/// Unset fields are skipped when used as overrides, so a flag left off on
/// the command line does not clear a value from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<PathBuf>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub convert: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub keep_going: bool,
}

impl Settings {
    /// Defaults, then `file`, then the environment.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(file) = file {
            if !file.is_file() {
                exn::bail!(ErrorKind::MissingFile(file.to_path_buf()));
            }
            tracing::debug!(file = %file.display(), "Reading configuration file");
            figment = match file.extension().and_then(|extension| extension.to_str()) {
                Some("toml") => figment.merge(Toml::file_exact(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(file)),
                Some("json") => figment.merge(Json::file_exact(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn into_config(self, models: impl Into<PathBuf>) -> Config {
        Config {
            cache: self.cache,
            models: models.into(),
            convert: self.convert,
            keep_going: self.keep_going,
        }
    }
}

/// `<config dir>/modeldump/config.toml`, if it exists.
fn default_file() -> Option<PathBuf> {
    let file = BaseDirs::new()?.config_dir().join(APP_DIR).join(CONFIG_FILE);
    file.is_file().then_some(file)
}
