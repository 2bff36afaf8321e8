//! Command-line arguments.

use clap::Parser;
use modeldump_config::{Config, Settings};
use std::path::PathBuf;

/// Dump model definitions from a cache, optionally converting them to OBJ/MTL.
#[derive(Debug, Parser)]
#[command(name = "modeldump", version, about)]
pub struct Args {
    /// Cache directory [default: ~/jagexcache/oldschool/LIVE]
    #[arg(short, long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// Output directory for dumped (and converted) models
    #[arg(long, value_name = "DIR", required = true)]
    pub models: PathBuf,

    /// Also write <id>.obj and <id>.mtl for every model
    #[arg(long)]
    pub convert: bool,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip models that fail instead of stopping; still exits non-zero
    #[arg(long)]
    pub keep_going: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Default log filter for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }

    /// Flags that override configuration files and the environment.
    pub fn overrides(&self) -> Settings {
        Settings {
            cache: self.cache.clone(),
            convert: self.convert,
            keep_going: self.keep_going,
        }
    }

    pub fn config(&self) -> modeldump_config::error::Result<Config> {
        Config::load(self.config.as_deref(), self.overrides(), &self.models)
    }
}
