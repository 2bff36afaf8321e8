//! Config Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The cache path does not exist.
    #[display("cache not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The cache path exists but is not a directory.
    #[display("cache is not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    /// The directory holds no `main_file_cache.*` file.
    #[display("no main_file_cache file in {}", _0.display())]
    MissingSentinel(#[error(not(source))] PathBuf),
    /// No home directory to derive the default cache location from.
    #[display("unable to determine home directory")]
    NoHomeDirectory,
    /// Reading the cache directory failed.
    #[display("unable to read {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// Configuration file with an extension other than toml, yaml, yml or json.
    #[display("unsupported configuration format: {}", _0.display())]
    UnsupportedFormat(#[error(not(source))] PathBuf),
    /// An explicitly named configuration file does not exist.
    #[display("configuration file not found: {}", _0.display())]
    MissingFile(#[error(not(source))] PathBuf),
    /// Configuration sources could not be merged or deserialized.
    #[display("invalid configuration")]
    Invalid,
}
