//! Pipeline Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A pipeline error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The cache directory could not be located or does not look like a cache.
    #[display("invalid cache")]
    InvalidCache,
    /// Opening the cache or reading its reference tables failed.
    #[display("unable to load cache")]
    Store,
    /// The texture definitions needed for conversion could not be loaded.
    #[display("unable to load textures")]
    Textures,
    /// A model archive could not be loaded or decompressed.
    #[display("unable to read model archive {_0}")]
    Archive(#[error(not(source))] u32),
    #[display("unable to read {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    #[display("unable to write {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    /// A dumped model could not be decoded.
    #[display("unable to parse model {_0}")]
    Parse(#[error(not(source))] u32),
    #[display("unable to export model {_0}")]
    Export(#[error(not(source))] u32),
}
