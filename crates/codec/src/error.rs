//! Codec Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A codec error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Data is corrupt or malformed. Don't retry with the same input. Used for reading/decoding.
    #[display("invalid or corrupted data")]
    InvalidData,
    /// A read ran past the end of the buffer.
    #[display("unexpected end of data: needed {needed} bytes at offset {offset}, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// A length field disagrees with the data actually present.
    #[display("length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    /// The requested format is not supported.
    #[display("unsupported format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// An I/O operation failed. Used for writing/encoding.
    #[display("I/O error")]
    Io,
}
