//! Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use modeldump_codec::error::{Error as CodecError, ErrorKind as CodecErrorKind};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File does not exist
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// The storage has no reference table for this index.
    #[display("index {_0} not found")]
    MissingIndex(#[error(not(source))] u8),
    /// The index file has no entry for this archive.
    #[display("archive {archive} not found in index {index}")]
    MissingArchive { index: u8, archive: u32 },
    /// Sector chain or table structure does not match what was expected.
    #[display("corrupt cache: {_0}")]
    Corrupt(#[error(not(source))] String),
    /// Reference table protocol outside the supported range.
    #[display("unsupported reference table protocol {_0}")]
    UnsupportedProtocol(#[error(not(source))] u8),
    /// Reference table flags this reader does not understand.
    #[display("unsupported reference table flags {_0:#04x}")]
    UnsupportedFlags(#[error(not(source))] u8),
    /// Container CRC differs from the one recorded in the reference table.
    #[display("checksum mismatch for archive {archive} in index {index}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        index: u8,
        archive: u32,
        expected: u32,
        actual: u32,
    },
    /// Container decoding or decompression error
    #[display("codec error: {_0}")]
    Codec(CodecErrorKind),
    /// Backend-specific error
    #[display("backend error: {_0}")]
    BackendError(#[error(not(source))] String),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}
impl ErrorKind {
    /// Convert a codec error into a store error, keeping the codec crate's
    /// `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn codec(err: CodecError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Codec(inner))
    }
}
