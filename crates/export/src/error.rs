//! Export Error Types

use derive_more::{Display, Error};

/// An export error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Writing the geometry (`.obj`) output failed.
    #[display("failed to write geometry")]
    Geometry,
    /// Writing the material (`.mtl`) output failed.
    #[display("failed to write materials")]
    Materials,
}
