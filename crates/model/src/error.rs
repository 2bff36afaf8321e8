//! Model Error Types

use derive_more::{Display, Error};
use modeldump_codec::error::{Error as CodecError, ErrorKind as CodecErrorKind};

/// A model error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Section lengths or references that cannot describe a valid model.
    #[display("invalid model format: {_0}")]
    InvalidFormat(#[error(not(source))] String),
    /// A face refers to a vertex the model does not have.
    #[display("face {face} references vertex {vertex}, model has {vertices} vertices")]
    VertexOutOfRange { face: usize, vertex: i32, vertices: usize },
    /// Reading a section failed (usually truncated data).
    #[display("model data error: {_0}")]
    Codec(CodecErrorKind),
    /// A texture definition could not be decoded.
    #[display("invalid texture definition {_0}")]
    InvalidTexture(#[error(not(source))] u32),
    /// The texture index could not be read from the store.
    #[display("textures unavailable")]
    Textures,
}

impl ErrorKind {
    /// Convert a codec error, keeping its frame in the error tree.
    #[track_caller]
    pub fn codec(err: CodecError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Codec(inner))
    }
}
