//! Compression and container framing for cache archives.
//!
//! Every archive in the cache is stored inside a small container that
//! declares how its payload was compressed. This crate provides:
//!
//! - **Codecs** behind a unified [`Compression`] enum
//!   ([`Compression::compress`], [`Compression::decompress`]).
//! - **Container framing** ([`Container::decode`], [`Container::encode`]),
//!   including the CRC-32 that reference tables record for each archive.
//! - **Byte buffers** ([`buffer::Reader`], [`buffer::Writer`]) with the
//!   big-endian integer and "smart" encodings used throughout the cache.
//!
//! Bzip2 and Gzip are the only compressed formats the cache uses.

pub mod buffer;
mod construct;
mod container;
pub mod error;
mod ops;
mod util;

pub use crate::container::Container;

/// A supported compression format.
///
/// The discriminant is the id written in the first byte of a container.
/// Defaults to [`None`](Self::None) (uncompressed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed
    #[default]
    None = 0,
    /// Bzip2 compression (headerless inside containers)
    Bzip2 = 1,
    /// Gzip compression
    Gzip = 2,
}
