//! Storage trait and implementations.
//!
//! A [`Storage`] hands out raw (still containerised) archive bytes by index
//! and archive id. Decoding reference tables and containers is left to
//! [`Store`](crate::Store), so every backend only has to know its own layout.

mod disk;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::disk::DiskStorage;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockStorage;
use crate::error::Result;

/// Unified interface for cache storage.
///
/// # Examples
///
/// ```no_run
/// use modeldump_store::backend::{DiskStorage, Storage};
/// use modeldump_store::IndexType;
///
/// # fn example() -> modeldump_store::error::Result<()> {
/// let storage = DiskStorage::open("/home/me/jagexcache/oldschool/LIVE")?;
/// let table = storage.load_archive(IndexType::Reference.id(), IndexType::Models.id().into())?;
/// println!("{}: {} byte reference table", storage.name(), table.len());
/// # Ok(())
/// # }
/// ```
pub trait Storage: Send + Sync {
    /// Name of the storage, for logging only.
    fn name(&self) -> &str;

    /// Ids of the indexes present, excluding the reference index, in
    /// ascending order.
    fn indexes(&self) -> Result<Vec<u8>>;

    /// Read the raw container bytes of an archive.
    ///
    /// Returns [`MissingArchive`](crate::error::ErrorKind::MissingArchive) if
    /// the index has no entry for it.
    fn load_archive(&self, index: u8, archive: u32) -> Result<Vec<u8>>;
}
