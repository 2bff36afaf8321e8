//! Read access to a game cache.
//!
//! A cache is a set of numbered indexes. Each index holds archives, and each
//! archive is a compressed container that may pack several files. The
//! reference index (255) describes every other index: which archives exist,
//! their CRCs and revisions, and the ids of the files inside them.
//!
//! [`Store`] ties a [`Storage`](backend::Storage) to those reference tables.

mod archive;
pub mod backend;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod fixture;
pub mod group;
mod index;
mod store;

pub use crate::archive::{Archive, ArchiveFile, FileEntry};
pub use crate::backend::Storage;
#[cfg(any(test, feature = "mock"))]
pub use crate::fixture::CacheBuilder;
pub use crate::index::{Index, IndexType};
pub use crate::store::Store;
use std::sync::Arc;

pub type StorageHandle = Arc<dyn Storage + Send + Sync>;
