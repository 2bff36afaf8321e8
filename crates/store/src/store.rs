use crate::StorageHandle;
use crate::archive::{Archive, ArchiveFile};
use crate::backend::DiskStorage;
use crate::error::{ErrorKind, Result};
use crate::index::{Index, IndexType};
use modeldump_codec::Container;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

/// A cache: its storage plus the decoded reference table of every index.
pub struct Store {
    storage: StorageHandle,
    indexes: Vec<Index>,
}

impl Store {
    /// Wrap a storage without reading anything yet. Call [`load`](Self::load)
    /// before looking up indexes.
    pub fn new(storage: StorageHandle) -> Self {
        Self {
            storage,
            indexes: Vec::new(),
        }
    }

    /// Open a cache directory on disk and load its reference tables.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let storage = DiskStorage::open(root)?;
        let mut store = Self::new(Arc::new(storage));
        store.load()?;
        Ok(store)
    }

    /// (Re)load the reference table of every index the storage holds.
    #[instrument(level = "debug", skip(self), fields(storage = %self.storage.name(), indexes))]
    pub fn load(&mut self) -> Result<()> {
        let mut indexes = Vec::new();
        for id in self.storage.indexes()? {
            let raw = self
                .storage
                .load_archive(IndexType::Reference.id(), u32::from(id))
                .map_err(|err| err.raise(ErrorKind::MissingIndex(id)))?;
            let container = Container::decode(&raw).map_err(ErrorKind::codec)?;
            let index = Index::decode(id, &container.data)?;
            tracing::debug!(index = id, archives = index.archives.len(), "Loaded reference table");
            indexes.push(index);
        }
        tracing::Span::current().record("indexes", indexes.len());
        self.indexes = indexes;
        Ok(())
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn index(&self, index: IndexType) -> Result<&Index> {
        match self.indexes.iter().find(|candidate| candidate.id == index.id()) {
            Some(found) => Ok(found),
            None => exn::bail!(ErrorKind::MissingIndex(index.id())),
        }
    }

    pub fn storage(&self) -> &StorageHandle {
        &self.storage
    }

    /// Load and decompress an archive.
    pub fn load_archive(&self, archive: &Archive) -> Result<Vec<u8>> {
        let raw = self.storage.load_archive(archive.index, archive.id)?;
        archive.decompress(&raw)
    }

    /// Load, decompress and unpack the files of an archive.
    pub fn files(&self, archive: &Archive) -> Result<Vec<ArchiveFile>> {
        let data = self.load_archive(archive)?;
        archive.files(&data)
    }
}
