//! Synthetic caches for tests.

use crate::archive::{Archive, FileEntry};
use crate::backend::{DiskStorage, MockStorage};
use crate::error::{ErrorKind, Result};
use crate::group;
use crate::index::{Index, IndexType};
use modeldump_codec::{Compression, Container};
use std::collections::BTreeMap;
use std::path::Path;

enum Entry {
    Files(BTreeMap<u32, Vec<u8>>),
    /// Stored verbatim with the given CRC and a single file.
    Raw { bytes: Vec<u8>, crc: u32 },
}

/// Builds a cache from plain file contents: containers, multi-file packing
/// and reference tables are generated.
pub struct CacheBuilder {
    compression: Compression,
    protocol: u8,
    archives: BTreeMap<(u8, u32), Entry>,
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self {
            compression: Compression::Gzip,
            protocol: 6,
            archives: BTreeMap::new(),
        }
    }
}

impl CacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    /// Add a file to an archive. Archives with several files are packed.
    pub fn file(mut self, index: impl Into<u8>, archive: u32, file: u32, contents: Vec<u8>) -> Self {
        let key = (index.into(), archive);
        if let Some(Entry::Files(files)) = self.archives.get_mut(&key) {
            files.insert(file, contents);
        } else {
            self.archives.insert(key, Entry::Files(BTreeMap::from([(file, contents)])));
        }
        self
    }

    /// Add a model: a single-file archive in the models index.
    pub fn model(self, id: u32, contents: Vec<u8>) -> Self {
        self.file(IndexType::Models, id, 0, contents)
    }

    /// Add an archive whose stored bytes and recorded CRC are taken as given.
    pub fn raw_archive(mut self, index: impl Into<u8>, archive: u32, bytes: Vec<u8>, crc: u32) -> Self {
        self.archives.insert((index.into(), archive), Entry::Raw { bytes, crc });
        self
    }

    /// Encode every archive and reference table, keyed by `(index, archive)`.
    pub fn archives(&self) -> Result<Vec<((u8, u32), Vec<u8>)>> {
        let mut output = Vec::new();
        let mut tables: BTreeMap<u8, Index> = BTreeMap::new();
        for ((index, id), entry) in &self.archives {
            let mut archive = Archive::new(*index, *id);
            archive.revision = 1;
            let bytes = match entry {
                Entry::Files(files) => {
                    archive.files = files.keys().map(|id| FileEntry { id: *id, name_hash: 0 }).collect();
                    let contents: Vec<Vec<u8>> = files.values().cloned().collect();
                    let packed = group::pack(&contents)?;
                    let (bytes, crc) =
                        Container::encode(self.compression, &packed, Some(1)).map_err(ErrorKind::codec)?;
                    archive.crc = crc;
                    bytes
                },
                Entry::Raw { bytes, crc } => {
                    archive.files = vec![FileEntry { id: 0, name_hash: 0 }];
                    archive.crc = *crc;
                    bytes.clone()
                },
            };
            let table = tables.entry(*index).or_insert_with(|| Index::new(*index));
            table.protocol = self.protocol;
            table.archives.push(archive);
            output.push(((*index, *id), bytes));
        }
        for (index, table) in tables {
            let (bytes, _) = Container::encode(self.compression, &table.encode()?, None).map_err(ErrorKind::codec)?;
            output.push(((IndexType::Reference.id(), u32::from(index)), bytes));
        }
        Ok(output)
    }

    pub fn build_mock(&self) -> Result<MockStorage> {
        Ok(MockStorage::with_archives(self.archives()?))
    }

    /// Write the cache to a directory in the on-disk layout.
    pub fn write_to(&self, root: impl AsRef<Path>) -> Result<DiskStorage> {
        let mut storage = DiskStorage::create(root)?;
        for ((index, archive), bytes) in self.archives()? {
            storage.put(index, archive, &bytes)?;
        }
        Ok(storage)
    }
}
