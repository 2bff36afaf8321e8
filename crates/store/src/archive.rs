use crate::error::{ErrorKind, Result};
use crate::group;
use modeldump_codec::Container;
use tracing::instrument;

/// A file entry inside an archive, as listed by the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEntry {
    pub id: u32,
    pub name_hash: i32,
}

/// A file unpacked from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub id: u32,
    pub contents: Vec<u8>,
}

/// Reference table metadata for one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// Index the archive belongs to.
    pub index: u8,
    pub id: u32,
    pub name_hash: i32,
    pub crc: u32,
    pub revision: i32,
    pub files: Vec<FileEntry>,
}

impl Archive {
    pub fn new(index: u8, id: u32) -> Self {
        Self {
            index,
            id,
            name_hash: 0,
            crc: 0,
            revision: 0,
            files: Vec::new(),
        }
    }

    /// Decode the stored container and return its decompressed payload.
    ///
    /// A CRC that disagrees with the reference table is an error. A revision
    /// that disagrees is only logged: caches in the wild carry stale revision
    /// trailers.
    #[instrument(level = "debug", skip(self, raw), fields(index = self.index, archive = self.id, size = raw.len()))]
    pub fn decompress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let container = Container::decode(raw).map_err(ErrorKind::codec)?;
        if container.crc != self.crc {
            exn::bail!(ErrorKind::ChecksumMismatch {
                index: self.index,
                archive: self.id,
                expected: self.crc,
                actual: container.crc,
            });
        }
        if let Some(revision) = container.revision
            && i32::from(revision) != self.revision & 0xFFFF
        {
            tracing::warn!(
                index = self.index,
                archive = self.id,
                expected = self.revision,
                found = revision,
                "Archive revision mismatch"
            );
        }
        Ok(container.data)
    }

    /// Split a decompressed payload into the files listed for this archive.
    pub fn files(&self, data: &[u8]) -> Result<Vec<ArchiveFile>> {
        let contents = group::unpack(data, self.files.len())?;
        Ok(self
            .files
            .iter()
            .zip(contents)
            .map(|(entry, contents)| ArchiveFile { id: entry.id, contents })
            .collect())
    }
}
