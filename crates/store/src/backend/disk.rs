//! On-disk cache storage.
//!
//! Archive bytes live in `main_file_cache.dat2` as chains of 520-byte
//! sectors. Each `main_file_cache.idx<N>` file maps archive ids of index `N`
//! to the length and first sector of their chain, six bytes per archive.

use crate::backend::Storage;
use crate::error::{ErrorKind, Result};
use crate::index::IndexType;
use modeldump_codec::buffer::{Reader, Writer};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::instrument;

pub const DATA_FILE: &str = "main_file_cache.dat2";
pub const INDEX_FILE_PREFIX: &str = "main_file_cache.idx";

const SECTOR_SIZE: usize = 520;
const INDEX_ENTRY_SIZE: u64 = 6;
/// Archive ids above this need the wide sector header.
const NARROW_ARCHIVE_MAX: u32 = 0xFFFF;

struct CacheFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl CacheFile {
    fn open(path: PathBuf, options: &OpenOptions) -> Result<Self> {
        let file = options.open(&path).map_err(|e| DiskStorage::map_io_error(e, &path))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, File>> {
        self.file
            .lock()
            .map_err(|_| exn::Exn::from(ErrorKind::BackendError(format!("lock poisoned: {}", self.path.display()))))
    }

    fn len(&self, file: &File) -> Result<u64> {
        Ok(file.metadata().map_err(|e| DiskStorage::map_io_error(e, &self.path))?.len())
    }
}

/// Sector layout for one archive.
#[derive(Clone, Copy)]
struct SectorLayout {
    header: usize,
    block: usize,
}

impl SectorLayout {
    fn for_archive(archive: u32) -> Self {
        let header = if archive > NARROW_ARCHIVE_MAX { 10 } else { 8 };
        Self {
            header,
            block: SECTOR_SIZE - header,
        }
    }
}

/// Disk-backed cache storage.
///
/// # Examples
///
/// ```no_run
/// use modeldump_store::backend::{DiskStorage, Storage};
///
/// # fn example() -> modeldump_store::error::Result<()> {
/// let storage = DiskStorage::open("/path/to/cache")?;
/// for index in storage.indexes()? {
///     println!("index {index}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct DiskStorage {
    name: String,
    root: PathBuf,
    data: CacheFile,
    indexes: BTreeMap<u8, CacheFile>,
}

impl DiskStorage {
    /// Open an existing cache directory read-only.
    #[instrument(level = "debug", skip_all, fields(root = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut read = OpenOptions::new();
        read.read(true);
        let data = CacheFile::open(root.join(DATA_FILE), &read)?;

        let mut indexes = BTreeMap::new();
        for entry in fs::read_dir(&root).map_err(|e| Self::map_io_error(e, &root))? {
            let entry = entry.map_err(|e| Self::map_io_error(e, &root))?;
            let Some(id) = Self::index_id(&entry.file_name().to_string_lossy()) else {
                continue;
            };
            if !entry.path().is_file() {
                continue;
            }
            indexes.insert(id, CacheFile::open(entry.path(), &read)?);
        }
        tracing::debug!(indexes = indexes.len(), "Opened disk cache");

        Ok(Self {
            name: "disk".to_string(),
            root,
            data,
            indexes,
        })
    }

    /// Create an empty cache directory, truncating any existing data file.
    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| Self::map_io_error(e, &root))?;
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(true);
        let data = CacheFile::open(root.join(DATA_FILE), &options)?;
        // Sector 0 is never allocated.
        data.lock()?
            .write_all(&[0u8; SECTOR_SIZE])
            .map_err(|e| Self::map_io_error(e, &data.path))?;
        Ok(Self {
            name: "disk".to_string(),
            root,
            data,
            indexes: BTreeMap::new(),
        })
    }

    /// Append an archive to the data file and point its index entry at it.
    #[instrument(level = "debug", skip(self, data), fields(size = data.len()))]
    pub fn put(&mut self, index: u8, archive: u32, data: &[u8]) -> Result<()> {
        let size = u32::try_from(data.len())
            .ok()
            .filter(|size| *size <= 0xFF_FFFF)
            .ok_or_else(|| ErrorKind::Corrupt(format!("archive {archive} too large: {} bytes", data.len())))?;
        let layout = SectorLayout::for_archive(archive);

        let first = {
            let mut file = self.data.lock()?;
            let len = self.data.len(&file)?;
            let first = len.div_ceil(SECTOR_SIZE as u64).max(1);
            let mut sector = first;
            let chunks = data.chunks(layout.block).count();
            for (part, chunk) in data.chunks(layout.block).enumerate() {
                let next = if part + 1 == chunks { 0 } else { sector + 1 };
                let mut writer = Writer::with_capacity(SECTOR_SIZE);
                if archive > NARROW_ARCHIVE_MAX {
                    writer.put_u32(archive);
                } else {
                    writer.put_u16(archive as u16);
                }
                writer
                    .put_u16(part as u16)
                    .put_u24(next as u32)
                    .put_u8(index)
                    .put_bytes(chunk)
                    .put_bytes(&vec![0u8; layout.block - chunk.len()]);
                file.seek(SeekFrom::Start(sector * SECTOR_SIZE as u64))
                    .and_then(|_| file.write_all(writer.as_slice()))
                    .map_err(|e| Self::map_io_error(e, &self.data.path))?;
                sector += 1;
            }
            first
        };

        if !self.indexes.contains_key(&index) {
            let mut options = OpenOptions::new();
            options.read(true).write(true).create(true).truncate(false);
            let path = self.root.join(format!("{INDEX_FILE_PREFIX}{index}"));
            self.indexes.insert(index, CacheFile::open(path, &options)?);
        }
        let Some(index_file) = self.indexes.get(&index) else {
            exn::bail!(ErrorKind::MissingIndex(index));
        };
        let mut entry = Writer::with_capacity(INDEX_ENTRY_SIZE as usize);
        entry.put_u24(size).put_u24(first as u32);
        let mut file = index_file.lock()?;
        file.seek(SeekFrom::Start(u64::from(archive) * INDEX_ENTRY_SIZE))
            .and_then(|_| file.write_all(entry.as_slice()))
            .map_err(|e| Self::map_io_error(e, &index_file.path))?;
        Ok(())
    }

    /// Parse `main_file_cache.idx<N>`.
    fn index_id(file_name: &str) -> Option<u8> {
        file_name.strip_prefix(INDEX_FILE_PREFIX)?.parse().ok()
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Returns `(size, first sector)`, or `None` when the index has no entry.
    fn entry(&self, index: u8, archive: u32) -> Result<Option<(usize, u64)>> {
        let Some(index_file) = self.indexes.get(&index) else {
            exn::bail!(ErrorKind::MissingIndex(index));
        };
        let mut file = index_file.lock()?;
        let offset = u64::from(archive) * INDEX_ENTRY_SIZE;
        if index_file.len(&file)? < offset + INDEX_ENTRY_SIZE {
            return Ok(None);
        }
        let mut buffer = [0u8; INDEX_ENTRY_SIZE as usize];
        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.read_exact(&mut buffer))
            .map_err(|e| Self::map_io_error(e, &index_file.path))?;
        let mut reader = Reader::new(&buffer);
        let size = reader.u24().map_err(ErrorKind::codec)? as usize;
        let sector = u64::from(reader.u24().map_err(ErrorKind::codec)?);
        Ok(Some((size, sector)))
    }
}

impl Storage for DiskStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn indexes(&self) -> Result<Vec<u8>> {
        Ok(self
            .indexes
            .keys()
            .copied()
            .filter(|id| *id != IndexType::Reference.id())
            .collect())
    }

    #[instrument(level = "trace", skip(self), fields(storage = %self.name))]
    fn load_archive(&self, index: u8, archive: u32) -> Result<Vec<u8>> {
        let missing = || exn::Exn::from(ErrorKind::MissingArchive { index, archive });
        let (size, mut sector) = self.entry(index, archive)?.ok_or_else(missing)?;

        let mut file = self.data.lock()?;
        let sectors = self.data.len(&file)?.div_ceil(SECTOR_SIZE as u64);
        if sector == 0 || sector >= sectors {
            return Err(missing());
        }

        let layout = SectorLayout::for_archive(archive);
        let mut buffer = [0u8; SECTOR_SIZE];
        let mut output = Vec::with_capacity(size);
        let mut part = 0u16;
        while output.len() < size {
            if sector == 0 {
                exn::bail!(ErrorKind::Corrupt(format!(
                    "sector chain of archive {archive} in index {index} ends after {} of {size} bytes",
                    output.len()
                )));
            }
            let chunk = (size - output.len()).min(layout.block);
            let block = &mut buffer[..layout.header + chunk];
            file.seek(SeekFrom::Start(sector * SECTOR_SIZE as u64))
                .and_then(|_| file.read_exact(block))
                .map_err(|e| Self::map_io_error(e, &self.data.path))?;

            let mut header = Reader::new(block);
            let found_archive = if archive > NARROW_ARCHIVE_MAX {
                header.u32()
            } else {
                header.u16().map(u32::from)
            }
            .map_err(ErrorKind::codec)?;
            let found_part = header.u16().map_err(ErrorKind::codec)?;
            let next = u64::from(header.u24().map_err(ErrorKind::codec)?);
            let found_index = header.u8().map_err(ErrorKind::codec)?;
            if found_archive != archive || found_part != part || found_index != index {
                exn::bail!(ErrorKind::Corrupt(format!(
                    "sector {sector} belongs to archive {found_archive} part {found_part} of index {found_index}, \
                     expected archive {archive} part {part} of index {index}"
                )));
            }

            output.extend_from_slice(&block[layout.header..]);
            part = part.wrapping_add(1);
            sector = next;
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[rstest]
    #[case(7, 1, 10)]
    #[case(7, 2, 512)]
    #[case(7, 3, 513)]
    #[case(255, 7, 2000)]
    #[case(7, 70_000, 1500)]
    fn put_then_load(#[case] index: u8, #[case] archive: u32, #[case] len: usize) {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut storage = DiskStorage::create(temp_dir.path()).unwrap();
        storage.put(index, archive, &payload(len)).unwrap();
        assert_eq!(storage.load_archive(index, archive).unwrap(), payload(len));

        let reopened = DiskStorage::open(temp_dir.path()).unwrap();
        assert_eq!(reopened.load_archive(index, archive).unwrap(), payload(len));
    }

    #[test]
    fn archives_do_not_overlap() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut storage = DiskStorage::create(temp_dir.path()).unwrap();
        storage.put(7, 0, &payload(600)).unwrap();
        storage.put(7, 1, b"second").unwrap();
        storage.put(9, 0, b"texture").unwrap();
        assert_eq!(storage.load_archive(7, 0).unwrap(), payload(600));
        assert_eq!(storage.load_archive(7, 1).unwrap(), b"second");
        assert_eq!(storage.load_archive(9, 0).unwrap(), b"texture");
    }

    #[test]
    fn lists_indexes_without_reference() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut storage = DiskStorage::create(temp_dir.path()).unwrap();
        storage.put(255, 9, b"table").unwrap();
        storage.put(9, 0, b"a").unwrap();
        storage.put(7, 0, b"b").unwrap();
        assert_eq!(storage.indexes().unwrap(), vec![7, 9]);
        assert_eq!(DiskStorage::open(temp_dir.path()).unwrap().indexes().unwrap(), vec![7, 9]);
    }

    #[test]
    fn missing_archive() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut storage = DiskStorage::create(temp_dir.path()).unwrap();
        storage.put(7, 5, b"five").unwrap();
        // Entry 2 is a zeroed hole, entry 6 is past the end of the index file.
        for archive in [2, 6] {
            let err = storage.load_archive(7, archive).unwrap_err();
            assert!(matches!(&*err, ErrorKind::MissingArchive { index: 7, archive: a } if *a == archive));
        }
        let err = storage.load_archive(3, 0).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingIndex(3)));
    }

    #[test]
    fn first_sector_past_end() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut storage = DiskStorage::create(temp_dir.path()).unwrap();
        storage.put(7, 1, b"model").unwrap();
        drop(storage);

        // Sectors 0 and 1 exist; point archive 1 at sector 2.
        let path = temp_dir.path().join(format!("{INDEX_FILE_PREFIX}7"));
        let mut entries = fs::read(&path).unwrap();
        entries[9..12].copy_from_slice(&[0x00, 0x00, 0x02]);
        fs::write(&path, entries).unwrap();

        let storage = DiskStorage::open(temp_dir.path()).unwrap();
        let err = storage.load_archive(7, 1).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingArchive { index: 7, archive: 1 }));
    }

    #[test]
    fn corrupt_sector_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut storage = DiskStorage::create(temp_dir.path()).unwrap();
        storage.put(7, 1, b"model").unwrap();
        drop(storage);

        // Rewrite the owning archive id of sector 1.
        let path = temp_dir.path().join(DATA_FILE);
        let mut data = fs::read(&path).unwrap();
        data[SECTOR_SIZE..SECTOR_SIZE + 2].copy_from_slice(&[0x00, 0x02]);
        fs::write(&path, data).unwrap();

        let storage = DiskStorage::open(temp_dir.path()).unwrap();
        let err = storage.load_archive(7, 1).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Corrupt(_)));
    }

    #[test]
    fn open_without_data_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = DiskStorage::open(temp_dir.path()).err().unwrap();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[rstest]
    #[case("main_file_cache.idx7", Some(7))]
    #[case("main_file_cache.idx255", Some(255))]
    #[case("main_file_cache.idx256", None)]
    #[case("main_file_cache.dat2", None)]
    #[case("main_file_cache.idx", None)]
    fn parses_index_file_names(#[case] name: &str, #[case] expected: Option<u8>) {
        assert_eq!(DiskStorage::index_id(name), expected);
    }
}
