//! Indexes and their reference tables.
//!
//! Each index is described by a reference table stored as an archive in the
//! reference index (255). The table lists every archive in the index with its
//! CRC, revision and the ids of the files packed inside it.

use crate::archive::{Archive, FileEntry};
use crate::error::{ErrorKind, Result};
use modeldump_codec::buffer::{Reader, Writer};
use std::fmt::{Display, Formatter, Result as FmtResult};

const FLAG_NAMED: u8 = 0x01;
const MIN_PROTOCOL: u8 = 5;
const MAX_PROTOCOL: u8 = 7;

/// Well-known index ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum IndexType {
    Frames = 0,
    Framemaps = 1,
    Configs = 2,
    Interfaces = 3,
    SoundEffects = 4,
    Maps = 5,
    Track1 = 6,
    Models = 7,
    Sprites = 8,
    Textures = 9,
    Binary = 10,
    Track2 = 11,
    ClientScript = 12,
    Fonts = 13,
    Vorbis = 14,
    Instruments = 15,
    WorldMap = 16,
    /// Holds the reference tables of every other index.
    Reference = 255,
}

impl IndexType {
    #[inline]
    #[must_use]
    pub fn id(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IndexType::Frames => "frames",
            IndexType::Framemaps => "framemaps",
            IndexType::Configs => "configs",
            IndexType::Interfaces => "interfaces",
            IndexType::SoundEffects => "soundeffects",
            IndexType::Maps => "maps",
            IndexType::Track1 => "track1",
            IndexType::Models => "models",
            IndexType::Sprites => "sprites",
            IndexType::Textures => "textures",
            IndexType::Binary => "binary",
            IndexType::Track2 => "track2",
            IndexType::ClientScript => "clientscript",
            IndexType::Fonts => "fonts",
            IndexType::Vorbis => "vorbis",
            IndexType::Instruments => "instruments",
            IndexType::WorldMap => "worldmap",
            IndexType::Reference => "reference",
        }
    }
}

impl Display for IndexType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl From<IndexType> for u8 {
    fn from(value: IndexType) -> Self {
        value.id()
    }
}

/// A decoded reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub id: u8,
    pub protocol: u8,
    pub revision: i32,
    pub named: bool,
    /// Archives in ascending id order.
    pub archives: Vec<Archive>,
}

impl Index {
    /// An empty protocol 6 table.
    pub fn new(id: u8) -> Self {
        Self {
            id,
            protocol: 6,
            revision: 0,
            named: false,
            archives: Vec::new(),
        }
    }

    pub fn archive(&self, id: u32) -> Option<&Archive> {
        self.archives
            .binary_search_by_key(&id, |archive| archive.id)
            .ok()
            .map(|position| &self.archives[position])
    }

    /// Decode the reference table for index `id` from a decompressed container payload.
    pub fn decode(id: u8, data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let protocol = reader.u8().map_err(ErrorKind::codec)?;
        if !(MIN_PROTOCOL..=MAX_PROTOCOL).contains(&protocol) {
            exn::bail!(ErrorKind::UnsupportedProtocol(protocol));
        }
        let revision = if protocol >= 6 { reader.i32().map_err(ErrorKind::codec)? } else { 0 };
        let flags = reader.u8().map_err(ErrorKind::codec)?;
        if flags & !FLAG_NAMED != 0 {
            exn::bail!(ErrorKind::UnsupportedFlags(flags));
        }
        let named = flags & FLAG_NAMED != 0;

        let archive_count = read_table_count(&mut reader, protocol)?;
        let mut archives = Vec::with_capacity(archive_count);
        let mut last = 0u32;
        for _ in 0..archive_count {
            last = last.wrapping_add(read_count(&mut reader, protocol)? as u32);
            archives.push(Archive::new(id, last));
        }
        if named {
            for archive in archives.iter_mut() {
                archive.name_hash = reader.i32().map_err(ErrorKind::codec)?;
            }
        }
        for archive in archives.iter_mut() {
            archive.crc = reader.u32().map_err(ErrorKind::codec)?;
        }
        for archive in archives.iter_mut() {
            archive.revision = reader.i32().map_err(ErrorKind::codec)?;
        }
        let mut file_counts = Vec::with_capacity(archive_count);
        for _ in 0..archive_count {
            file_counts.push(read_table_count(&mut reader, protocol)?);
        }
        for (archive, count) in archives.iter_mut().zip(&file_counts) {
            let mut last = 0u32;
            for _ in 0..*count {
                last = last.wrapping_add(read_count(&mut reader, protocol)? as u32);
                archive.files.push(FileEntry { id: last, name_hash: 0 });
            }
        }
        if named {
            for archive in archives.iter_mut() {
                for file in archive.files.iter_mut() {
                    file.name_hash = reader.i32().map_err(ErrorKind::codec)?;
                }
            }
        }

        if archives.windows(2).any(|pair| pair[0].id >= pair[1].id) {
            exn::bail!(ErrorKind::Corrupt(format!("archive ids of index {id} are not ascending")));
        }

        Ok(Self {
            id,
            protocol,
            revision,
            named,
            archives,
        })
    }

    /// Encode the table. Archives must be sorted by id.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new();
        writer.put_u8(self.protocol);
        if self.protocol >= 6 {
            writer.put_i32(self.revision);
        }
        writer.put_u8(if self.named { FLAG_NAMED } else { 0 });

        write_count(&mut writer, self.protocol, self.archives.len())?;
        let mut last = 0u32;
        for archive in &self.archives {
            write_count(&mut writer, self.protocol, archive.id.wrapping_sub(last) as usize)?;
            last = archive.id;
        }
        if self.named {
            for archive in &self.archives {
                writer.put_i32(archive.name_hash);
            }
        }
        for archive in &self.archives {
            writer.put_u32(archive.crc);
        }
        for archive in &self.archives {
            writer.put_i32(archive.revision);
        }
        for archive in &self.archives {
            write_count(&mut writer, self.protocol, archive.files.len())?;
        }
        for archive in &self.archives {
            let mut last = 0u32;
            for file in &archive.files {
                write_count(&mut writer, self.protocol, file.id.wrapping_sub(last) as usize)?;
                last = file.id;
            }
        }
        if self.named {
            for archive in &self.archives {
                for file in &archive.files {
                    writer.put_i32(file.name_hash);
                }
            }
        }
        Ok(writer.into_inner())
    }
}

/// A count of entries that still have to be read from `reader`. Every entry
/// takes at least one byte, so a count beyond what is left is corrupt.
fn read_table_count(reader: &mut Reader<'_>, protocol: u8) -> Result<usize> {
    let count = read_count(reader, protocol)?;
    if count > reader.remaining() {
        exn::bail!(ErrorKind::Corrupt(format!(
            "count {count} exceeds the {} bytes left in the table",
            reader.remaining()
        )));
    }
    Ok(count)
}

/// Counts and id deltas are big smarts from protocol 7, shorts before that.
fn read_count(reader: &mut Reader<'_>, protocol: u8) -> Result<usize> {
    let value = if protocol >= 7 {
        reader.big_smart().map_err(ErrorKind::codec)?
    } else {
        u32::from(reader.u16().map_err(ErrorKind::codec)?)
    };
    Ok(value as usize)
}

fn write_count(writer: &mut Writer, protocol: u8, value: usize) -> Result<()> {
    if protocol >= 7 {
        let value = u32::try_from(value).map_err(|_| ErrorKind::Corrupt(format!("count {value} too large")))?;
        writer.put_big_smart(value).map_err(ErrorKind::codec)?;
    } else {
        let value = u16::try_from(value)
            .map_err(|_| ErrorKind::Corrupt(format!("count {value} does not fit protocol {protocol}")))?;
        writer.put_u16(value);
    }
    Ok(())
}
