use crate::Compression;
use crate::buffer::{Reader, Writer};
use crate::error::{ErrorKind, Result};
use tracing::instrument;

/// Bzip2 payloads are stored without their stream header.
const BZIP2_HEADER: &[u8; 4] = b"BZh1";

/// A decoded archive container.
///
/// Layout: compression id (`u8`), compressed length (`i32`), then for
/// compressed payloads the decompressed length (`i32`), the payload, and an
/// optional trailing `u16` revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub compression: Compression,
    /// Decompressed payload.
    pub data: Vec<u8>,
    pub revision: Option<u16>,
    /// CRC-32 over the header and stored payload, excluding the revision.
    pub crc: u32,
}

impl Container {
    #[instrument(level = "trace", skip(bytes), fields(size = bytes.len()))]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let compression = Compression::try_from(reader.u8()?)?;
        let length = usize::try_from(reader.i32()?).map_err(|_| exn::Exn::from(ErrorKind::InvalidData))?;

        let data = match compression {
            Compression::None => reader.take(length)?.to_vec(),
            Compression::Bzip2 | Compression::Gzip => {
                let declared =
                    usize::try_from(reader.i32()?).map_err(|_| exn::Exn::from(ErrorKind::InvalidData))?;
                let payload = reader.take(length)?;
                let data = if compression == Compression::Bzip2 {
                    let mut framed = Vec::with_capacity(BZIP2_HEADER.len() + payload.len());
                    framed.extend_from_slice(BZIP2_HEADER);
                    framed.extend_from_slice(payload);
                    compression.decompress(&framed)?
                } else {
                    compression.decompress(payload)?
                };
                if data.len() != declared {
                    exn::bail!(ErrorKind::LengthMismatch {
                        declared,
                        actual: data.len(),
                    });
                }
                data
            },
        };

        let crc = crc32fast::hash(&bytes[..reader.position()]);
        let revision = if reader.remaining() >= 2 { Some(reader.u16()?) } else { None };
        Ok(Self {
            compression,
            data,
            revision,
            crc,
        })
    }

    /// Frame `data` into a container. Returns the encoded bytes and the CRC
    /// a reference table should record for them.
    #[instrument(level = "trace", skip(data), fields(size = data.len(), format = %compression))]
    pub fn encode(compression: Compression, data: &[u8], revision: Option<u16>) -> Result<(Vec<u8>, u32)> {
        let mut writer = Writer::with_capacity(data.len() + 11);
        writer.put_u8(compression.id());
        match compression {
            Compression::None => {
                writer.put_i32(length_field(data.len())?).put_bytes(data);
            },
            Compression::Bzip2 | Compression::Gzip => {
                let compressed = compression.compress(data)?;
                let payload = if compression == Compression::Bzip2 {
                    compressed.get(BZIP2_HEADER.len()..).unwrap_or_default()
                } else {
                    &compressed[..]
                };
                writer
                    .put_i32(length_field(payload.len())?)
                    .put_i32(length_field(data.len())?)
                    .put_bytes(payload);
            },
        }
        let crc = crc32fast::hash(writer.as_slice());
        if let Some(revision) = revision {
            writer.put_u16(revision);
        }
        Ok((writer.into_inner(), crc))
    }
}

fn length_field(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| exn::Exn::from(ErrorKind::InvalidData))
}
