use crate::Compression;
use crate::error::{Error, ErrorKind};

impl TryFrom<u8> for Compression {
    type Error = Error;
    /// Interpret the compression id from the first byte of a container.
    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Compression::None),
            1 => Ok(Compression::Bzip2),
            2 => Ok(Compression::Gzip),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(format!("compression id {id}"))),
        }
    }
}
