//! Compression Operations

use crate::Compression;
use crate::error::{ErrorKind, Result};
use bzip2::{Compression as BzCompression, read::BzDecoder, write::BzEncoder};
use exn::ResultExt;
use flate2::{Compression as GzCompression, read::GzDecoder, write::GzEncoder};
use std::io::{Read, Write};
use tracing::instrument;

// Containers always declare 100k bzip2 blocks: the stream header they strip
// is `BZh1`, so anything compressed here must use the same block size.
const BZIP2_LEVEL: BzCompression = BzCompression::fast();
const GZIP_LEVEL: GzCompression = GzCompression::best();

impl Compression {
    /// Compress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use modeldump_codec::Compression;
    ///
    /// let data = b"Hello, world!";
    /// let compressed = Compression::Gzip.compress(data).unwrap();
    /// assert_ne!(compressed, data);
    /// ```
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.compress_into(input, &mut output)?;
        Ok(output)
    }

    /// Decompress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modeldump_codec::Compression;
    ///
    /// let original = b"Hello, world!";
    /// let compressed = Compression::Bzip2.compress(original).unwrap();
    /// let decompressed = Compression::Bzip2.decompress(&compressed).unwrap();
    /// assert_eq!(decompressed, original);
    /// ```
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.decompress_into(input, &mut output)?;
        Ok(output)
    }

    #[instrument(level = "trace", skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn compress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let size = match self {
            Compression::None => {
                output.extend_from_slice(input);
                input.len()
            },
            Compression::Bzip2 => {
                let mut encoder = BzEncoder::new(&mut *output, BZIP2_LEVEL);
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
                output.len()
            },
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(&mut *output, GZIP_LEVEL);
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
                output.len()
            },
        };
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }

    #[instrument(level = "trace", skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn decompress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let size = match self {
            Compression::None => {
                output.extend_from_slice(input);
                input.len()
            },
            Compression::Bzip2 => {
                let mut decoder = BzDecoder::new(input);
                decoder.read_to_end(output).or_raise(|| ErrorKind::InvalidData)?
            },
            Compression::Gzip => {
                let mut decoder = GzDecoder::new(input);
                decoder.read_to_end(output).or_raise(|| ErrorKind::InvalidData)?
            },
        };
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }
}
