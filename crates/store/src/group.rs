//! Multi-file archive packing.
//!
//! An archive holding more than one file stores them interleaved in chunks,
//! followed by a table of per-chunk size deltas and a trailing chunk count.
//! An archive holding exactly one file is the file itself.

use crate::error::{ErrorKind, Result};
use modeldump_codec::buffer::{Reader, Writer};

/// Split a decompressed archive into `count` files.
pub fn unpack(data: &[u8], count: usize) -> Result<Vec<Vec<u8>>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if count == 1 {
        return Ok(vec![data.to_vec()]);
    }

    let Some(&chunks) = data.last() else {
        exn::bail!(ErrorKind::Corrupt("empty multi-file archive".to_string()));
    };
    let chunks = usize::from(chunks);
    let table_len = chunks * count * 4;
    let Some(table_start) = data.len().checked_sub(1 + table_len) else {
        exn::bail!(ErrorKind::Corrupt(format!(
            "archive of {} bytes too small for {chunks} chunks of {count} files",
            data.len()
        )));
    };

    let mut table = Reader::at(data, table_start);
    let mut chunk_sizes = vec![vec![0usize; count]; chunks];
    let mut totals = vec![0usize; count];
    for sizes in chunk_sizes.iter_mut() {
        let mut chunk_size: i64 = 0;
        for (file, size) in sizes.iter_mut().enumerate() {
            chunk_size += i64::from(table.i32().map_err(ErrorKind::codec)?);
            *size = usize::try_from(chunk_size)
                .map_err(|_| ErrorKind::Corrupt(format!("negative chunk size for file {file}")))?;
            totals[file] += *size;
        }
    }

    let mut files: Vec<Vec<u8>> = totals.iter().map(|total| Vec::with_capacity(*total)).collect();
    let mut body = Reader::new(&data[..table_start]);
    for sizes in &chunk_sizes {
        for (file, size) in sizes.iter().enumerate() {
            files[file].extend_from_slice(body.take(*size).map_err(ErrorKind::codec)?);
        }
    }
    Ok(files)
}

/// Pack files into a single-chunk archive.
pub fn pack(files: &[Vec<u8>]) -> Result<Vec<u8>> {
    match files {
        [] => Ok(Vec::new()),
        [single] => Ok(single.clone()),
        _ => {
            let mut writer = Writer::new();
            for file in files {
                writer.put_bytes(file);
            }
            let mut previous = 0i64;
            for file in files {
                let size = i64::try_from(file.len()).unwrap_or(i64::MAX);
                let delta = i32::try_from(size - previous)
                    .map_err(|_| ErrorKind::Corrupt(format!("file of {size} bytes too large to pack")))?;
                writer.put_i32(delta);
                previous = size;
            }
            writer.put_u8(1);
            Ok(writer.into_inner())
        },
    }
}
