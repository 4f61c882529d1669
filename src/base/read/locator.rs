// Copyright (c) 2022-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! <https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4316>
//!
//! The end of central directory record may be followed by a variable-length comment, so its position can't be
//! computed from the end of the data; it has to be searched for.
//!
//! The search walks backwards from the last position the record could start at, and stops after the largest
//! comment a record can declare. Reads are done in buffered chunks rather than one u32 per position, as a
//! [`BufReader`] in front of the upstream reader would be invalidated on every seek. Adjacent chunks overlap by
//! one byte less than the signature so that a signature straddling a chunk boundary is still seen.

#[cfg(doc)]
use futures_lite::io::BufReader;

use crate::error::{Result, ZipError};
use crate::spec::consts::{EOCDR_LENGTH, EOCDR_MAX_COMMENT_LENGTH, SIGNATURE_LENGTH};
use crate::spec::signature::END_OF_CENTRAL_DIRECTORY;

use futures_lite::io::{AsyncRead, AsyncSeek, AsyncSeekExt, SeekFrom};

/// The buffer size used when locating the EOCDR, equal to 2KiB.
const BUFFER_SIZE: usize = 2048;

/// The length of an EOCDR with an empty comment, signature included.
const EOCDR_MIN_LENGTH: u64 = (SIGNATURE_LENGTH + EOCDR_LENGTH) as u64;

/// Locates the `end of central directory record`, returning the offset of its signature.
///
/// Fails with [`ZipError::NotAZipFile`] when the signature isn't within the last
/// `22 + 65535` bytes of the data.
#[tracing::instrument(skip(reader))]
pub async fn eocdr<R>(mut reader: R) -> Result<u64>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let length = reader.seek(SeekFrom::End(0)).await?;

    if length < EOCDR_MIN_LENGTH {
        return Err(ZipError::NotAZipFile);
    }

    let signature = END_OF_CENTRAL_DIRECTORY.to_le_bytes();
    let mut buffer = [0; BUFFER_SIZE];

    // The range of offsets the signature may start at, inclusive.
    let upper = length - EOCDR_MIN_LENGTH;
    let lower = upper.saturating_sub(EOCDR_MAX_COMMENT_LENGTH as u64);

    let mut end = upper + SIGNATURE_LENGTH as u64;

    loop {
        let start = end.saturating_sub(BUFFER_SIZE as u64).max(lower);
        let chunk = &mut buffer[..(end - start) as usize];

        reader.seek(SeekFrom::Start(start)).await?;
        crate::utils::read_exact(&mut reader, chunk).await?;

        if let Some(index) = reverse_search_buffer(chunk, &signature) {
            let offset = start + index as u64;
            tracing::debug!(offset, "located end of central directory record");
            return Ok(offset);
        }

        if start == lower {
            return Err(ZipError::NotAZipFile);
        }

        end = start + SIGNATURE_LENGTH as u64 - 1;
    }
}

/// A naive reverse linear search along the buffer for the specified signature bytes.
///
/// Returns the index at which the last complete occurrence of the signature starts.
pub(crate) fn reverse_search_buffer(buffer: &[u8], signature: &[u8]) -> Option<usize> {
    if signature.is_empty() || buffer.len() < signature.len() {
        return None;
    }

    (0..=buffer.len() - signature.len()).rev().find(|&index| &buffer[index..index + signature.len()] == signature)
}
