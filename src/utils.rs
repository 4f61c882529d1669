// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Fixed-width little-endian integer codecs over streams and in-memory buffers.

use crate::error::{Result, ZipError};

use futures_lite::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Fills the whole buffer from the reader, converting a premature EOF into [`ZipError::TruncatedInput`].
pub(crate) async fn read_exact(mut reader: impl AsyncRead + Unpin, buffer: &mut [u8]) -> Result<()> {
    let mut filled = 0;

    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]).await? {
            0 => return Err(ZipError::TruncatedInput(buffer.len() - filled)),
            read => filled += read,
        }
    }

    Ok(())
}

/// Reads a little-endian u16 from the given reader.
pub(crate) async fn read_u16(reader: impl AsyncRead + Unpin) -> Result<u16> {
    let mut buffer = [0; 2];
    read_exact(reader, &mut buffer).await?;
    Ok(u16::from_le_bytes(buffer))
}

/// Reads a little-endian u32 from the given reader.
pub(crate) async fn read_u32(reader: impl AsyncRead + Unpin) -> Result<u32> {
    let mut buffer = [0; 4];
    read_exact(reader, &mut buffer).await?;
    Ok(u32::from_le_bytes(buffer))
}

/// Reads a little-endian u64 from the given reader.
pub(crate) async fn read_u64(reader: impl AsyncRead + Unpin) -> Result<u64> {
    let mut buffer = [0; 8];
    read_exact(reader, &mut buffer).await?;
    Ok(u64::from_le_bytes(buffer))
}

pub(crate) async fn write_u16(mut writer: impl AsyncWrite + Unpin, value: u16) -> Result<()> {
    writer.write_all(&value.to_le_bytes()).await?;
    Ok(())
}

pub(crate) async fn write_u32(mut writer: impl AsyncWrite + Unpin, value: u32) -> Result<()> {
    writer.write_all(&value.to_le_bytes()).await?;
    Ok(())
}

pub(crate) async fn write_u64(mut writer: impl AsyncWrite + Unpin, value: u64) -> Result<()> {
    writer.write_all(&value.to_le_bytes()).await?;
    Ok(())
}

/// Read and return a dynamic length vector of bytes from a reader which impls AsyncRead.
///
/// The buffer only grows as bytes arrive, so a corrupt length can't force a large allocation.
pub(crate) async fn read_bytes(reader: impl AsyncRead + Unpin, length: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(std::cmp::min(length, u16::MAX as usize));
    reader.take(length as u64).read_to_end(&mut buffer).await?;

    match length - buffer.len() {
        0 => Ok(buffer),
        missing => Err(ZipError::TruncatedInput(missing)),
    }
}

/// Assert that the next four-byte signature read by a reader which impls AsyncRead matches the expected signature.
pub(crate) async fn assert_signature(reader: impl AsyncRead + Unpin, expected: u32) -> Result<()> {
    match read_u32(reader).await? {
        actual if actual == expected => Ok(()),
        actual => Err(ZipError::UnexpectedSignature { actual, expected }),
    }
}

/// A forward-only reader over an in-memory byte slice.
///
/// Used for structures which are length-prefixed on disk and so are parsed after being read whole (eg. the extra
/// field block of a header).
#[derive(Debug, Clone)]
pub(crate) struct SliceReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn take(&mut self, length: usize) -> Result<&'a [u8]> {
        if length > self.remaining() {
            return Err(ZipError::TruncatedInput(length - self.remaining()));
        }

        let slice = &self.data[self.position..self.position + length];
        self.position += length;
        Ok(slice)
    }

    pub(crate) fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    pub(crate) fn u16_le(&mut self) -> Result<u16> {
        self.take_array().map(u16::from_le_bytes)
    }

    pub(crate) fn u32_le(&mut self) -> Result<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub(crate) fn u64_le(&mut self) -> Result<u64> {
        self.take_array().map(u64::from_le_bytes)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        self.take_array::<1>().map(|[byte]| byte)
    }
}

/// Reinterprets a value decoded as little-endian as though it had been stored big-endian.
///
/// Only used as a recovery path for extra fields written by tools with the wrong byte order.
pub(crate) fn swap_u16(value: u16) -> u16 {
    u16::from_be_bytes(value.to_le_bytes())
}

/// Reads a little-endian u16 at a fixed offset within a buffer.
pub(crate) fn le_u16_at(buffer: &[u8], offset: usize) -> Result<u16> {
    let mut reader = SliceReader::new(buffer);
    reader.take(offset)?;
    reader.u16_le()
}

/// Reads a little-endian u32 at a fixed offset within a buffer.
pub(crate) fn le_u32_at(buffer: &[u8], offset: usize) -> Result<u32> {
    let mut reader = SliceReader::new(buffer);
    reader.take(offset)?;
    reader.u32_le()
}

pub(crate) fn put_u16(buffer: &mut Vec<u8>, value: u16) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_u32(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_u64(buffer: &mut Vec<u8>, value: u64) {
    buffer.extend_from_slice(&value.to_le_bytes());
}
