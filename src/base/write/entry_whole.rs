// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::write::{ZipEntryBuilder, ZipFileWriter};
use crate::error::{Result, ZipError};
use crate::spec::compression::CompressionMethod;
use crate::spec::encryption::EncryptionMethod;

use crc32fast::Hasher;
use futures_lite::io::{AsyncWrite, AsyncWriteExt};

pub struct EntryWholeWriter<'b, 'c, W: AsyncWrite + Unpin> {
    writer: &'b mut ZipFileWriter<W>,
    entry: ZipEntryBuilder,
    data: &'c [u8],
}

impl<'b, 'c, W: AsyncWrite + Unpin> EntryWholeWriter<'b, 'c, W> {
    pub fn from_raw(writer: &'b mut ZipFileWriter<W>, entry: ZipEntryBuilder, data: &'c [u8]) -> Self {
        Self { writer, entry, data }
    }

    /// Writes the data as a stored entry, computing its CRC.
    pub async fn write(self) -> Result<()> {
        let header = self.entry.clone().into_file_header(self.writer.model.charset)?;

        // Encrypted data can't be produced here either, so it goes through the raw path too.
        if header.compression_method != CompressionMethod::Stored || header.encryption_method() != EncryptionMethod::None {
            return Err(ZipError::CompressionNotSupported(header.compression_method.into()));
        }

        let crc = compute_crc(self.data);
        let size = self.data.len() as u64;
        self.write_prepared(crc, size).await
    }

    /// Writes the data verbatim as an entry's (already compressed or encrypted) payload.
    pub async fn write_raw(self, crc32: u32, uncompressed_size: u64) -> Result<()> {
        self.write_prepared(crc32, uncompressed_size).await
    }

    async fn write_prepared(self, crc32: u32, uncompressed_size: u64) -> Result<()> {
        let reserve_zip64 = self.entry.reserves_zip64();
        let mut header = self.entry.into_file_header(self.writer.model.charset)?;

        header.crc32 = crc32;
        header.compressed_size = self.data.len() as u64;
        header.uncompressed_size = uncompressed_size;

        self.writer.begin_entry(&mut header, reserve_zip64).await?;
        self.writer.writer.write_all(self.data).await?;

        let compressed_size = self.data.len() as u64;
        self.writer.finish_entry(header, crc32, compressed_size, uncompressed_size);
        Ok(())
    }
}

pub(crate) fn compute_crc(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
