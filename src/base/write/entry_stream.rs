// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::write::{ZipEntryBuilder, ZipFileWriter};
use crate::error::{Result, ZipError};
use crate::model::{DataDescriptor, FileHeader, LocalFileHeader};
use crate::spec::compression::CompressionMethod;
use crate::spec::encryption::EncryptionMethod;

use std::io::Error;
use std::pin::Pin;
use std::task::{Context, Poll};

use crc32fast::Hasher;
use futures_lite::io::AsyncWrite;

/// An entry writer which supports the streaming of data (ie. the writing of unknown size or data at runtime).
///
/// The entry's CRC and sizes follow its data in a data descriptor.
///
/// # Note
/// - This writer cannot be manually constructed; instead, use [`ZipFileWriter::write_entry_stream()`].
/// - [`EntryStreamWriter::close()`] must be called before a stream writer goes out of scope.
/// - Utilities for working with [`AsyncWrite`] values are provided by [`futures_lite::io::AsyncWriteExt`].
pub struct EntryStreamWriter<'b, W: AsyncWrite + Unpin> {
    writer: &'b mut ZipFileWriter<W>,
    header: FileHeader,
    lfh: LocalFileHeader,
    hasher: Hasher,
    data_offset: u64,
}

impl<'b, W: AsyncWrite + Unpin> EntryStreamWriter<'b, W> {
    pub(crate) async fn from_raw(writer: &'b mut ZipFileWriter<W>, entry: ZipEntryBuilder) -> Result<EntryStreamWriter<'b, W>> {
        let reserve_zip64 = entry.reserves_zip64();
        let mut header = entry.into_file_header(writer.model.charset)?;
        header.general_purpose_flag.set_data_descriptor(true);

        let (lfh, _) = writer.begin_entry(&mut header, reserve_zip64).await?;
        let data_offset = writer.writer.offset();

        Ok(EntryStreamWriter { writer, header, lfh, hasher: Hasher::new(), data_offset })
    }

    /// Consumes this entry writer and completes all closing tasks, for a stored and unencrypted entry.
    ///
    /// This includes:
    /// - Finalising the CRC32 hash value for the written data.
    /// - Writing the data descriptor.
    /// - Pushing the central directory header to the [`ZipFileWriter`]'s model.
    ///
    /// Failure to call this function before going out of scope would result in a corrupted ZIP file.
    pub async fn close(mut self) -> Result<()> {
        if self.header.compression_method != CompressionMethod::Stored
            || self.header.encryption_method() != EncryptionMethod::None
        {
            return Err(ZipError::CompressionNotSupported(self.header.compression_method.into()));
        }

        let crc = std::mem::take(&mut self.hasher).finalize();
        let size = self.writer.writer.offset() - self.data_offset;
        self.close_with(crc, size).await
    }

    /// Consumes this entry writer, recording the given CRC and uncompressed size.
    ///
    /// Used when the written data was compressed or encrypted by the caller, so neither can be derived from it.
    pub async fn close_with(mut self, crc32: u32, uncompressed_size: u64) -> Result<()> {
        let compressed_size = self.writer.writer.offset() - self.data_offset;
        let descriptor = DataDescriptor { crc_32: crc32, compressed_size, uncompressed_size };

        super::header::write_data_descriptor(&mut self.writer.writer, &self.lfh, &descriptor).await?;
        self.writer.finish_entry(self.header, crc32, compressed_size, uncompressed_size);
        Ok(())
    }
}

impl<'a, W: AsyncWrite + Unpin> AsyncWrite for EntryStreamWriter<'a, W> {
    fn poll_write(mut self: Pin<&mut Self>, cx: &mut Context, buf: &[u8]) -> Poll<std::result::Result<usize, Error>> {
        let poll = Pin::new(&mut self.writer.writer).poll_write(cx, buf);

        if let Poll::Ready(Ok(written)) = poll {
            self.hasher.update(&buf[0..written]);
        }

        poll
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<std::result::Result<(), Error>> {
        Pin::new(&mut self.writer.writer).poll_flush(cx)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<std::result::Result<(), Error>> {
        Pin::new(&mut self.writer.writer).poll_close(cx)
    }
}
