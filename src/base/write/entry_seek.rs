// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::write::patch::{patch_local_header_sizes, LocalHeaderLayout};
use crate::base::write::{ZipEntryBuilder, ZipFileWriter};
use crate::error::{Result, ZipError};
use crate::model::FileHeader;
use crate::spec::compression::CompressionMethod;
use crate::spec::encryption::EncryptionMethod;

use std::io::Error;
use std::pin::Pin;
use std::task::{Context, Poll};

use crc32fast::Hasher;
use futures_lite::io::{AsyncSeek, AsyncWrite};

/// An entry writer for a seekable destination, which patches the entry's local file header once its data is done.
///
/// # Note
/// - This writer cannot be manually constructed; instead, use [`ZipFileWriter::write_entry_stream_seekable()`].
/// - [`EntrySeekWriter::close()`] must be called before the writer goes out of scope.
pub struct EntrySeekWriter<'b, W: AsyncWrite + AsyncSeek + Unpin> {
    writer: &'b mut ZipFileWriter<W>,
    header: FileHeader,
    layout: LocalHeaderLayout,
    header_offset: u64,
    data_offset: u64,
    hasher: Hasher,
}

impl<'b, W: AsyncWrite + AsyncSeek + Unpin> EntrySeekWriter<'b, W> {
    pub(crate) async fn from_raw(writer: &'b mut ZipFileWriter<W>, entry: ZipEntryBuilder) -> Result<EntrySeekWriter<'b, W>> {
        let reserve_zip64 = entry.reserves_zip64();
        let mut header = entry.into_file_header(writer.model.charset)?;

        let (lfh, header_offset) = writer.begin_entry(&mut header, reserve_zip64).await?;
        let layout = LocalHeaderLayout::of(&lfh);
        let data_offset = writer.writer.offset();

        Ok(EntrySeekWriter { writer, header, layout, header_offset, data_offset, hasher: Hasher::new() })
    }

    /// Consumes this entry writer and patches its local header, for a stored and unencrypted entry.
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

    /// Consumes this entry writer and patches its local header with the given CRC and uncompressed size.
    ///
    /// Fails with [`ZipError::Zip64NotReserved`] if a size needs Zip64 but the header wasn't written with room for it.
    pub async fn close_with(mut self, crc32: u32, uncompressed_size: u64) -> Result<()> {
        let end = self.writer.writer.offset();
        let compressed_size = end - self.data_offset;

        if self.layout.zip64.is_none()
            && super::header::requires_zip64_sizes(compressed_size, uncompressed_size)
        {
            return Err(ZipError::Zip64NotReserved);
        }

        patch_local_header_sizes(
            &mut self.writer.writer,
            self.header_offset,
            &self.layout,
            crc32,
            compressed_size,
            uncompressed_size,
            end,
        )
        .await?;

        self.writer.finish_entry(self.header, crc32, compressed_size, uncompressed_size);
        Ok(())
    }
}

impl<'a, W: AsyncWrite + AsyncSeek + Unpin> AsyncWrite for EntrySeekWriter<'a, W> {
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
