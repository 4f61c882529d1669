// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which supports writing ZIP files.
//!
//! # Example
//! ### Whole data (u8 slice)
//! ```no_run
//! # use zip_rewrite::base::write::{ZipEntryBuilder, ZipFileWriter};
//! # use zip_rewrite::error::ZipError;
//! #
//! # async fn run() -> Result<(), ZipError> {
//! let mut writer = ZipFileWriter::new(Vec::<u8>::new());
//!
//! let data = b"This is an example file.";
//! writer.write_entry_whole(ZipEntryBuilder::new("foo.txt"), data).await?;
//! writer.close().await?;
//! #   Ok(())
//! # }
//! ```
//! ### Stream data (unknown size & data)
//! ```no_run
//! # use zip_rewrite::base::write::{ZipEntryBuilder, ZipFileWriter};
//! # use zip_rewrite::error::ZipError;
//! # use futures_lite::io::AsyncWriteExt;
//! #
//! # async fn run() -> Result<(), ZipError> {
//! let mut writer = ZipFileWriter::new(Vec::<u8>::new());
//!
//! let mut entry_writer = writer.write_entry_stream(ZipEntryBuilder::new("bar.txt")).await?;
//! entry_writer.write_all(b"This is an example file.").await?;
//!
//! entry_writer.close().await?;
//! writer.close().await?;
//! #   Ok(())
//! # }
//! ```

pub mod builder;
pub(crate) mod entry_seek;
pub(crate) mod entry_stream;
pub(crate) mod entry_whole;
pub mod header;
pub(crate) mod io;
pub mod patch;

pub use builder::ZipEntryBuilder;
pub use entry_seek::EntrySeekWriter;
pub use entry_stream::EntryStreamWriter;

use crate::error::Result;
use crate::model::{ArchiveModel, FileHeader, LocalFileHeader};
use crate::spec::version::ZIP64_VERSION_NEEDED;
use crate::string::ZipString;

use entry_whole::EntryWholeWriter;
use io::offset::AsyncOffsetWriter;

use encoding_rs::Encoding;
use futures_lite::io::{AsyncSeek, AsyncWrite};
#[cfg(feature = "tokio")]
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// A ZIP file writer which acts over AsyncWrite implementers.
///
/// Headers are accumulated into an [`ArchiveModel`] as entries are written, and serialised by
/// [`ZipFileWriter::close()`].
///
/// # Note
/// - [`ZipFileWriter::close()`] must be called before a writer goes out of scope.
pub struct ZipFileWriter<W> {
    pub(crate) writer: AsyncOffsetWriter<W>,
    pub(crate) model: ArchiveModel,
}

impl<W: AsyncWrite + Unpin> ZipFileWriter<W> {
    /// Construct a new ZIP file writer from a mutable reference to a writer.
    pub fn new(writer: W) -> Self {
        Self { writer: AsyncOffsetWriter::new(writer), model: ArchiveModel::new() }
    }

    /// Encode names and comments which aren't pure ASCII with the given charset rather than UTF-8.
    pub fn with_charset(mut self, charset: &'static Encoding) -> Self {
        self.model.charset = Some(charset);
        self
    }

    /// Force the ZIP writer to emit Zip64 structs at the end of the archive.
    /// Zip64 extended fields will only be written if needed.
    pub fn force_zip64(mut self) -> Self {
        self.model.zip64_format = true;
        self
    }

    /// Write a new stored ZIP entry of known data.
    ///
    /// Data is stored uncompressed and unencrypted; use [`ZipFileWriter::write_entry_raw()`] for anything else.
    pub async fn write_entry_whole<E: Into<ZipEntryBuilder>>(&mut self, entry: E, data: &[u8]) -> Result<()> {
        EntryWholeWriter::from_raw(self, entry.into(), data).write().await
    }

    /// Write an entry whose data has already been compressed and/or encrypted by the caller.
    ///
    /// The data is written verbatim; `crc32` and `uncompressed_size` describe the original data.
    pub async fn write_entry_raw<E: Into<ZipEntryBuilder>>(
        &mut self,
        entry: E,
        data: &[u8],
        crc32: u32,
        uncompressed_size: u64,
    ) -> Result<()> {
        EntryWholeWriter::from_raw(self, entry.into(), data).write_raw(crc32, uncompressed_size).await
    }

    /// Write a directory entry. A trailing `/` is appended to the name if missing.
    pub async fn write_directory(&mut self, name: &str) -> Result<()> {
        let name = match name.ends_with('/') {
            true => name.to_owned(),
            false => format!("{name}/"),
        };

        self.write_entry_whole(ZipEntryBuilder::new(name), &[]).await
    }

    /// Write an entry of unknown size and data via streaming (ie. using a data descriptor).
    /// The generated Local File Header will carry no sizes and a null CRC.
    pub async fn write_entry_stream<E: Into<ZipEntryBuilder>>(&mut self, entry: E) -> Result<EntryStreamWriter<'_, W>> {
        EntryStreamWriter::from_raw(self, entry.into()).await
    }

    /// Set the ZIP file comment.
    pub fn comment(&mut self, comment: String) {
        let (comment, _) = ZipString::encode(&comment, false, self.model.charset);
        self.model.set_comment(comment);
    }

    /// The headers written so far.
    pub fn model(&self) -> &ArchiveModel {
        &self.model
    }

    /// The current byte offset, ie. where the next entry's local header will be written.
    pub fn offset(&self) -> u64 {
        self.writer.offset()
    }

    /// Returns a mutable reference to the inner writer.
    ///
    /// Care should be taken when using this inner writer as doing so may invalidate internal state of this writer.
    pub fn inner_mut(&mut self) -> &mut W {
        self.writer.inner_mut()
    }

    /// Writes a new entry's local file header at the current offset.
    ///
    /// Returns the header as written along with its offset.
    pub(crate) async fn begin_entry(&mut self, header: &mut FileHeader, reserve_zip64: bool) -> Result<(LocalFileHeader, u64)> {
        let offset = self.writer.offset();
        header.local_header_offset = offset;

        let mut local = LocalFileHeader::from(&*header);
        local.write_compressed_size_in_zip64_extra_record = reserve_zip64;

        header::write_local_file_header(&mut self.writer, &mut self.model, &mut local).await?;
        Ok((local, offset))
    }

    /// Records a completed entry's central directory header.
    pub(crate) fn finish_entry(&mut self, mut header: FileHeader, crc32: u32, compressed_size: u64, uncompressed_size: u64) {
        header.crc32 = crc32;
        header.compressed_size = compressed_size;
        header.uncompressed_size = uncompressed_size;

        if header::requires_zip64_sizes(compressed_size, uncompressed_size)
            || header::requires_zip64_offset(header.local_header_offset)
        {
            header.version_needed_to_extract = std::cmp::max(header.version_needed_to_extract, ZIP64_VERSION_NEEDED);
        }

        tracing::debug!(name = %header.file_name, compressed_size, uncompressed_size, "wrote entry");
        self.model.central_directory.file_headers.push(header);
    }

    /// Consumes this ZIP writer and completes all closing tasks.
    ///
    /// This includes:
    /// - Writing all central directory headers.
    /// - Writing the Zip64 end of central directory record and locator, if needed.
    /// - Writing the end of central directory header and the file comment.
    ///
    /// Failure to call this function before going out of scope would result in a corrupted ZIP file.
    pub async fn close(self) -> Result<W> {
        Ok(self.close_with_model().await?.0)
    }

    /// As [`ZipFileWriter::close()`], but also returns the final headers.
    pub async fn close_with_model(mut self) -> Result<(W, ArchiveModel)> {
        let offset = self.writer.offset();
        header::finalize(&mut self.writer, &mut self.model, offset, 0).await?;
        Ok((self.writer.into_inner(), self.model))
    }
}

impl<W: AsyncWrite + AsyncSeek + Unpin> ZipFileWriter<W> {
    /// Write an entry of unknown size and data to a seekable destination.
    ///
    /// No data descriptor is used; the local file header is patched with the CRC and sizes once the entry is closed.
    /// The header can only hold sizes above 4GiB if [`ZipEntryBuilder::reserve_zip64`] was set.
    pub async fn write_entry_stream_seekable<E: Into<ZipEntryBuilder>>(
        &mut self,
        entry: E,
    ) -> Result<EntrySeekWriter<'_, W>> {
        EntrySeekWriter::from_raw(self, entry.into()).await
    }
}

#[cfg(feature = "tokio")]
impl<W> ZipFileWriter<Compat<W>>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    /// Construct a new ZIP file writer from a [`tokio`] writer.
    pub fn with_tokio(writer: W) -> crate::tokio::write::ZipFileWriter<W> {
        Self { writer: AsyncOffsetWriter::new(writer.compat_write()), model: ArchiveModel::new() }
    }
}
