// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! In-place archive mutation: removing, renaming, merging and splitting.
//!
//! Each operation reads an existing archive through its [`ArchiveModel`], copies untouched byte ranges verbatim to
//! a new destination, and rewrites only what changed. Every operation moves through the same phases (see
//! [`crate::progress::Phase`]) and checks for cancellation between copied chunks and between entries.
//!
//! The model passed in is updated to describe the destination once the operation succeeds. On failure it may be
//! left partially updated, so callers which need to recover should operate on a clone (as
//! [`crate::tokio::fs::ZipArchive`] does).

pub mod merge;
pub mod remove;
pub mod rename;
pub mod split;

pub use merge::merge_split_archive;
pub use remove::{remove_entries, remove_entry};
pub use rename::{rename_entries, rename_entry};
pub use split::split_archive;

use crate::error::Result;
use crate::model::ArchiveModel;
use crate::progress::ProgressMonitor;

use futures_lite::io::{AsyncRead, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt, SeekFrom};

/// The default size of the buffer used to copy byte ranges.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Options shared by all mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOptions {
    /// The size of the buffer used to copy byte ranges, and so the granularity of cancellation checks.
    pub buffer_size: usize,
    /// Whether file-level operations return immediately and run on the runtime, reporting through their
    /// [`ProgressMonitor`] instead.
    pub run_in_background: bool,
}

impl Default for MutationOptions {
    fn default() -> Self {
        Self { buffer_size: DEFAULT_BUFFER_SIZE, run_in_background: false }
    }
}

impl MutationOptions {
    pub(crate) fn buffer(&self) -> Vec<u8> {
        vec![0; self.buffer_size.max(1)]
    }
}

/// The byte range an entry occupies within a single-file archive: its local header, data and any data descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EntrySpan {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl EntrySpan {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }
}

/// Computes every entry's span, in local header order.
///
/// An entry ends where the next local header starts, or at the central directory for the last one.
pub(crate) fn entry_spans(model: &ArchiveModel) -> Vec<EntrySpan> {
    let cd_offset = model.central_directory_offset();

    let mut order: Vec<(u64, usize)> =
        model.file_headers().iter().enumerate().map(|(index, header)| (header.local_header_offset, index)).collect();
    order.sort_unstable();

    let mut spans = Vec::with_capacity(order.len());
    for (position, (start, index)) in order.iter().enumerate() {
        let end = order.get(position + 1).map(|(next, _)| *next).unwrap_or(cd_offset);
        spans.push(EntrySpan { index: *index, start: *start, end: std::cmp::max(end, *start) });
    }

    spans
}

/// The bytes preceding the first local header (or the central directory if there are no entries).
pub(crate) fn prefix_length(model: &ArchiveModel, spans: &[EntrySpan]) -> u64 {
    spans.first().map(|span| span.start).unwrap_or_else(|| model.central_directory_offset())
}

/// Copies `[start, end)` of the source to the destination, reporting progress and checking for cancellation
/// between chunks.
pub(crate) async fn copy_range<R, W>(
    mut reader: R,
    mut writer: W,
    start: u64,
    end: u64,
    buffer: &mut [u8],
    monitor: &ProgressMonitor,
) -> Result<()>
where
    R: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
{
    reader.seek(SeekFrom::Start(start)).await?;
    let mut remaining = end.saturating_sub(start);

    while remaining > 0 {
        monitor.check_cancelled()?;

        let length = std::cmp::min(remaining, buffer.len() as u64) as usize;
        crate::utils::read_exact(&mut reader, &mut buffer[..length]).await?;
        writer.write_all(&buffer[..length]).await?;

        remaining -= length as u64;
        monitor.update_work_completed(length as u64);
    }

    Ok(())
}
