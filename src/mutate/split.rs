// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::write::header::finalize;
use crate::error::{Result, SplitOperation, ZipError};
use crate::model::ArchiveModel;
use crate::mutate::{entry_spans, prefix_length, EntrySpan, MutationOptions};
use crate::progress::{Phase, ProgressMonitor};
use crate::spec::consts::{LFH_LENGTH, MIN_SPLIT_LENGTH, SIGNATURE_LENGTH};
use crate::split::{split_marker, SplitCursor};
use crate::spec::signature::LOCAL_FILE_HEADER;
use crate::utils::{le_u16_at, le_u32_at};

use futures_lite::io::{AsyncRead, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt, SeekFrom};

/// Writes a split archive across parts created on demand, keeping each part's bytes within the split length.
struct PartWriter<W, F> {
    parts: Vec<W>,
    current: W,
    cursor: SplitCursor,
    new_part: F,
}

impl<W, F> PartWriter<W, F>
where
    W: AsyncWrite + Unpin,
    F: FnMut(u32) -> Result<W>,
{
    fn new(split_length: u64, mut new_part: F) -> Result<Self> {
        let current = new_part(0)?;
        Ok(Self { parts: Vec::new(), current, cursor: SplitCursor::new(split_length), new_part })
    }

    async fn start_part(&mut self) -> Result<()> {
        self.current.flush().await?;

        let next = (self.new_part)(self.cursor.disk)?;
        let done = std::mem::replace(&mut self.current, next);
        self.parts.push(done);

        tracing::debug!(disk = self.cursor.disk, "started split part");
        Ok(())
    }

    async fn roll(&mut self) -> Result<()> {
        self.cursor.roll();
        self.start_part().await
    }

    async fn reserve(&mut self, length: u64) -> Result<()> {
        if self.cursor.reserve(length) {
            self.start_part().await?;
        }

        Ok(())
    }

    async fn write_spanning(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let disk = self.cursor.disk;
            let chunk = self.cursor.next_chunk(data.len() as u64) as usize;

            if self.cursor.disk != disk {
                self.start_part().await?;
            }

            self.current.write_all(&data[..chunk]).await?;
            self.cursor.advance(chunk as u64);
            data = &data[chunk..];
        }

        Ok(())
    }

    /// Writes bytes which must stay within the current part, whatever its remaining space.
    async fn write_whole(&mut self, data: &[u8]) -> Result<()> {
        self.current.write_all(data).await?;
        self.cursor.advance(data.len() as u64);
        Ok(())
    }

    async fn finish(mut self) -> Result<Vec<W>> {
        self.current.flush().await?;
        self.parts.push(self.current);
        Ok(self.parts)
    }
}

/// The planned position of one entry's local header.
#[derive(Debug, Clone, Copy)]
struct Placement {
    disk: u32,
    offset: u64,
    header_length: u64,
}

/// Rewrites a single-file archive as a split archive with parts of at most `split_length` bytes.
///
/// `new_part` is called with each disk number in turn to create that part's destination; the finished
/// destinations are returned in disk order. The final one holds the central directory and end records.
///
/// Local headers never straddle two parts, though entry data may. A local header longer than the split length fails
/// with [`ZipError::LocalHeaderExceedsSplitLength`]. The central directory and end records are kept whole within the
/// final part, which may exceed the split length if they can't fit in any part. A result of a
/// single part is marked as such, and reads back as an ordinary archive.
#[tracing::instrument(skip_all)]
pub async fn split_archive<R, W, F>(
    mut reader: R,
    model: &mut ArchiveModel,
    split_length: u64,
    new_part: F,
    options: &MutationOptions,
    monitor: &ProgressMonitor,
) -> Result<Vec<W>>
where
    R: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
    F: FnMut(u32) -> Result<W>,
{
    if model.is_split_archive() {
        return Err(ZipError::InvalidOperationOnSplitArchive(SplitOperation::Split));
    }
    if split_length < MIN_SPLIT_LENGTH {
        return Err(ZipError::InvalidSplitLength(split_length));
    }

    monitor.set_phase(Phase::Planning);
    let spans = entry_spans(model);
    let prefix = prefix_length(model, &spans);

    let mut cursor = SplitCursor::new(split_length);
    cursor.advance_spanning(prefix);

    let mut placements = vec![None; model.entry_count()];
    for span in &spans {
        monitor.check_cancelled()?;

        let header_length = local_header_length(&mut reader, span).await?;
        if header_length > split_length {
            return Err(ZipError::LocalHeaderExceedsSplitLength { length: header_length, split_length });
        }

        cursor.reserve(header_length);
        placements[span.index] = Some(Placement { disk: cursor.disk, offset: cursor.position, header_length });
        cursor.advance_spanning(span.len());
    }

    let mut planned = model.clone();
    for (header, placement) in planned.file_headers_mut().iter_mut().zip(&placements) {
        if let Some(placement) = placement {
            header.local_header_offset = placement.offset;
            header.disk_number_start = placement.disk;
        }
    }

    let (planned, end_records, rolled) = plan_end_records(&planned, &mut cursor).await?;
    let total_disks = cursor.disk + 1;

    monitor.set_total_work(prefix + spans.iter().map(EntrySpan::len).sum::<u64>());

    monitor.set_phase(Phase::Copying);
    let mut writer = PartWriter::new(split_length, new_part)?;
    writer.current.write_all(&split_marker(total_disks).to_le_bytes()).await?;

    let mut buffer = options.buffer();
    copy_spanning(&mut reader, &mut writer, 0, prefix, &mut buffer, monitor).await?;

    for span in &spans {
        monitor.check_cancelled()?;
        monitor.set_file_name(Some(model.file_headers()[span.index].file_name.as_str()));

        if let Some(placement) = placements[span.index] {
            writer.reserve(placement.header_length).await?;
        }
        copy_spanning(&mut reader, &mut writer, span.start, span.end, &mut buffer, monitor).await?;
    }

    monitor.set_phase(Phase::Finalize);
    if rolled {
        writer.roll().await?;
    }
    writer.write_whole(&end_records).await?;
    let parts = writer.finish().await?;

    *model = planned;

    tracing::debug!(parts = parts.len(), "split archive");
    Ok(parts)
}

/// Reads the length of the local file header at the start of a span, checking its signature.
async fn local_header_length<R>(mut reader: R, span: &EntrySpan) -> Result<u64>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let mut fixed = [0; SIGNATURE_LENGTH + LFH_LENGTH];

    reader.seek(SeekFrom::Start(span.start)).await?;
    crate::utils::read_exact(&mut reader, &mut fixed).await?;

    let signature = le_u32_at(&fixed, 0)?;
    if signature != LOCAL_FILE_HEADER {
        return Err(ZipError::UnexpectedSignature { actual: signature, expected: LOCAL_FILE_HEADER });
    }

    let file_name_length = le_u16_at(&fixed, 26)? as u64;
    let extra_field_length = le_u16_at(&fixed, 28)? as u64;

    Ok(fixed.len() as u64 + file_name_length + extra_field_length)
}

/// Serialises the central directory and end records at the cursor, moving to a new part first if they don't fit.
///
/// Returns the model as finalised, the bytes to write, and whether a new part was started for them.
async fn plan_end_records(planned: &ArchiveModel, cursor: &mut SplitCursor) -> Result<(ArchiveModel, Vec<u8>, bool)> {
    let mut attempt = planned.clone();
    let mut bytes = Vec::new();
    finalize(&mut bytes, &mut attempt, cursor.position, cursor.disk).await?;

    let rolled = cursor.reserve(bytes.len() as u64);
    if rolled {
        attempt = planned.clone();
        bytes.clear();
        finalize(&mut bytes, &mut attempt, cursor.position, cursor.disk).await?;
    }

    Ok((attempt, bytes, rolled))
}

async fn copy_spanning<R, W, F>(
    mut reader: R,
    writer: &mut PartWriter<W, F>,
    start: u64,
    end: u64,
    buffer: &mut [u8],
    monitor: &ProgressMonitor,
) -> Result<()>
where
    R: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
    F: FnMut(u32) -> Result<W>,
{
    reader.seek(SeekFrom::Start(start)).await?;
    let mut remaining = end.saturating_sub(start);

    while remaining > 0 {
        monitor.check_cancelled()?;

        let length = std::cmp::min(remaining, buffer.len() as u64) as usize;
        crate::utils::read_exact(&mut reader, &mut buffer[..length]).await?;
        writer.write_spanning(&buffer[..length]).await?;

        remaining -= length as u64;
        monitor.update_work_completed(length as u64);
    }

    Ok(())
}
