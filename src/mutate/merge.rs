// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use std::path::PathBuf;

use crate::base::write::header::finalize;
use crate::base::write::io::offset::AsyncOffsetWriter;
use crate::error::{Result, ZipError};
use crate::model::ArchiveModel;
use crate::mutate::{copy_range, MutationOptions};
use crate::progress::{Phase, ProgressMonitor};
use crate::split::{is_split_marker, part_path, SPLIT_MARKER_LENGTH};

use futures_lite::io::{AsyncRead, AsyncSeek, AsyncSeekExt, AsyncWrite, SeekFrom};

/// Where a part's bytes landed within the merged archive.
#[derive(Debug, Clone, Copy)]
struct PartPlacement {
    /// Bytes of the part skipped at its start (the split marker).
    skipped: u64,
    /// Offset within the merged archive of the first byte kept.
    base: u64,
}

/// Concatenates the parts of a split archive (in disk order) into a single archive written to `writer`.
///
/// The split marker opening the first part is dropped. Every local header offset is rebased onto the merged
/// archive and every disk number is zeroed.
#[tracing::instrument(skip_all)]
pub async fn merge_split_archive<R, W>(
    parts: &mut [R],
    writer: W,
    model: &mut ArchiveModel,
    options: &MutationOptions,
    monitor: &ProgressMonitor,
) -> Result<()>
where
    R: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
{
    if !model.is_split_archive() {
        return Err(ZipError::NotASplitArchive);
    }

    monitor.set_phase(Phase::Planning);
    let cd_disk = model.central_directory_disk();
    let cd_offset = model.central_directory_offset();
    let total_disks = model.this_disk() + 1;

    if parts.len() <= cd_disk as usize {
        return Err(ZipError::MissingSplitPart(missing_part(model, parts.len() as u32, total_disks)));
    }

    let mut ranges = Vec::with_capacity(cd_disk as usize + 1);
    for (disk, part) in parts.iter_mut().enumerate().take(cd_disk as usize + 1) {
        let end = match disk as u32 == cd_disk {
            true => cd_offset,
            false => part.seek(SeekFrom::End(0)).await?,
        };

        let mut skipped = 0;
        if disk == 0 && end >= SPLIT_MARKER_LENGTH {
            part.seek(SeekFrom::Start(0)).await?;
            let mut leading = [0; 4];
            crate::utils::read_exact(&mut *part, &mut leading).await?;

            if is_split_marker(leading) {
                skipped = SPLIT_MARKER_LENGTH;
            }
        }

        ranges.push((skipped, end));
    }

    monitor.set_total_work(ranges.iter().map(|(start, end)| end.saturating_sub(*start)).sum());

    monitor.set_phase(Phase::Copying);
    let mut writer = AsyncOffsetWriter::new(writer);
    let mut buffer = options.buffer();
    let mut placements = Vec::with_capacity(ranges.len());

    for (part, (start, end)) in parts.iter_mut().zip(&ranges) {
        monitor.check_cancelled()?;

        placements.push(PartPlacement { skipped: *start, base: writer.offset() });
        copy_range(&mut *part, &mut writer, *start, *end, &mut buffer, monitor).await?;
    }

    monitor.set_phase(Phase::HeaderUpdate);
    for header in model.file_headers_mut().iter_mut() {
        let Some(placement) = placements.get(header.disk_number_start as usize) else {
            return Err(ZipError::MissingSplitPart(PathBuf::from(format!("disk {}", header.disk_number_start))));
        };

        header.local_header_offset = placement.base + header.local_header_offset.saturating_sub(placement.skipped);
        header.disk_number_start = 0;
    }

    monitor.set_phase(Phase::Finalize);
    let offset = writer.offset();
    finalize(&mut writer, model, offset, 0).await?;

    tracing::debug!(parts = placements.len(), "merged split archive");
    Ok(())
}

fn missing_part(model: &ArchiveModel, disk: u32, total_disks: u32) -> PathBuf {
    match &model.path {
        Some(path) => part_path(path, disk, total_disks),
        None => PathBuf::from(format!("disk {disk}")),
    }
}
