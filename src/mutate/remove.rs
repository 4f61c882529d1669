// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::write::header::finalize;
use crate::base::write::io::offset::AsyncOffsetWriter;
use crate::error::{Result, SplitOperation, ZipError};
use crate::model::ArchiveModel;
use crate::mutate::{copy_range, entry_spans, prefix_length, MutationOptions};
use crate::progress::{Phase, ProgressMonitor};

use futures_lite::io::{AsyncRead, AsyncSeek, AsyncWrite};

/// Removes a single entry, failing with [`ZipError::EntryNotFound`] if it doesn't exist.
///
/// Removing a directory entry also removes every entry within it.
pub async fn remove_entry<R, W>(
    reader: R,
    writer: W,
    model: &mut ArchiveModel,
    name: &str,
    options: &MutationOptions,
    monitor: &ProgressMonitor,
) -> Result<()>
where
    R: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
{
    if model.file_header(name).is_none() {
        return Err(ZipError::EntryNotFound(name.to_owned()));
    }

    remove_entries(reader, writer, model, &[name], options, monitor).await
}

/// Removes every named entry, writing the resulting archive to `writer`.
///
/// Names which don't exist are skipped. Removing a directory entry also removes every entry within it.
#[tracing::instrument(skip_all)]
pub async fn remove_entries<R, W, S>(
    mut reader: R,
    writer: W,
    model: &mut ArchiveModel,
    names: &[S],
    options: &MutationOptions,
    monitor: &ProgressMonitor,
) -> Result<()>
where
    R: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
    S: AsRef<str>,
{
    if model.is_split_archive() {
        return Err(ZipError::InvalidOperationOnSplitArchive(SplitOperation::Remove));
    }

    monitor.set_phase(Phase::Planning);
    let removed = removal_set(model, names);
    let spans = entry_spans(model);
    let prefix = prefix_length(model, &spans);

    let total = prefix + spans.iter().filter(|span| !removed[span.index]).map(|span| span.len()).sum::<u64>();
    monitor.set_total_work(total);

    monitor.set_phase(Phase::Copying);
    let mut writer = AsyncOffsetWriter::new(writer);
    let mut buffer = options.buffer();
    let mut offsets = vec![None; model.entry_count()];

    copy_range(&mut reader, &mut writer, 0, prefix, &mut buffer, monitor).await?;

    for span in &spans {
        monitor.check_cancelled()?;

        if removed[span.index] {
            continue;
        }

        monitor.set_file_name(Some(model.file_headers()[span.index].file_name.as_str()));
        offsets[span.index] = Some(writer.offset());
        copy_range(&mut reader, &mut writer, span.start, span.end, &mut buffer, monitor).await?;
    }

    monitor.set_phase(Phase::HeaderUpdate);
    let headers = std::mem::take(model.file_headers_mut());
    let before = headers.len();

    *model.file_headers_mut() = headers
        .into_iter()
        .zip(offsets)
        .filter_map(|(mut header, offset)| {
            header.local_header_offset = offset?;
            Some(header)
        })
        .collect();

    tracing::debug!(removed = before - model.entry_count(), "removed entries");

    monitor.set_phase(Phase::Finalize);
    let offset = writer.offset();
    finalize(&mut writer, model, offset, 0).await
}

/// Flags every entry to remove, by index.
fn removal_set<S: AsRef<str>>(model: &ArchiveModel, names: &[S]) -> Vec<bool> {
    let headers = model.file_headers();
    let mut removed = vec![false; headers.len()];

    for name in names {
        let name = name.as_ref();

        let Some(index) = model.file_header_index(name) else {
            tracing::debug!(name, "ignoring removal of missing entry");
            continue;
        };

        removed[index] = true;

        if headers[index].is_directory() {
            let prefix = headers[index].file_name.as_str();

            for (other, header) in headers.iter().enumerate() {
                if header.file_name.as_str().starts_with(prefix) {
                    removed[other] = true;
                }
            }
        }
    }

    removed
}
