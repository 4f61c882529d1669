// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use std::collections::HashMap;

use crate::base::write::header::finalize;
use crate::base::write::io::offset::AsyncOffsetWriter;
use crate::error::{Result, SplitOperation, ZipError};
use crate::model::ArchiveModel;
use crate::mutate::{copy_range, entry_spans, prefix_length, MutationOptions};
use crate::progress::{Phase, ProgressMonitor};
use crate::spec::consts::{LFH_LENGTH, SIGNATURE_LENGTH};
use crate::spec::flags::GeneralPurposeFlag;
use crate::spec::signature::LOCAL_FILE_HEADER;
use crate::string::ZipString;
use crate::utils::{le_u16_at, le_u32_at};

use futures_lite::io::{AsyncRead, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt, SeekFrom};

const FIXED_LENGTH: usize = SIGNATURE_LENGTH + LFH_LENGTH;
const FLAG_OFFSET: usize = 6;
const FILE_NAME_LENGTH_OFFSET: usize = 26;

/// A new name for an entry, encoded for its header.
struct Rename {
    file_name: ZipString,
    set_utf8: bool,
}

/// Renames a single entry, failing with [`ZipError::EntryNotFound`] if it doesn't exist.
pub async fn rename_entry<R, W>(
    reader: R,
    writer: W,
    model: &mut ArchiveModel,
    name: &str,
    new_name: &str,
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

    let renames = HashMap::from([(name.to_owned(), new_name.to_owned())]);
    rename_entries(reader, writer, model, &renames, options, monitor).await
}

/// Renames entries by mapping of old name to new name, writing the resulting archive to `writer`.
///
/// Names which don't exist are skipped. Renaming a directory entry renames every entry within it by substituting
/// the common prefix. Fails with [`ZipError::NameCollision`] if a new name would duplicate another entry's.
///
/// Only the name field (and its length) of each renamed local header is rewritten; every later local header offset
/// moves by the change in encoded name length.
#[tracing::instrument(skip_all)]
pub async fn rename_entries<R, W>(
    mut reader: R,
    writer: W,
    model: &mut ArchiveModel,
    renames: &HashMap<String, String>,
    options: &MutationOptions,
    monitor: &ProgressMonitor,
) -> Result<()>
where
    R: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
{
    if model.is_split_archive() {
        return Err(ZipError::InvalidOperationOnSplitArchive(SplitOperation::Rename));
    }

    monitor.set_phase(Phase::Planning);
    let plan = plan_renames(model, renames)?;
    let spans = entry_spans(model);
    let prefix = prefix_length(model, &spans);

    monitor.set_total_work(prefix + spans.iter().map(|span| span.len()).sum::<u64>());

    monitor.set_phase(Phase::Copying);
    let mut writer = AsyncOffsetWriter::new(writer);
    let mut buffer = options.buffer();
    let mut offsets = vec![0; model.entry_count()];

    copy_range(&mut reader, &mut writer, 0, prefix, &mut buffer, monitor).await?;

    for span in &spans {
        monitor.check_cancelled()?;
        monitor.set_file_name(Some(model.file_headers()[span.index].file_name.as_str()));
        offsets[span.index] = writer.offset();

        let Some(rename) = &plan[span.index] else {
            copy_range(&mut reader, &mut writer, span.start, span.end, &mut buffer, monitor).await?;
            continue;
        };

        reader.seek(SeekFrom::Start(span.start)).await?;
        let mut fixed = [0; FIXED_LENGTH];
        crate::utils::read_exact(&mut reader, &mut fixed).await?;

        let signature = le_u32_at(&fixed, 0)?;
        if signature != LOCAL_FILE_HEADER {
            return Err(ZipError::UnexpectedSignature { actual: signature, expected: LOCAL_FILE_HEADER });
        }

        let old_length = le_u16_at(&fixed, FILE_NAME_LENGTH_OFFSET)?;
        let new_length = u16::try_from(rename.file_name.len()).map_err(|_| ZipError::FileNameTooLarge)?;

        if rename.set_utf8 {
            let mut flag = GeneralPurposeFlag(le_u16_at(&fixed, FLAG_OFFSET)?);
            flag.set_utf8(true);
            fixed[FLAG_OFFSET..FLAG_OFFSET + 2].copy_from_slice(&u16::from(flag).to_le_bytes());
        }
        fixed[FILE_NAME_LENGTH_OFFSET..FILE_NAME_LENGTH_OFFSET + 2].copy_from_slice(&new_length.to_le_bytes());

        writer.write_all(&fixed).await?;
        writer.write_all(rename.file_name.as_bytes()).await?;
        monitor.update_work_completed((FIXED_LENGTH + old_length as usize) as u64);

        let rest = span.start + (FIXED_LENGTH + old_length as usize) as u64;
        copy_range(&mut reader, &mut writer, rest, span.end, &mut buffer, monitor).await?;
    }

    monitor.set_phase(Phase::HeaderUpdate);
    for ((header, offset), rename) in model.file_headers_mut().iter_mut().zip(offsets).zip(plan) {
        header.local_header_offset = offset;

        if let Some(rename) = rename {
            tracing::debug!(from = %header.file_name, to = %rename.file_name, "renamed entry");

            if rename.set_utf8 {
                header.general_purpose_flag.set_utf8(true);
            }
            header.entry.file_name = rename.file_name;
        }
    }

    monitor.set_phase(Phase::Finalize);
    let offset = writer.offset();
    finalize(&mut writer, model, offset, 0).await
}

/// Resolves the requested renames into a new name per entry index.
///
/// Directory renames apply first, outermost directory first, so a rename of a nested directory or of an entry
/// within a renamed directory takes precedence.
fn plan_renames(model: &ArchiveModel, renames: &HashMap<String, String>) -> Result<Vec<Option<Rename>>> {
    let headers = model.file_headers();
    let mut names: Vec<Option<String>> = vec![None; headers.len()];

    let mut resolved = Vec::with_capacity(renames.len());
    for (old, new) in renames {
        match model.file_header_index(old) {
            Some(index) => resolved.push((index, new)),
            None => tracing::debug!(name = %old, "ignoring rename of missing entry"),
        }
    }

    resolved.sort_by_key(|(index, _)| {
        let header = &headers[*index];
        (!header.is_directory(), header.file_name.as_str().len(), *index)
    });

    for (index, new) in resolved {
        let header = &headers[index];

        if !header.is_directory() {
            names[index] = Some(new.clone());
            continue;
        }

        let old_prefix = header.file_name.as_str();
        let new_prefix = match new.ends_with('/') {
            true => new.clone(),
            false => format!("{new}/"),
        };

        for (other, header) in headers.iter().enumerate() {
            if let Some(rest) = header.file_name.as_str().strip_prefix(old_prefix) {
                names[other] = Some(format!("{new_prefix}{rest}"));
            }
        }
    }

    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(headers.len());
    for (header, name) in headers.iter().zip(&names) {
        *counts.entry(name.as_deref().unwrap_or(header.file_name.as_str())).or_default() += 1;
    }

    for name in names.iter().flatten() {
        if counts.get(name.as_str()).copied().unwrap_or_default() > 1 {
            return Err(ZipError::NameCollision(name.clone()));
        }
    }

    Ok(headers
        .iter()
        .zip(names)
        .map(|(header, name)| {
            let name = name?;
            let (file_name, needs_utf8) = ZipString::encode(&name, header.general_purpose_flag.utf8(), model.charset);
            Some(Rename { file_name, set_utf8: needs_utf8 && !header.general_purpose_flag.utf8() })
        })
        .collect())
}
