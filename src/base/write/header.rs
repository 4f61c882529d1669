// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Encoding of headers and end records, including the per-field Zip64 promotion decisions.

use crate::core::cdr::{CentralDirectoryRecord, RawCentralDirectoryRecord};
use crate::core::eocdr::RawEndOfCentralDirectoryRecord;
use crate::core::lfh::{LocalFileHeaderRecord, RawLocalFileHeader};
use crate::core::zip64::eocdr::RawZip64EndOfCentralDirectoryRecord;
use crate::error::{Result, ZipError};
use crate::model::{
    ArchiveModel, DataDescriptor, EntryHeader, FileHeader, LocalFileHeader, Zip64EndOfCentralDirectoryLocator,
    Zip64EndOfCentralDirectoryRecord, Zip64ExtendedInfo,
};
use crate::spec::consts::{NON_ZIP64_MAX_NUM_FILES, NON_ZIP64_MAX_SIZE, ZIP64_EOCDR_SIZE_OF_RECORD, ZIP64_SIZE_PROMOTION_MARGIN};
use crate::spec::consts::{AES_EXTRA_FIELD_ID, ZIP64_EXTRA_FIELD_ID};
use crate::spec::version::{as_made_by, ZIP64_VERSION_NEEDED};
use crate::utils::put_u16;

use futures_lite::io::{AsyncWrite, AsyncWriteExt};

/// Whether an entry's sizes must be carried by a Zip64 sub-record.
///
/// The uncompressed size is promoted once it comes within [`ZIP64_SIZE_PROMOTION_MARGIN`] of the 32-bit limit; an
/// uncompressed size of exactly `0xFFFFFFFF - margin` still fits.
pub fn requires_zip64_sizes(compressed_size: u64, uncompressed_size: u64) -> bool {
    uncompressed_size.saturating_add(ZIP64_SIZE_PROMOTION_MARGIN) > NON_ZIP64_MAX_SIZE as u64
        || compressed_size >= NON_ZIP64_MAX_SIZE as u64
}

/// Whether a local header offset must be carried by a Zip64 sub-record.
pub fn requires_zip64_offset(offset: u64) -> bool {
    offset >= NON_ZIP64_MAX_SIZE as u64
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(NON_ZIP64_MAX_SIZE)
}

fn saturate_u16(value: u64) -> u16 {
    u16::try_from(value).unwrap_or(NON_ZIP64_MAX_NUM_FILES)
}

/// Encodes an extra field: the Zip64 sub-record first, then the AES one, then everything else in order.
pub(crate) fn encode_extra_field(entry: &EntryHeader) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    let zip64 = entry.zip64_extended_info.filter(|info| !info.is_empty()).map(|info| info.as_record());
    let aes = entry.aes_extra_data_record.map(|aes| aes.as_record());

    let others = entry
        .extra_data_records
        .iter()
        .filter(|record| record.header_id != ZIP64_EXTRA_FIELD_ID && record.header_id != AES_EXTRA_FIELD_ID);

    for record in zip64.iter().chain(aes.iter()).chain(others) {
        put_u16(&mut buffer, record.header_id);
        put_u16(&mut buffer, u16::try_from(record.data.len()).map_err(|_| ZipError::ExtraFieldTooLarge)?);
        buffer.extend_from_slice(&record.data);
    }

    if buffer.len() > u16::MAX as usize {
        return Err(ZipError::ExtraFieldTooLarge);
    }

    Ok(buffer)
}

/// Builds the on-disk form of a local file header.
///
/// Sizes are promoted to Zip64 if they need it or if the header asks for them to be reserved there. Either way the
/// header's Zip64 information is updated to match what gets written, and the returned flag reports whether Zip64
/// was used.
pub fn local_file_header_record(header: &mut LocalFileHeader) -> Result<(LocalFileHeaderRecord, bool)> {
    let promote = header.write_compressed_size_in_zip64_extra_record
        || requires_zip64_sizes(header.compressed_size, header.uncompressed_size);

    header.write_compressed_size_in_zip64_extra_record = promote;
    header.entry.zip64_extended_info = promote.then(|| Zip64ExtendedInfo {
        uncompressed_size: Some(header.uncompressed_size),
        compressed_size: Some(header.compressed_size),
        ..Default::default()
    });

    let (compressed_size, uncompressed_size) = match promote {
        true => (NON_ZIP64_MAX_SIZE, NON_ZIP64_MAX_SIZE),
        false => (header.compressed_size as u32, header.uncompressed_size as u32),
    };

    let file_name = header.file_name.as_bytes().to_vec();
    let extra_field = encode_extra_field(&header.entry)?;

    let raw = RawLocalFileHeader {
        version_needed_to_extract: header.version_needed_to_extract,
        general_purpose_flag: header.general_purpose_flag.into(),
        compression_method: header.compression_method.into(),
        last_mod_file_time: header.last_modified.time(),
        last_mod_file_date: header.last_modified.date(),
        crc_32: header.crc32,
        compressed_size,
        uncompressed_size,
        file_name_length: u16::try_from(file_name.len()).map_err(|_| ZipError::FileNameTooLarge)?,
        extra_field_length: extra_field.len() as u16,
    };

    Ok((LocalFileHeaderRecord { raw, file_name, extra_field }, promote))
}

/// Writes a local file header, marking the model as Zip64 if the header needed it.
#[tracing::instrument(skip(writer, model, header))]
pub async fn write_local_file_header<W>(writer: W, model: &mut ArchiveModel, header: &mut LocalFileHeader) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let (record, zip64) = local_file_header_record(header)?;
    model.zip64_format |= zip64;
    crate::core::lfh::write(writer, &record).await
}

/// Builds the on-disk form of a central directory file header.
///
/// Sizes, the local header offset and the disk number are each promoted independently; the header's Zip64
/// information is replaced with exactly the promoted fields.
pub fn central_directory_record(header: &mut FileHeader) -> Result<(CentralDirectoryRecord, bool)> {
    let sizes = requires_zip64_sizes(header.compressed_size, header.uncompressed_size);
    let offset = requires_zip64_offset(header.local_header_offset);
    let disk = header.disk_number_start >= NON_ZIP64_MAX_NUM_FILES as u32;

    let info = Zip64ExtendedInfo {
        uncompressed_size: sizes.then_some(header.uncompressed_size),
        compressed_size: sizes.then_some(header.compressed_size),
        local_header_offset: offset.then_some(header.local_header_offset),
        disk_number_start: disk.then_some(header.disk_number_start),
    };

    let zip64 = !info.is_empty();
    header.entry.zip64_extended_info = zip64.then_some(info);

    let file_name = header.file_name.as_bytes().to_vec();
    let file_comment = header.file_comment.as_bytes().to_vec();
    let extra_field = encode_extra_field(&header.entry)?;

    let raw = RawCentralDirectoryRecord {
        version_made_by: header.version_made_by,
        version_needed_to_extract: header.version_needed_to_extract,
        general_purpose_flag: header.general_purpose_flag.into(),
        compression_method: header.compression_method.into(),
        last_mod_file_time: header.last_modified.time(),
        last_mod_file_date: header.last_modified.date(),
        crc_32: header.crc32,
        compressed_size: if sizes { NON_ZIP64_MAX_SIZE } else { header.compressed_size as u32 },
        uncompressed_size: if sizes { NON_ZIP64_MAX_SIZE } else { header.uncompressed_size as u32 },
        file_name_length: u16::try_from(file_name.len()).map_err(|_| ZipError::FileNameTooLarge)?,
        extra_field_length: extra_field.len() as u16,
        file_comment_length: u16::try_from(file_comment.len()).map_err(|_| ZipError::CommentTooLarge)?,
        disk_number_start: if disk { NON_ZIP64_MAX_NUM_FILES } else { header.disk_number_start as u16 },
        internal_file_attributes: header.internal_file_attributes,
        external_file_attributes: header.external_file_attributes,
        relative_offset_of_local_header: if offset { NON_ZIP64_MAX_SIZE } else { header.local_header_offset as u32 },
    };

    Ok((CentralDirectoryRecord { raw, file_name, extra_field, file_comment }, zip64))
}

/// Serialises the central directory (and digital signature, if any) into a staging buffer.
pub async fn serialize_central_directory(model: &mut ArchiveModel) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut zip64 = false;

    for header in model.central_directory.file_headers.iter_mut() {
        let (record, promoted) = central_directory_record(header)?;
        zip64 |= promoted;
        crate::core::cdr::write(&mut buffer, &record).await?;
    }

    if let Some(signature) = &model.central_directory.digital_signature {
        crate::core::ds::write(&mut buffer, signature).await?;
    }

    model.zip64_format |= zip64;
    Ok(buffer)
}

/// Writes the central directory and end records, completing an archive.
///
/// `offset` is where the central directory will start (relative to the start of its part) and `disk` is the part
/// it is written to. The directory is staged in memory first so that the end records carry its final size.
/// Every end record on the model is replaced with what was written.
#[tracing::instrument(skip(writer, model))]
pub async fn finalize<W>(mut writer: W, model: &mut ArchiveModel, offset: u64, disk: u32) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buffer = serialize_central_directory(model).await?;

    let size = buffer.len() as u64;
    let entries = model.central_directory.file_headers.len() as u64;
    let entries_on_disk =
        model.central_directory.file_headers.iter().filter(|header| header.disk_number_start == disk).count() as u64;

    if requires_zip64_offset(offset)
        || size >= NON_ZIP64_MAX_SIZE as u64
        || entries >= NON_ZIP64_MAX_NUM_FILES as u64
        || disk >= NON_ZIP64_MAX_NUM_FILES as u32
    {
        model.zip64_format = true;
    }

    if model.zip64_format {
        let extensible_data = model.zip64_record.take().map(|record| record.extensible_data).unwrap_or_default();

        let record = Zip64EndOfCentralDirectoryRecord {
            raw: RawZip64EndOfCentralDirectoryRecord {
                size_of_record: ZIP64_EOCDR_SIZE_OF_RECORD + extensible_data.len() as u64,
                version_made_by: as_made_by(),
                version_needed: ZIP64_VERSION_NEEDED,
                number_of_this_disk: disk,
                disk_with_start_of_cd: disk,
                total_entries_in_cd_on_this_disk: entries_on_disk,
                total_entries_in_cd: entries,
                size_of_cd: size,
                offset_start_of_cd: offset,
            },
            extensible_data,
        };

        let locator = Zip64EndOfCentralDirectoryLocator {
            disk_with_start_eocdr: disk,
            relative_offset_eocdr: offset + size,
            total_disks: disk + 1,
        };

        crate::core::zip64::eocdr::write(&mut buffer, &record).await?;
        crate::core::zip64::locator::write(&mut buffer, &locator).await?;

        model.zip64_record = Some(record);
        model.zip64_locator = Some(locator);
    } else {
        model.zip64_record = None;
        model.zip64_locator = None;
    }

    let comment = model.end_of_central_directory.comment.as_bytes().to_vec();

    let raw = RawEndOfCentralDirectoryRecord {
        number_of_this_disk: saturate_u16(disk as u64),
        disk_with_start_of_cd: saturate_u16(disk as u64),
        total_entries_in_cd_on_this_disk: saturate_u16(entries_on_disk),
        total_entries_in_cd: saturate_u16(entries),
        size_of_cd: saturate_u32(size),
        offset_start_of_cd: saturate_u32(offset),
        zip_file_comment_length: u16::try_from(comment.len()).map_err(|_| ZipError::CommentTooLarge)?,
    };

    crate::utils::write_u32(&mut buffer, crate::core::eocdr::SIGNATURE).await?;
    crate::core::eocdr::raw_write(&mut buffer, &raw).await?;
    buffer.extend_from_slice(&comment);

    writer.write_all(&buffer).await?;
    writer.flush().await?;

    model.end_of_central_directory.raw = raw;
    model.split_archive = disk > 0;

    tracing::debug!(entries, size, offset, disk, zip64 = model.zip64_format, "finalized archive");
    Ok(())
}

/// Writes a data descriptor for an entry whose local header deferred its sizes.
pub async fn write_data_descriptor<W>(writer: W, header: &LocalFileHeader, descriptor: &DataDescriptor) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let zip64 = header.write_compressed_size_in_zip64_extra_record
        || requires_zip64_sizes(descriptor.compressed_size, descriptor.uncompressed_size);
    crate::core::dd::write(writer, descriptor, zip64).await
}
