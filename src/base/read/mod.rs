// Copyright (c) 2022-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which supports reading an archive's headers.
//!
//! # Example
//! ```no_run
//! # use zip_rewrite::base::read::read_archive;
//! # use zip_rewrite::error::Result;
//! # use futures_lite::io::Cursor;
//! #
//! async fn run(data: Vec<u8>) -> Result<()> {
//!     let model = read_archive(&mut Cursor::new(data), None).await?;
//!
//!     for header in model.file_headers() {
//!         println!("{} ({} bytes)", header.file_name, header.uncompressed_size);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub(crate) mod extra;
pub mod local;
pub mod locator;

pub use local::{read_data_descriptor, read_local_file_header};

use crate::core::cdr::CentralDirectoryRecord;
use crate::core::zip64::locator::LENGTH as ZIP64_EOCDL_LENGTH;
use crate::date::ZipDateTime;
use crate::error::{Result, ZipError};
use crate::model::{
    ArchiveModel, CentralDirectory, EndOfCentralDirectoryRecord, EntryHeader, FileHeader, Zip64EndOfCentralDirectoryLocator,
    Zip64EndOfCentralDirectoryRecord, Zip64Field, Zip64Fields,
};
use crate::spec::consts::{NON_ZIP64_MAX_NUM_FILES, NON_ZIP64_MAX_SIZE};
use crate::spec::flags::GeneralPurposeFlag;
use crate::spec::signature::{CENTRAL_DIRECTORY_FILE_HEADER, DIGITAL_SIGNATURE};
use crate::string::ZipString;

use encoding_rs::Encoding;
use futures_lite::io::{AsyncRead, AsyncSeek, AsyncSeekExt, BufReader, SeekFrom};

/// The max buffer size used when parsing the central directory, equal to 20MiB.
pub(crate) const MAX_CD_BUFFER_SIZE: usize = 20 * 1024 * 1024;

/// The records found at the tail of an archive (or of the final part of a split archive).
#[derive(Debug, Clone)]
pub struct EndRecords {
    pub end_of_central_directory: EndOfCentralDirectoryRecord,
    /// Offset of the end of central directory record's signature.
    pub offset: u64,
    pub zip64_locator: Option<Zip64EndOfCentralDirectoryLocator>,
}

/// Reads an archive's headers from a seekable source.
///
/// The source must hold the whole archive, so for a split archive this only succeeds when the Zip64 record and
/// central directory live in the final part. See [`crate::tokio::fs`] for reading split archives from disk.
pub async fn read_archive<R>(mut reader: R, charset: Option<&'static Encoding>) -> Result<ArchiveModel>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let end = read_end_records(&mut reader, charset).await?;

    let zip64_record = match &end.zip64_locator {
        Some(locator) => Some(read_zip64_record(&mut reader, locator.relative_offset_eocdr).await?),
        None => None,
    };

    let mut model = assemble(end, zip64_record, charset);
    model.central_directory = read_central_directory_at(&mut reader, &model).await?;
    Ok(model)
}

/// Reads the central directory from the offset the model's end records declare.
pub async fn read_central_directory_at<R>(mut reader: R, model: &ArchiveModel) -> Result<CentralDirectory>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    reader.seek(SeekFrom::Start(model.central_directory_offset())).await?;
    let capacity = std::cmp::min(model.central_directory_size() as usize, MAX_CD_BUFFER_SIZE).max(1);
    let buffered = BufReader::with_capacity(capacity, &mut reader);

    read_central_directory(buffered, expected_entries(model), model.charset).await
}

/// Locates and reads the end of central directory record, along with the Zip64 locator preceding it if present.
#[tracing::instrument(skip(reader))]
pub async fn read_end_records<R>(mut reader: R, charset: Option<&'static Encoding>) -> Result<EndRecords>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let offset = locator::eocdr(&mut reader).await?;
    reader.seek(SeekFrom::Start(offset)).await?;

    let record = crate::core::eocdr::read(&mut reader).await?;
    let end_of_central_directory = EndOfCentralDirectoryRecord {
        raw: record.raw,
        comment: ZipString::decode_comment(record.zip_file_comment, charset),
    };

    let zip64_locator = match offset.checked_sub(ZIP64_EOCDL_LENGTH) {
        Some(locator_offset) => {
            reader.seek(SeekFrom::Start(locator_offset)).await?;
            crate::core::zip64::locator::try_read(&mut reader).await?
        }
        None => None,
    };

    if zip64_locator.is_some() {
        tracing::debug!("archive is zip64");
    }

    Ok(EndRecords { end_of_central_directory, offset, zip64_locator })
}

/// Reads the Zip64 end of central directory record at the given offset.
pub async fn read_zip64_record<R>(mut reader: R, offset: u64) -> Result<Zip64EndOfCentralDirectoryRecord>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    reader.seek(SeekFrom::Start(offset)).await?;
    crate::core::zip64::eocdr::read(&mut reader).await
}

/// Builds a model (without its central directory) from the end records.
pub fn assemble(
    end: EndRecords,
    zip64_record: Option<Zip64EndOfCentralDirectoryRecord>,
    charset: Option<&'static Encoding>,
) -> ArchiveModel {
    let mut split_archive = end.end_of_central_directory.number_of_this_disk > 0;

    if let Some(record) = &zip64_record {
        split_archive |= record.number_of_this_disk > 0;
    }

    ArchiveModel {
        end_of_central_directory: end.end_of_central_directory,
        zip64_format: end.zip64_locator.is_some(),
        zip64_locator: end.zip64_locator,
        zip64_record,
        central_directory: CentralDirectory::default(),
        path: None,
        split_archive,
        charset,
    }
}

/// The number of central directory entries the end records declare.
pub fn expected_entries(model: &ArchiveModel) -> u64 {
    match (&model.zip64_record, model.zip64_format) {
        (Some(record), true) => record.total_entries_in_cd,
        _ => model.end_of_central_directory.total_entries_in_cd as u64,
    }
}

/// Reads `entries` central directory file headers, followed by the digital signature record if one is present.
///
/// The reader must be positioned at the start of the central directory.
#[tracing::instrument(skip(reader))]
pub async fn read_central_directory<R>(
    mut reader: R,
    entries: u64,
    charset: Option<&'static Encoding>,
) -> Result<CentralDirectory>
where
    R: AsyncRead + Unpin,
{
    let mut file_headers = Vec::with_capacity(std::cmp::min(entries, u16::MAX as u64) as usize);

    for index in 0..entries as usize {
        match crate::utils::read_u32(&mut reader).await {
            Ok(CENTRAL_DIRECTORY_FILE_HEADER) => (),
            Ok(_) | Err(ZipError::TruncatedInput(_)) => return Err(ZipError::CentralDirectoryEntryNotFound(index)),
            Err(error) => return Err(error),
        }

        let record = crate::core::cdr::read_after_signature(&mut reader).await?;
        file_headers.push(file_header_from_record(record, charset));
    }

    let digital_signature = match crate::utils::read_u32(&mut reader).await {
        Ok(DIGITAL_SIGNATURE) => Some(crate::core::ds::read_after_signature(&mut reader).await?),
        _ => None,
    };

    Ok(CentralDirectory { file_headers, digital_signature })
}

/// Resolves a raw central directory record into a [`FileHeader`].
pub(crate) fn file_header_from_record(record: CentralDirectoryRecord, charset: Option<&'static Encoding>) -> FileHeader {
    let CentralDirectoryRecord { raw, file_name, extra_field, file_comment } = record;
    let flag = GeneralPurposeFlag(raw.general_purpose_flag);

    let saturated = Zip64Fields::empty()
        .with(Zip64Field::UncompressedSize, raw.uncompressed_size == NON_ZIP64_MAX_SIZE)
        .with(Zip64Field::CompressedSize, raw.compressed_size == NON_ZIP64_MAX_SIZE)
        .with(Zip64Field::LocalHeaderOffset, raw.relative_offset_of_local_header == NON_ZIP64_MAX_SIZE)
        .with(Zip64Field::DiskNumberStart, raw.disk_number_start == NON_ZIP64_MAX_NUM_FILES);

    let parsed = extra::parse(&extra_field, saturated);
    let zip64 = parsed.zip64.unwrap_or_default();

    let entry = EntryHeader {
        version_needed_to_extract: raw.version_needed_to_extract,
        general_purpose_flag: flag,
        compression_method: raw.compression_method.into(),
        last_modified: ZipDateTime::from_parts(raw.last_mod_file_time, raw.last_mod_file_date),
        crc32: raw.crc_32,
        compressed_size: zip64.compressed_size.unwrap_or(raw.compressed_size as u64),
        uncompressed_size: zip64.uncompressed_size.unwrap_or(raw.uncompressed_size as u64),
        file_name: ZipString::decode(file_name, flag.utf8(), charset),
        extra_data_records: parsed.records,
        zip64_extended_info: parsed.zip64,
        aes_extra_data_record: parsed.aes,
    };

    FileHeader {
        entry,
        version_made_by: raw.version_made_by,
        file_comment: ZipString::decode(file_comment, flag.utf8(), charset),
        disk_number_start: zip64.disk_number_start.unwrap_or(raw.disk_number_start as u32),
        internal_file_attributes: raw.internal_file_attributes,
        external_file_attributes: raw.external_file_attributes,
        local_header_offset: zip64.local_header_offset.unwrap_or(raw.relative_offset_of_local_header as u64),
    }
}
