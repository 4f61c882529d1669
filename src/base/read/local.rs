// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Reading of local file headers and data descriptors from a forward-only stream.

use crate::core::lfh::LocalFileHeaderRecord;
use crate::date::ZipDateTime;
use crate::error::Result;
use crate::model::{DataDescriptor, EntryHeader, LocalFileHeader, Zip64Field, Zip64Fields};
use crate::spec::consts::NON_ZIP64_MAX_SIZE;
use crate::spec::flags::GeneralPurposeFlag;
use crate::string::ZipString;

use encoding_rs::Encoding;
use futures_lite::io::AsyncRead;

/// Reads a local file header, leaving the reader positioned at the start of the entry's data.
///
/// A name carrying a drive letter prefix (eg. `C:\` or `C:/`) has it stripped from its decoded text so that it is
/// treated as a relative path. The stored bytes are left untouched.
#[tracing::instrument(skip(reader))]
pub async fn read_local_file_header<R>(reader: R, charset: Option<&'static Encoding>) -> Result<LocalFileHeader>
where
    R: AsyncRead + Unpin,
{
    let record = crate::core::lfh::read(reader).await?;
    Ok(local_file_header_from_record(record, charset))
}

pub(crate) fn local_file_header_from_record(
    record: LocalFileHeaderRecord,
    charset: Option<&'static Encoding>,
) -> LocalFileHeader {
    let LocalFileHeaderRecord { raw, file_name, extra_field } = record;
    let flag = GeneralPurposeFlag(raw.general_purpose_flag);

    let saturated = Zip64Fields::empty()
        .with(Zip64Field::UncompressedSize, raw.uncompressed_size == NON_ZIP64_MAX_SIZE)
        .with(Zip64Field::CompressedSize, raw.compressed_size == NON_ZIP64_MAX_SIZE);

    let parsed = super::extra::parse(&extra_field, saturated);
    let zip64 = parsed.zip64.unwrap_or_default();

    let mut file_name = ZipString::decode(file_name, flag.utf8(), charset);
    if let Some(stripped) = strip_drive_letter(file_name.as_str()) {
        let stripped = stripped.to_owned();
        file_name.replace_text(stripped);
    }

    LocalFileHeader {
        entry: EntryHeader {
            version_needed_to_extract: raw.version_needed_to_extract,
            general_purpose_flag: flag,
            compression_method: raw.compression_method.into(),
            last_modified: ZipDateTime::from_parts(raw.last_mod_file_time, raw.last_mod_file_date),
            crc32: raw.crc_32,
            compressed_size: zip64.compressed_size.unwrap_or(raw.compressed_size as u64),
            uncompressed_size: zip64.uncompressed_size.unwrap_or(raw.uncompressed_size as u64),
            file_name,
            extra_data_records: parsed.records,
            zip64_extended_info: parsed.zip64,
            aes_extra_data_record: parsed.aes,
        },
        write_compressed_size_in_zip64_extra_record: zip64.compressed_size.is_some(),
    }
}

/// Returns the remainder of `name` after a `X:\` or `X:/` style prefix, if it has one.
pub(crate) fn strip_drive_letter(name: &str) -> Option<&str> {
    let index = name.find(":\\").or_else(|| name.find(":/"))?;
    Some(&name[index + 2..])
}

/// Reads the data descriptor following an entry's data.
///
/// Sizes are read at eight bytes wide if the entry's local header carried Zip64 sizes.
pub async fn read_data_descriptor<R>(reader: R, header: &LocalFileHeader) -> Result<DataDescriptor>
where
    R: AsyncRead + Unpin,
{
    let zip64 = header.zip64_extended_info.map(|info| info.compressed_size.is_some()).unwrap_or(false);
    crate::core::dd::read(reader, zip64).await
}
