// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::{raw, raw_deref};
use crate::utils::{read_u16, read_u32, write_u16, write_u32};

use futures_lite::io::AsyncWriteExt;

pub const SIGNATURE: u32 = crate::spec::signature::END_OF_CENTRAL_DIRECTORY;

raw! {
    RawEndOfCentralDirectoryRecord {
        number_of_this_disk, u16, read_u16, write_u16,
        disk_with_start_of_cd, u16, read_u16, write_u16,
        total_entries_in_cd_on_this_disk, u16, read_u16, write_u16,
        total_entries_in_cd, u16, read_u16, write_u16,
        size_of_cd, u32, read_u32, write_u32,
        offset_start_of_cd, u32, read_u32, write_u32,
        zip_file_comment_length, u16, read_u16, write_u16
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndOfCentralDirectoryRecord {
    pub raw: RawEndOfCentralDirectoryRecord,
    pub zip_file_comment: Vec<u8>,
}

raw_deref!(EndOfCentralDirectoryRecord, RawEndOfCentralDirectoryRecord);

/// Reads the end of central directory record from the given reader.
///
/// This function does so by:
/// - asserting the signature of the end of central directory record
/// - reading the raw end of central directory record
/// - reading the zip file comment
///
/// A comment cut short by the end of the data is kept as far as it goes; archives with an overstated comment length
/// are common enough that rejecting them outright isn't useful.
#[tracing::instrument(skip(reader))]
pub async fn read(mut reader: impl AsyncRead + Unpin) -> Result<EndOfCentralDirectoryRecord> {
    use futures_lite::io::AsyncReadExt;

    crate::utils::assert_signature(&mut reader, SIGNATURE).await?;

    let raw = raw_read(&mut reader).await?;
    let mut zip_file_comment = Vec::with_capacity(raw.zip_file_comment_length as usize);
    (&mut reader).take(raw.zip_file_comment_length as u64).read_to_end(&mut zip_file_comment).await?;

    Ok(EndOfCentralDirectoryRecord { raw, zip_file_comment })
}

/// Writes the end of central directory record to the given writer.
///
/// This function does so by:
/// - writing the signature of the end of central directory record
/// - writing the raw end of central directory record
/// - writing the zip file comment
#[tracing::instrument(skip(writer, record))]
pub async fn write(mut writer: impl AsyncWrite + Unpin, record: &EndOfCentralDirectoryRecord) -> Result<()> {
    crate::utils::write_u32(&mut writer, SIGNATURE).await?;

    raw_write(&mut writer, &record.raw).await?;
    writer.write_all(&record.zip_file_comment).await?;

    Ok(())
}
