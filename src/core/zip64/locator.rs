// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::raw;
use crate::utils::{read_u32, read_u64, write_u32, write_u64};

pub const SIGNATURE: u32 = crate::spec::signature::ZIP64_END_OF_CENTRAL_DIRECTORY_LOCATOR;

/// The locator's length on disk, signature included.
pub const LENGTH: u64 = 20;

raw! {
    RawZip64EndOfCentralDirectoryLocator {
        // number of the disk with the start of the zip64 end of central directory - 4 bytes
        disk_with_start_eocdr, u32, read_u32, write_u32,
        // relative offset of the zip64 end of central directory record - 8 bytes
        relative_offset_eocdr, u64, read_u64, write_u64,
        // total number of disks - 4 bytes
        total_disks, u32, read_u32, write_u32
    }
}

/// Reads the ZIP64 end of central directory locator if one is present.
///
/// The signature is tested first; on a mismatch `None` is returned since the locator is optional.
#[tracing::instrument(skip(reader))]
pub async fn try_read(mut reader: impl AsyncRead + Unpin) -> Result<Option<RawZip64EndOfCentralDirectoryLocator>> {
    if read_u32(&mut reader).await? != SIGNATURE {
        return Ok(None);
    }

    Ok(Some(raw_read(&mut reader).await?))
}

/// Writes the ZIP64 end of central directory locator to the given writer.
#[tracing::instrument(skip(writer))]
pub async fn write(mut writer: impl AsyncWrite + Unpin, locator: &RawZip64EndOfCentralDirectoryLocator) -> Result<()> {
    write_u32(&mut writer, SIGNATURE).await?;
    raw_write(&mut writer, locator).await?;
    Ok(())
}
