// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::raw;
use crate::utils::{read_u32, read_u64, write_u32, write_u64};

pub const SIGNATURE: u32 = crate::spec::signature::DATA_DESCRIPTOR;

raw! {
    RawDataDescriptor {
        crc_32, u32, read_u32, write_u32,
        compressed_size, u64, read_u64, write_u64,
        uncompressed_size, u64, read_u64, write_u64
    }
}

/// Reads a data descriptor, skipping its optional signature.
///
/// Sizes are eight bytes wide when the owning entry is Zip64, and four bytes otherwise.
///
/// This function does so by:
/// - reading the first four bytes
/// - treating them as the CRC if they don't match the signature
/// - reading the sizes at the requested width
#[tracing::instrument(skip(reader))]
pub async fn read(mut reader: impl AsyncRead + Unpin, zip64: bool) -> Result<RawDataDescriptor> {
    let mut crc_32 = read_u32(&mut reader).await?;

    if crc_32 == SIGNATURE {
        crc_32 = read_u32(&mut reader).await?;
    }

    if zip64 {
        let compressed_size = read_u64(&mut reader).await?;
        let uncompressed_size = read_u64(&mut reader).await?;
        Ok(RawDataDescriptor { crc_32, compressed_size, uncompressed_size })
    } else {
        let compressed_size = read_u32(&mut reader).await? as u64;
        let uncompressed_size = read_u32(&mut reader).await? as u64;
        Ok(RawDataDescriptor { crc_32, compressed_size, uncompressed_size })
    }
}

/// Writes a data descriptor, signature included.
///
/// This function does so by:
/// - writing the signature of the data descriptor
/// - writing the CRC
/// - writing the sizes at the requested width
#[tracing::instrument(skip(writer))]
pub async fn write(mut writer: impl AsyncWrite + Unpin, descriptor: &RawDataDescriptor, zip64: bool) -> Result<()> {
    write_u32(&mut writer, SIGNATURE).await?;

    if zip64 {
        raw_write(&mut writer, descriptor).await?;
    } else {
        write_u32(&mut writer, descriptor.crc_32).await?;
        write_u32(&mut writer, descriptor.compressed_size as u32).await?;
        write_u32(&mut writer, descriptor.uncompressed_size as u32).await?;
    }

    Ok(())
}
