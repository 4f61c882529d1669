// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! In-place patching of a local file header which has already been written.
//!
//! Every patchable field is addressed through [`LocalHeaderLayout::locate`], so the byte offsets of a local header
//! are defined in one place only.

use crate::error::{Result, ZipError};
use crate::model::{LocalFileHeader, Zip64Field, Zip64Fields};
use crate::spec::consts::{EXTRA_FIELD_HEADER_LENGTH, LFH_LENGTH, SIGNATURE_LENGTH};

use futures_lite::io::{AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt, SeekFrom};

const CRC_OFFSET: u64 = 14;
const COMPRESSED_SIZE_OFFSET: u64 = 18;
const UNCOMPRESSED_SIZE_OFFSET: u64 = 22;

/// A local file header field which may be patched once its final value is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalHeaderField {
    Crc,
    CompressedSize,
    UncompressedSize,
}

/// Where a field lives relative to the start of its local header, and how wide it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLocation {
    pub offset: u64,
    pub width: usize,
}

/// The shape of a written local file header, as far as patching is concerned.
///
/// When `zip64` is set the header's Zip64 sub-record is the first in its extra field (as this crate always writes
/// it) and holds the listed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalHeaderLayout {
    pub file_name_length: u16,
    pub zip64: Option<Zip64Fields>,
}

impl LocalHeaderLayout {
    /// Derives the layout of a header as written by [`crate::base::write::header::write_local_file_header`].
    pub fn of(header: &LocalFileHeader) -> Self {
        let zip64 = match header.write_compressed_size_in_zip64_extra_record {
            true => header.zip64_extended_info.map(|info| info.fields()),
            false => None,
        };

        Self { file_name_length: header.file_name.len() as u16, zip64 }
    }

    fn zip64_data_offset(&self) -> u64 {
        (SIGNATURE_LENGTH + LFH_LENGTH + EXTRA_FIELD_HEADER_LENGTH) as u64 + self.file_name_length as u64
    }

    /// Resolves a field to its location within the header.
    ///
    /// Sizes carried by the Zip64 sub-record resolve into its data, at the sum of the widths of the fields which
    /// precede them.
    pub fn locate(&self, field: LocalHeaderField) -> FieldLocation {
        let zip64_field = match field {
            LocalHeaderField::Crc => return FieldLocation { offset: CRC_OFFSET, width: 4 },
            LocalHeaderField::CompressedSize => Zip64Field::CompressedSize,
            LocalHeaderField::UncompressedSize => Zip64Field::UncompressedSize,
        };

        if let Some(fields) = self.zip64.filter(|fields| fields.contains(zip64_field)) {
            let preceding: usize = fields.iter().take_while(|other| *other != zip64_field).map(Zip64Field::width).sum();
            return FieldLocation { offset: self.zip64_data_offset() + preceding as u64, width: zip64_field.width() };
        }

        match field {
            LocalHeaderField::CompressedSize => FieldLocation { offset: COMPRESSED_SIZE_OFFSET, width: 4 },
            _ => FieldLocation { offset: UNCOMPRESSED_SIZE_OFFSET, width: 4 },
        }
    }

    /// Encodes a value for the given field, failing if it doesn't fit the space reserved for it.
    pub fn encode(&self, field: LocalHeaderField, value: u64) -> Result<(FieldLocation, Vec<u8>)> {
        let location = self.locate(field);

        let bytes = match location.width {
            4 => u32::try_from(value).map_err(|_| ZipError::Zip64NotReserved)?.to_le_bytes().to_vec(),
            _ => value.to_le_bytes().to_vec(),
        };

        Ok((location, bytes))
    }
}

/// Overwrites a single field of the local header starting at `header_offset`.
///
/// The writer is left positioned just after the patched field.
#[tracing::instrument(skip(writer))]
pub async fn patch_local_header<W>(
    mut writer: W,
    header_offset: u64,
    layout: &LocalHeaderLayout,
    field: LocalHeaderField,
    value: u64,
) -> Result<()>
where
    W: AsyncWrite + AsyncSeek + Unpin,
{
    let (location, bytes) = layout.encode(field, value)?;

    writer.seek(SeekFrom::Start(header_offset + location.offset)).await?;
    writer.write_all(&bytes).await?;
    Ok(())
}

/// Patches the CRC and both sizes of a local header, then returns the writer to `resume_offset`.
pub async fn patch_local_header_sizes<W>(
    mut writer: W,
    header_offset: u64,
    layout: &LocalHeaderLayout,
    crc: u32,
    compressed_size: u64,
    uncompressed_size: u64,
    resume_offset: u64,
) -> Result<()>
where
    W: AsyncWrite + AsyncSeek + Unpin,
{
    // Encode everything up front so a size which doesn't fit leaves the header untouched.
    for (field, value) in [
        (LocalHeaderField::CompressedSize, compressed_size),
        (LocalHeaderField::UncompressedSize, uncompressed_size),
    ] {
        layout.encode(field, value)?;
    }

    patch_local_header(&mut writer, header_offset, layout, LocalHeaderField::Crc, crc as u64).await?;
    patch_local_header(&mut writer, header_offset, layout, LocalHeaderField::CompressedSize, compressed_size).await?;
    patch_local_header(&mut writer, header_offset, layout, LocalHeaderField::UncompressedSize, uncompressed_size)
        .await?;

    writer.seek(SeekFrom::Start(resume_offset)).await?;
    Ok(())
}
