// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::{raw, raw_deref};
use crate::utils::{read_u16, write_u16};

use futures_lite::io::AsyncWriteExt;

raw! {
    RawExtensibleDataField {
        // Header ID - 2 bytes
        header_id, u16, read_u16, write_u16,
        // Data Size - 2 bytes
        data_size, u16, read_u16, write_u16
    }
}

/// A single (id, size, payload) sub-record of a header's extra field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensibleDataField {
    pub raw: RawExtensibleDataField,
    pub data: Vec<u8>,
}

raw_deref!(ExtensibleDataField, RawExtensibleDataField);

/// Writes an extensible data field to the provided writer.
///
/// This function does so by:
/// - writing the raw extensible data field
/// - writing the data of the extensible data field
#[tracing::instrument(skip(writer, field))]
pub async fn write(mut writer: impl AsyncWrite + Unpin, field: &ExtensibleDataField) -> Result<()> {
    raw_write(&mut writer, &field.raw).await?;
    writer.write_all(&field.data).await?;
    Ok(())
}
