// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::{raw, raw_deref};
use crate::utils::{read_u16, write_u16};

use futures_lite::io::AsyncWriteExt;

pub const SIGNATURE: u32 = crate::spec::signature::DIGITAL_SIGNATURE;

raw! {
    RawDigitalSignature {
        size_of_data, u16, read_u16, write_u16
    }
}

/// The optional digital signature record trailing the central directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigitalSignatureRecord {
    pub raw: RawDigitalSignature,
    pub signature_data: Vec<u8>,
}

raw_deref!(DigitalSignatureRecord, RawDigitalSignature);

/// Reads a digital signature record whose signature has already been consumed by the caller.
#[tracing::instrument(skip(reader))]
pub async fn read_after_signature(mut reader: impl AsyncRead + Unpin) -> Result<DigitalSignatureRecord> {
    let raw = raw_read(&mut reader).await?;
    let signature_data = crate::utils::read_bytes(&mut reader, raw.size_of_data as usize).await?;

    Ok(DigitalSignatureRecord { raw, signature_data })
}

#[tracing::instrument(skip(writer, record))]
pub async fn write(mut writer: impl AsyncWrite + Unpin, record: &DigitalSignatureRecord) -> Result<()> {
    crate::utils::write_u32(&mut writer, SIGNATURE).await?;

    raw_write(&mut writer, &record.raw).await?;
    writer.write_all(&record.signature_data).await?;

    Ok(())
}
