// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Parsing of a header's extra field block into sub-records.

use crate::error::ZipError;
use crate::model::{AesExtraDataRecord, ExtraDataRecord, Zip64ExtendedInfo, Zip64Fields};
use crate::spec::consts::{AES_EXTRA_FIELD_ID, EXTRA_FIELD_HEADER_LENGTH, ZIP64_EXTRA_FIELD_ID};
use crate::utils::SliceReader;

/// The sub-records of an extra field, with the ones this crate interprets pulled out.
#[derive(Debug, Default)]
pub(crate) struct ParsedExtraField {
    pub records: Vec<ExtraDataRecord>,
    pub zip64: Option<Zip64ExtendedInfo>,
    pub aes: Option<AesExtraDataRecord>,
}

/// Walks the (id, size, payload) sub-records of an extra field block.
///
/// A declared size which overruns the remaining bytes is retried as big-endian. If that overruns too, parsing stops
/// and the records decoded so far are returned; a malformed extra field never fails its owning header.
pub(crate) fn parse_records(data: &[u8]) -> Vec<ExtraDataRecord> {
    let mut reader = SliceReader::new(data);
    let mut records = Vec::new();

    while reader.remaining() >= EXTRA_FIELD_HEADER_LENGTH {
        match next_record(&mut reader) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(%error, offset = reader.position(), "truncating corrupt extra field");
                break;
            }
        }
    }

    if reader.remaining() > 0 && reader.remaining() < EXTRA_FIELD_HEADER_LENGTH {
        tracing::debug!(remaining = reader.remaining(), "ignoring trailing extra field padding");
    }

    records
}

fn next_record(reader: &mut SliceReader<'_>) -> Result<ExtraDataRecord, ZipError> {
    let header_id = reader.u16_le()?;
    let mut size = reader.u16_le()?;

    if size as usize > reader.remaining() {
        let swapped = crate::utils::swap_u16(size);

        if swapped as usize > reader.remaining() {
            return Err(ZipError::CorruptExtraField("declared sub-record size overruns the extra field"));
        }

        tracing::debug!(header_id, size, swapped, "extra field size decoded as big-endian");
        size = swapped;
    }

    let data = reader.take(size as usize)?.to_vec();
    Ok(ExtraDataRecord::new(header_id, data))
}

/// Parses an extra field block and decodes its Zip64 and AES sub-records.
///
/// `saturated` names the fixed-size fields of the owning header which hold the Zip64 sentinel.
pub(crate) fn parse(data: &[u8], saturated: Zip64Fields) -> ParsedExtraField {
    let mut parsed = ParsedExtraField::default();

    for record in parse_records(data) {
        match record.header_id {
            ZIP64_EXTRA_FIELD_ID => {
                parsed.zip64 = Some(Zip64ExtendedInfo::decode(&record.data, saturated));
            }
            AES_EXTRA_FIELD_ID => match AesExtraDataRecord::decode(&record.data) {
                Ok(aes) => parsed.aes = Some(aes),
                Err(error) => tracing::warn!(%error, "dropping malformed AES extra field"),
            },
            _ => parsed.records.push(record),
        }
    }

    parsed
}
