// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::read::extra::{parse, parse_records};
use crate::model::{AesExtraDataRecord, Zip64ExtendedInfo, Zip64Field, Zip64Fields};
use crate::spec::compression::CompressionMethod;
use crate::spec::encryption::{AesKeyStrength, AesVersion};
use crate::tests::init_logger;

#[test]
fn well_formed_records() {
    let data = [0x34, 0x12, 0x02, 0x00, 0xAA, 0xBB, 0x78, 0x56, 0x00, 0x00];
    let records = parse_records(&data);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].header_id, 0x1234);
    assert_eq!(records[0].data, vec![0xAA, 0xBB]);
    assert_eq!(records[1].header_id, 0x5678);
    assert!(records[1].data.is_empty());
}

#[test]
fn big_endian_size_fallback() {
    init_logger();

    // A size of 0x0200 overruns, whereas its byte-swapped 0x0002 fits.
    let data = [0x34, 0x12, 0x00, 0x02, 0xAA, 0xBB];
    let records = parse_records(&data);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].data, vec![0xAA, 0xBB]);
}

#[test]
fn corrupt_record_truncates() {
    init_logger();

    // The second record's size overruns in both byte orders, so only the first survives.
    let data = [0x34, 0x12, 0x01, 0x00, 0xAA, 0x78, 0x56, 0xFF, 0x00, 0xBB];
    let records = parse_records(&data);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].header_id, 0x1234);
}

#[test]
fn trailing_padding_ignored() {
    let data = [0x34, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00];
    let records = parse_records(&data);

    assert_eq!(records.len(), 1);
}

#[test]
fn zip64_decodes_only_saturated_fields() {
    let data = 0x1_2345_6789u64.to_le_bytes();
    let saturated = Zip64Fields::empty().with(Zip64Field::LocalHeaderOffset, true);

    let info = Zip64ExtendedInfo::decode(&data, saturated);
    assert_eq!(info.local_header_offset, Some(0x1_2345_6789));
    assert_eq!(info.uncompressed_size, None);
    assert_eq!(info.compressed_size, None);

    // A payload shorter than the saturated fields leaves the rest unset.
    let saturated = saturated.with(Zip64Field::UncompressedSize, true);
    let info = Zip64ExtendedInfo::decode(&data, saturated);
    assert_eq!(info.uncompressed_size, Some(0x1_2345_6789));
    assert_eq!(info.local_header_offset, None);
}

#[test]
fn zip64_field_order() {
    let info = Zip64ExtendedInfo {
        uncompressed_size: Some(1),
        compressed_size: Some(2),
        local_header_offset: Some(3),
        disk_number_start: Some(4),
    };

    let mut expected = Vec::<u8>::new();
    expected.extend_from_slice(&1u64.to_le_bytes());
    expected.extend_from_slice(&2u64.to_le_bytes());
    expected.extend_from_slice(&3u64.to_le_bytes());
    expected.extend_from_slice(&4u32.to_le_bytes());

    assert_eq!(info.encode(), expected);
    assert_eq!(Zip64ExtendedInfo::decode(&expected, info.fields()), info);
}

#[test]
fn aes_record_is_extracted() {
    let aes = AesExtraDataRecord::new(AesKeyStrength::Aes256, AesVersion::Two, CompressionMethod::Deflate);
    let record = aes.as_record();

    let mut data = Vec::<u8>::new();
    data.extend_from_slice(&record.header_id.to_le_bytes());
    data.extend_from_slice(&(record.data.len() as u16).to_le_bytes());
    data.extend_from_slice(&record.data);
    data.extend_from_slice(&[0x34, 0x12, 0x00, 0x00]);

    let parsed = parse(&data, Zip64Fields::empty());
    assert_eq!(parsed.aes, Some(aes));
    assert_eq!(parsed.records.len(), 1);
    assert_eq!(parsed.records[0].header_id, 0x1234);
}

#[test]
fn malformed_aes_record_is_dropped() {
    init_logger();

    let data = [0x01, 0x99, 0x02, 0x00, 0x02, 0x00];
    let parsed = parse(&data, Zip64Fields::empty());

    assert!(parsed.aes.is_none());
    assert!(parsed.records.is_empty());
}
