// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::model::EntryHeader;
use crate::model::AesExtraDataRecord;
use crate::spec::compression::CompressionMethod;
use crate::spec::encryption::{AesKeyStrength, AesVersion, EncryptionMethod};
use crate::spec::flags::GeneralPurposeFlag;
use crate::spec::version::{as_needed_to_extract, ZIP64_VERSION_NEEDED};

#[test]
fn flag_bits() {
    let mut flag = GeneralPurposeFlag::default();

    flag.set_encrypted(true);
    flag.set_data_descriptor(true);
    flag.set_strong_encryption(true);
    flag.set_utf8(true);
    assert_eq!(u16::from(flag), 0b0000_1000_0100_1001);

    flag.set_data_descriptor(false);
    assert!(!flag.data_descriptor());
    assert!(flag.encrypted() && flag.strong_encryption() && flag.utf8());
}

#[test]
fn unknown_flag_bits_round_trip() {
    let flag = GeneralPurposeFlag::from(0xF7B6);
    assert_eq!(u16::from(flag), 0xF7B6);
}

#[test]
fn compression_method_values() {
    assert_eq!(CompressionMethod::from(0), CompressionMethod::Stored);
    assert_eq!(CompressionMethod::from(8), CompressionMethod::Deflate);
    assert_eq!(CompressionMethod::from(99), CompressionMethod::AesInternalOnly);
    assert_eq!(CompressionMethod::from(12), CompressionMethod::Other(12));
    assert_eq!(u16::from(CompressionMethod::Other(12)), 12);
}

#[test]
fn encryption_method_derivation() {
    let mut header = EntryHeader::default();
    assert_eq!(header.encryption_method(), EncryptionMethod::None);

    header.general_purpose_flag.set_encrypted(true);
    assert_eq!(header.encryption_method(), EncryptionMethod::ZipStandard);

    header.general_purpose_flag.set_strong_encryption(true);
    assert_eq!(header.encryption_method(), EncryptionMethod::ZipStandardVariantStrong);

    header.aes_extra_data_record =
        Some(AesExtraDataRecord::new(AesKeyStrength::Aes128, AesVersion::One, CompressionMethod::Deflate));
    assert_eq!(header.encryption_method(), EncryptionMethod::Aes);
    assert_eq!(header.effective_compression_method(), CompressionMethod::Deflate);
}

#[test]
fn version_needed() {
    assert_eq!(as_needed_to_extract(CompressionMethod::Stored, EncryptionMethod::None, false, false), 10);
    assert_eq!(as_needed_to_extract(CompressionMethod::Deflate, EncryptionMethod::None, false, false), 20);
    assert_eq!(as_needed_to_extract(CompressionMethod::Stored, EncryptionMethod::None, true, false), 20);
    assert_eq!(as_needed_to_extract(CompressionMethod::Stored, EncryptionMethod::None, false, true), ZIP64_VERSION_NEEDED);
    assert_eq!(as_needed_to_extract(CompressionMethod::Deflate, EncryptionMethod::Aes, false, false), 51);
}
