// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::spec::compression::CompressionMethod;
use crate::spec::encryption::EncryptionMethod;

/// The version of the specification this crate implements (6.3).
pub const SPEC_VERSION_MADE_BY: u16 = 63;

/// Zip64 structures require version 4.5.
pub const ZIP64_VERSION_NEEDED: u16 = 45;

/// AES encryption requires version 5.1.
pub const AES_VERSION_NEEDED: u16 = 51;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#443
pub fn as_needed_to_extract(
    compression: CompressionMethod,
    encryption: EncryptionMethod,
    directory: bool,
    zip64: bool,
) -> u16 {
    let mut version = match compression {
        CompressionMethod::Deflate => 20,
        _ => 10,
    };

    if directory || matches!(encryption, EncryptionMethod::ZipStandard) {
        version = std::cmp::max(version, 20);
    }

    if zip64 {
        version = std::cmp::max(version, ZIP64_VERSION_NEEDED);
    }

    if matches!(encryption, EncryptionMethod::Aes) {
        version = std::cmp::max(version, AES_VERSION_NEEDED);
    }

    version
}

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#442
pub fn as_made_by() -> u16 {
    // Unix host compatibility in the upper byte.
    (3 << 8) | SPEC_VERSION_MADE_BY
}
