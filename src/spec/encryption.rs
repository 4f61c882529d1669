// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::ZipError;

/// The encryption scheme an entry's data was written with.
///
/// This crate never encrypts or decrypts entry data itself; the method is derived from a header's flags and extra
/// fields so that callers can hand the data to the right cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncryptionMethod {
    #[default]
    None,
    ZipStandard,
    ZipStandardVariantStrong,
    Aes,
}

/// The key strength of an AES-encrypted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AesKeyStrength {
    Aes128,
    Aes192,
    Aes256,
}

impl AesKeyStrength {
    /// Returns the length of the salt prepended to the entry's data.
    pub fn salt_length(&self) -> usize {
        match self {
            AesKeyStrength::Aes128 => 8,
            AesKeyStrength::Aes192 => 12,
            AesKeyStrength::Aes256 => 16,
        }
    }
}

impl TryFrom<u8> for AesKeyStrength {
    type Error = ZipError;

    fn try_from(value: u8) -> Result<Self, ZipError> {
        match value {
            1 => Ok(AesKeyStrength::Aes128),
            2 => Ok(AesKeyStrength::Aes192),
            3 => Ok(AesKeyStrength::Aes256),
            _ => Err(ZipError::CorruptExtraField("unknown AES key strength")),
        }
    }
}

impl From<AesKeyStrength> for u8 {
    fn from(value: AesKeyStrength) -> u8 {
        match value {
            AesKeyStrength::Aes128 => 1,
            AesKeyStrength::Aes192 => 2,
            AesKeyStrength::Aes256 => 3,
        }
    }
}

/// The AE-x version of an AES-encrypted entry.
///
/// AE-2 entries store no CRC; integrity is carried by the authentication code instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AesVersion {
    One,
    #[default]
    Two,
}

impl TryFrom<u16> for AesVersion {
    type Error = ZipError;

    fn try_from(value: u16) -> Result<Self, ZipError> {
        match value {
            1 => Ok(AesVersion::One),
            2 => Ok(AesVersion::Two),
            _ => Err(ZipError::CorruptExtraField("unknown AES version")),
        }
    }
}

impl From<AesVersion> for u16 {
    fn from(value: AesVersion) -> u16 {
        match value {
            AesVersion::One => 1,
            AesVersion::Two => 2,
        }
    }
}
