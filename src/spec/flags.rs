// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#444

const ENCRYPTED: u16 = 1 << 0;
const DATA_DESCRIPTOR: u16 = 1 << 3;
const STRONG_ENCRYPTION: u16 = 1 << 6;
const UTF8: u16 = 1 << 11;

/// A header's general purpose bit flag.
///
/// The raw value is retained so that bits this crate does not interpret are written back untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GeneralPurposeFlag(pub u16);

impl GeneralPurposeFlag {
    pub fn encrypted(&self) -> bool {
        self.0 & ENCRYPTED != 0
    }

    /// Whether sizes and CRC follow the entry's data in a data descriptor.
    pub fn data_descriptor(&self) -> bool {
        self.0 & DATA_DESCRIPTOR != 0
    }

    pub fn strong_encryption(&self) -> bool {
        self.0 & STRONG_ENCRYPTION != 0
    }

    /// Whether the file name and comment are encoded as UTF-8.
    pub fn utf8(&self) -> bool {
        self.0 & UTF8 != 0
    }

    pub fn set_encrypted(&mut self, value: bool) {
        self.set(ENCRYPTED, value);
    }

    pub fn set_data_descriptor(&mut self, value: bool) {
        self.set(DATA_DESCRIPTOR, value);
    }

    pub fn set_strong_encryption(&mut self, value: bool) {
        self.set(STRONG_ENCRYPTION, value);
    }

    pub fn set_utf8(&mut self, value: bool) {
        self.set(UTF8, value);
    }

    fn set(&mut self, bit: u16, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

impl From<u16> for GeneralPurposeFlag {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<GeneralPurposeFlag> for u16 {
    fn from(value: GeneralPurposeFlag) -> u16 {
        value.0
    }
}
