// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Sub-records carried within a header's extra field.

use crate::error::{Result, ZipError};
use crate::spec::compression::CompressionMethod;
use crate::spec::consts::{AES_EXTRA_FIELD_DATA_LENGTH, AES_EXTRA_FIELD_ID, ZIP64_EXTRA_FIELD_ID};
use crate::spec::encryption::{AesKeyStrength, AesVersion};
use crate::utils::{put_u16, put_u32, put_u64, SliceReader};

/// An extra field sub-record this crate doesn't interpret, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraDataRecord {
    pub header_id: u16,
    pub data: Vec<u8>,
}

impl ExtraDataRecord {
    pub fn new(header_id: u16, data: Vec<u8>) -> Self {
        Self { header_id, data }
    }

    /// The length of this record on disk, including its four-byte header.
    pub fn len(&self) -> usize {
        crate::spec::consts::EXTRA_FIELD_HEADER_LENGTH + self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A field of a header which may be overridden by the Zip64 extended information sub-record.
///
/// The variants are declared in the order their values appear within the sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zip64Field {
    UncompressedSize,
    CompressedSize,
    LocalHeaderOffset,
    DiskNumberStart,
}

impl Zip64Field {
    pub const ORDER: [Zip64Field; 4] = [
        Zip64Field::UncompressedSize,
        Zip64Field::CompressedSize,
        Zip64Field::LocalHeaderOffset,
        Zip64Field::DiskNumberStart,
    ];

    /// The width in bytes of this field within the sub-record.
    pub fn width(self) -> usize {
        match self {
            Zip64Field::DiskNumberStart => 4,
            _ => 8,
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// The set of header fields which were saturated to their sentinel, and so are carried by the Zip64 sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Zip64Fields(u8);

impl Zip64Fields {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn with(mut self, field: Zip64Field, present: bool) -> Self {
        if present {
            self.0 |= field.bit();
        }
        self
    }

    pub fn contains(&self, field: Zip64Field) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained fields in sub-record order.
    pub fn iter(self) -> impl Iterator<Item = Zip64Field> {
        Zip64Field::ORDER.into_iter().filter(move |field| self.contains(*field))
    }
}

/// Zip64 extended information (header ID `0x0001`).
///
/// Each value is only present when the owning header saturated the matching fixed-size field. `None` means the
/// fixed-size field is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Zip64ExtendedInfo {
    pub uncompressed_size: Option<u64>,
    pub compressed_size: Option<u64>,
    pub local_header_offset: Option<u64>,
    pub disk_number_start: Option<u32>,
}

impl Zip64ExtendedInfo {
    /// Decodes the sub-record's payload given which fields the owning header saturated.
    ///
    /// Fields are consumed strictly in [`Zip64Field::ORDER`]; a field which wasn't saturated occupies no space. A
    /// payload which ends before every saturated field is read leaves the remaining fields unset.
    pub fn decode(data: &[u8], saturated: Zip64Fields) -> Self {
        let mut reader = SliceReader::new(data);
        let mut info = Self::default();

        for field in saturated.iter() {
            if reader.remaining() < field.width() {
                tracing::debug!(?field, "zip64 extended information ended before all saturated fields");
                break;
            }

            // Width checked above.
            let value = match field.width() {
                4 => reader.u32_le().map(u64::from),
                _ => reader.u64_le(),
            };

            if let Ok(value) = value {
                info.set(field, value);
            }
        }

        info
    }

    /// Encodes the present fields in sub-record order.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(28);

        for field in self.fields().iter() {
            let value = self.get(field).unwrap_or_default();
            match field.width() {
                4 => put_u32(&mut data, value as u32),
                _ => put_u64(&mut data, value),
            }
        }

        data
    }

    pub fn fields(&self) -> Zip64Fields {
        Zip64Fields::empty()
            .with(Zip64Field::UncompressedSize, self.uncompressed_size.is_some())
            .with(Zip64Field::CompressedSize, self.compressed_size.is_some())
            .with(Zip64Field::LocalHeaderOffset, self.local_header_offset.is_some())
            .with(Zip64Field::DiskNumberStart, self.disk_number_start.is_some())
    }

    pub fn get(&self, field: Zip64Field) -> Option<u64> {
        match field {
            Zip64Field::UncompressedSize => self.uncompressed_size,
            Zip64Field::CompressedSize => self.compressed_size,
            Zip64Field::LocalHeaderOffset => self.local_header_offset,
            Zip64Field::DiskNumberStart => self.disk_number_start.map(u64::from),
        }
    }

    pub fn set(&mut self, field: Zip64Field, value: u64) {
        match field {
            Zip64Field::UncompressedSize => self.uncompressed_size = Some(value),
            Zip64Field::CompressedSize => self.compressed_size = Some(value),
            Zip64Field::LocalHeaderOffset => self.local_header_offset = Some(value),
            Zip64Field::DiskNumberStart => self.disk_number_start = Some(value as u32),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    pub fn as_record(&self) -> ExtraDataRecord {
        ExtraDataRecord::new(ZIP64_EXTRA_FIELD_ID, self.encode())
    }
}

/// AE-x encryption parameters (header ID `0x9901`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AesExtraDataRecord {
    pub version: AesVersion,
    pub vendor_id: [u8; 2],
    pub key_strength: AesKeyStrength,
    /// The compression method applied before encryption.
    pub compression_method: CompressionMethod,
}

impl AesExtraDataRecord {
    pub const VENDOR_ID: [u8; 2] = *b"AE";

    pub fn new(key_strength: AesKeyStrength, version: AesVersion, compression_method: CompressionMethod) -> Self {
        Self { version, vendor_id: Self::VENDOR_ID, key_strength, compression_method }
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != AES_EXTRA_FIELD_DATA_LENGTH as usize {
            return Err(ZipError::CorruptExtraField("AES extra field has an unexpected length"));
        }

        let mut reader = SliceReader::new(data);
        let version = AesVersion::try_from(reader.u16_le()?)?;
        let vendor_id = reader.take_array()?;
        let key_strength = AesKeyStrength::try_from(reader.u8()?)?;
        let compression_method = CompressionMethod::from(reader.u16_le()?);

        Ok(Self { version, vendor_id, key_strength, compression_method })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(AES_EXTRA_FIELD_DATA_LENGTH as usize);
        put_u16(&mut data, self.version.into());
        data.extend_from_slice(&self.vendor_id);
        data.push(self.key_strength.into());
        put_u16(&mut data, self.compression_method.into());
        data
    }

    pub fn as_record(&self) -> ExtraDataRecord {
        ExtraDataRecord::new(AES_EXTRA_FIELD_ID, self.encode())
    }
}
