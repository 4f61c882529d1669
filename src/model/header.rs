// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::date::ZipDateTime;
use crate::model::extra::{AesExtraDataRecord, ExtraDataRecord, Zip64ExtendedInfo};
use crate::spec::compression::CompressionMethod;
use crate::spec::encryption::EncryptionMethod;
use crate::spec::flags::GeneralPurposeFlag;
use crate::string::ZipString;

/// The fields shared by local file headers and central directory file headers.
///
/// Sizes are the authoritative values, ie. with any Zip64 override already applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryHeader {
    pub version_needed_to_extract: u16,
    pub general_purpose_flag: GeneralPurposeFlag,
    pub compression_method: CompressionMethod,
    pub last_modified: ZipDateTime,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub file_name: ZipString,
    /// Sub-records other than the Zip64 and AES ones, in their on-disk order.
    pub extra_data_records: Vec<ExtraDataRecord>,
    pub zip64_extended_info: Option<Zip64ExtendedInfo>,
    pub aes_extra_data_record: Option<AesExtraDataRecord>,
}

impl EntryHeader {
    /// Derives the encryption method from the flags and the presence of an AES sub-record.
    pub fn encryption_method(&self) -> EncryptionMethod {
        if self.aes_extra_data_record.is_some() {
            EncryptionMethod::Aes
        } else if !self.general_purpose_flag.encrypted() {
            EncryptionMethod::None
        } else if self.general_purpose_flag.strong_encryption() {
            EncryptionMethod::ZipStandardVariantStrong
        } else {
            EncryptionMethod::ZipStandard
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.general_purpose_flag.encrypted()
    }

    pub fn is_directory(&self) -> bool {
        let name = self.file_name.as_str();
        name.ends_with('/') || name.ends_with('\\')
    }

    /// The compression method in effect before any AES wrapping.
    pub fn effective_compression_method(&self) -> CompressionMethod {
        match &self.aes_extra_data_record {
            Some(aes) => aes.compression_method,
            None => self.compression_method,
        }
    }

    pub fn file_name_length(&self) -> u16 {
        self.file_name.len() as u16
    }
}

macro_rules! entry_deref {
    ($from:ident) => {
        impl std::ops::Deref for $from {
            type Target = EntryHeader;

            fn deref(&self) -> &Self::Target {
                &self.entry
            }
        }

        impl std::ops::DerefMut for $from {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.entry
            }
        }
    };
}

/// A central directory file header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileHeader {
    pub entry: EntryHeader,
    pub version_made_by: u16,
    pub file_comment: ZipString,
    pub disk_number_start: u32,
    pub internal_file_attributes: u16,
    pub external_file_attributes: u32,
    pub local_header_offset: u64,
}

entry_deref!(FileHeader);

/// A local file header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalFileHeader {
    pub entry: EntryHeader,
    /// Set when the sizes were reserved within a Zip64 sub-record, so a later patch must target that sub-record
    /// rather than the fixed-size fields.
    pub write_compressed_size_in_zip64_extra_record: bool,
}

entry_deref!(LocalFileHeader);

impl From<&FileHeader> for LocalFileHeader {
    fn from(header: &FileHeader) -> Self {
        Self { entry: header.entry.clone(), write_compressed_size_in_zip64_extra_record: false }
    }
}
