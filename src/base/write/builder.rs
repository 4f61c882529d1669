// Copyright (c) 2022-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::date::builder::ZipDateTimeBuilder;
use crate::date::ZipDateTime;
use crate::error::{Result, ZipError};
use crate::model::{AesExtraDataRecord, EntryHeader, ExtraDataRecord, FileHeader};
use crate::spec::compression::CompressionMethod;
use crate::spec::encryption::{AesKeyStrength, AesVersion, EncryptionMethod};
use crate::spec::flags::GeneralPurposeFlag;
use crate::spec::version::{as_made_by, as_needed_to_extract};
use crate::string::ZipString;

use encoding_rs::Encoding;

/// A builder for a new entry's headers.
///
/// Entry data is never compressed or encrypted by this crate; the compression and encryption set here describe
/// data the caller has already transformed (see [`crate::base::write::ZipFileWriter::write_entry_raw`]).
#[derive(Debug, Clone)]
pub struct ZipEntryBuilder {
    file_name: String,
    compression: CompressionMethod,
    last_modified: ZipDateTime,
    comment: String,
    internal_file_attributes: u16,
    external_file_attributes: u32,
    encryption: EncryptionMethod,
    aes_key_strength: Option<AesKeyStrength>,
    aes_version: AesVersion,
    extra_data_records: Vec<ExtraDataRecord>,
    reserve_zip64: bool,
}

impl ZipEntryBuilder {
    /// Constructs a new builder for a stored entry with the given name.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            compression: CompressionMethod::Stored,
            last_modified: ZipDateTimeBuilder::new().year(1980).month(1).day(1).build(),
            comment: String::new(),
            internal_file_attributes: 0,
            external_file_attributes: 0,
            encryption: EncryptionMethod::None,
            aes_key_strength: None,
            aes_version: AesVersion::default(),
            extra_data_records: Vec::new(),
            reserve_zip64: false,
        }
    }

    /// Sets the entry's file name.
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Sets the compression method the entry's data was compressed with.
    pub fn compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    pub fn last_modified(mut self, last_modified: ZipDateTime) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn internal_file_attributes(mut self, attributes: u16) -> Self {
        self.internal_file_attributes = attributes;
        self
    }

    pub fn external_file_attributes(mut self, attributes: u32) -> Self {
        self.external_file_attributes = attributes;
        self
    }

    /// Sets the entry's Unix permissions mode within the upper half of the external attributes.
    pub fn unix_permissions(mut self, mode: u16) -> Self {
        self.external_file_attributes = (self.external_file_attributes & 0xFFFF) | (mode as u32) << 16;
        self
    }

    /// Sets the encryption method the entry's data was encrypted with.
    ///
    /// [`EncryptionMethod::Aes`] also requires a key strength via [`ZipEntryBuilder::aes_key_strength`].
    pub fn encryption(mut self, encryption: EncryptionMethod) -> Self {
        self.encryption = encryption;
        self
    }

    pub fn aes_key_strength(mut self, strength: AesKeyStrength) -> Self {
        self.aes_key_strength = Some(strength);
        self
    }

    pub fn aes_version(mut self, version: AesVersion) -> Self {
        self.aes_version = version;
        self
    }

    /// Appends an extra field sub-record to be written verbatim.
    pub fn extra_data_record(mut self, record: ExtraDataRecord) -> Self {
        self.extra_data_records.push(record);
        self
    }

    /// Reserves Zip64 sizes within the local file header.
    ///
    /// Needed for a seekable streamed entry which may exceed 4GiB, as its local header is written before its size
    /// is known and can't grow afterwards.
    pub fn reserve_zip64(mut self, reserve: bool) -> Self {
        self.reserve_zip64 = reserve;
        self
    }

    pub(crate) fn reserves_zip64(&self) -> bool {
        self.reserve_zip64
    }

    /// Resolves this builder into a central directory file header, without sizes, CRC or offset.
    ///
    /// Non-ASCII names and comments are stored as UTF-8 with the flag set, unless a charset override is given.
    pub(crate) fn into_file_header(self, charset: Option<&'static Encoding>) -> Result<FileHeader> {
        let (mut file_name, name_utf8) = ZipString::encode(&self.file_name, false, charset);
        let (mut file_comment, comment_utf8) = ZipString::encode(&self.comment, false, charset);

        let utf8 = name_utf8 || comment_utf8;
        if utf8 {
            file_name = ZipString::encode(&self.file_name, true, charset).0;
            file_comment = ZipString::encode(&self.comment, true, charset).0;
        }

        let mut flag = GeneralPurposeFlag::default();
        flag.set_utf8(utf8);

        let mut compression_method = self.compression;
        let aes_extra_data_record = match self.encryption {
            EncryptionMethod::Aes => {
                let strength = self.aes_key_strength.ok_or(ZipError::MissingAesParameters)?;
                compression_method = CompressionMethod::AesInternalOnly;
                Some(AesExtraDataRecord::new(strength, self.aes_version, self.compression))
            }
            _ => None,
        };

        flag.set_encrypted(!matches!(self.encryption, EncryptionMethod::None));
        flag.set_strong_encryption(matches!(self.encryption, EncryptionMethod::ZipStandardVariantStrong));

        let directory = self.file_name.ends_with('/');

        let entry = EntryHeader {
            version_needed_to_extract: as_needed_to_extract(
                self.compression,
                self.encryption,
                directory,
                self.reserve_zip64,
            ),
            general_purpose_flag: flag,
            compression_method,
            last_modified: self.last_modified,
            file_name,
            extra_data_records: self.extra_data_records,
            aes_extra_data_record,
            ..Default::default()
        };

        Ok(FileHeader {
            entry,
            version_made_by: as_made_by(),
            file_comment,
            internal_file_attributes: self.internal_file_attributes,
            external_file_attributes: self.external_file_attributes,
            ..Default::default()
        })
    }
}

impl From<String> for ZipEntryBuilder {
    fn from(file_name: String) -> Self {
        Self::new(file_name)
    }
}

impl From<&str> for ZipEntryBuilder {
    fn from(file_name: &str) -> Self {
        Self::new(file_name)
    }
}
