// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! The in-memory model of an archive's headers.
//!
//! An [`ArchiveModel`] is populated by [`crate::base::read::read_archive`], modified by the mutation engine, and
//! serialised back to bytes by [`crate::base::write::header::finalize`].

pub mod extra;
pub mod header;

use std::path::PathBuf;

use encoding_rs::Encoding;

use crate::core::eocdr::RawEndOfCentralDirectoryRecord;
use crate::core::raw_deref;
use crate::string::ZipString;

pub use crate::core::dd::RawDataDescriptor as DataDescriptor;
pub use crate::core::ds::DigitalSignatureRecord as DigitalSignature;
pub use crate::core::zip64::eocdr::Zip64EndOfCentralDirectoryRecord;
pub use crate::core::zip64::locator::RawZip64EndOfCentralDirectoryLocator as Zip64EndOfCentralDirectoryLocator;
pub use extra::{AesExtraDataRecord, ExtraDataRecord, Zip64ExtendedInfo, Zip64Field, Zip64Fields};
pub use header::{EntryHeader, FileHeader, LocalFileHeader};

/// The end of central directory record, with its comment decoded.
///
/// Counts and offsets hold the values as stored, which are saturated when the archive is Zip64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectoryRecord {
    pub raw: RawEndOfCentralDirectoryRecord,
    pub comment: ZipString,
}

raw_deref!(EndOfCentralDirectoryRecord, RawEndOfCentralDirectoryRecord);

impl Default for EndOfCentralDirectoryRecord {
    fn default() -> Self {
        Self {
            raw: RawEndOfCentralDirectoryRecord {
                number_of_this_disk: 0,
                disk_with_start_of_cd: 0,
                total_entries_in_cd_on_this_disk: 0,
                total_entries_in_cd: 0,
                size_of_cd: 0,
                offset_start_of_cd: 0,
                zip_file_comment_length: 0,
            },
            comment: ZipString::default(),
        }
    }
}

/// The archive's central directory, in on-disk order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CentralDirectory {
    pub file_headers: Vec<FileHeader>,
    pub digital_signature: Option<DigitalSignature>,
}

/// The root aggregate of an archive's headers.
#[derive(Debug, Clone, Default)]
pub struct ArchiveModel {
    pub end_of_central_directory: EndOfCentralDirectoryRecord,
    pub zip64_locator: Option<Zip64EndOfCentralDirectoryLocator>,
    pub zip64_record: Option<Zip64EndOfCentralDirectoryRecord>,
    pub central_directory: CentralDirectory,
    /// Where the archive lives on disk, if anywhere. For a split archive this is the final part.
    pub path: Option<PathBuf>,
    pub split_archive: bool,
    /// Set once any record of the archive needs Zip64. Also forces Zip64 end records on the next write.
    pub zip64_format: bool,
    /// Decodes names and comments of headers without the UTF-8 flag. CP437 is used when unset.
    pub charset: Option<&'static Encoding>,
}

impl ArchiveModel {
    /// Constructs an empty model, as for a newly created archive.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_charset(mut self, charset: &'static Encoding) -> Self {
        self.charset = Some(charset);
        self
    }

    pub fn file_headers(&self) -> &[FileHeader] {
        &self.central_directory.file_headers
    }

    pub fn file_headers_mut(&mut self) -> &mut Vec<FileHeader> {
        &mut self.central_directory.file_headers
    }

    pub fn entry_count(&self) -> usize {
        self.central_directory.file_headers.len()
    }

    pub fn is_split_archive(&self) -> bool {
        self.split_archive
    }

    pub fn is_zip64_format(&self) -> bool {
        self.zip64_format
    }

    pub fn comment(&self) -> &ZipString {
        &self.end_of_central_directory.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<ZipString>) {
        self.end_of_central_directory.comment = comment.into();
    }

    /// The offset of the central directory as recorded in the end records, preferring the Zip64 record.
    pub fn central_directory_offset(&self) -> u64 {
        match (&self.zip64_record, self.zip64_format) {
            (Some(record), true) => record.offset_start_of_cd,
            _ => self.end_of_central_directory.offset_start_of_cd as u64,
        }
    }

    pub fn central_directory_size(&self) -> u64 {
        match (&self.zip64_record, self.zip64_format) {
            (Some(record), true) => record.size_of_cd,
            _ => self.end_of_central_directory.size_of_cd as u64,
        }
    }

    /// The disk this part of the archive represents (the last one for a split archive).
    pub fn this_disk(&self) -> u32 {
        match (&self.zip64_record, self.zip64_format) {
            (Some(record), true) => record.number_of_this_disk,
            _ => self.end_of_central_directory.number_of_this_disk as u32,
        }
    }

    /// The disk holding the start of the central directory.
    pub fn central_directory_disk(&self) -> u32 {
        match (&self.zip64_record, self.zip64_format) {
            (Some(record), true) => record.disk_with_start_of_cd,
            _ => self.end_of_central_directory.disk_with_start_of_cd as u32,
        }
    }

    /// Looks up a header by its decoded name.
    ///
    /// A name which isn't found verbatim is retried with Windows separators replaced.
    pub fn file_header(&self, name: &str) -> Option<&FileHeader> {
        self.file_header_index(name).map(|index| &self.central_directory.file_headers[index])
    }

    pub fn file_header_mut(&mut self, name: &str) -> Option<&mut FileHeader> {
        self.file_header_index(name).map(move |index| &mut self.central_directory.file_headers[index])
    }

    pub fn file_header_index(&self, name: &str) -> Option<usize> {
        let headers = &self.central_directory.file_headers;

        headers.iter().position(|header| header.file_name.as_str() == name).or_else(|| {
            if !name.contains('\\') {
                return None;
            }

            let normalised = name.replace('\\', "/");
            headers.iter().position(|header| header.file_name.as_str() == normalised)
        })
    }

    /// Returns the offset at which the entry at `index` ends, that is, the next entry's local header offset or the
    /// start of the central directory if it is the last entry on its disk.
    ///
    /// "Next" is by local header offset rather than central directory order, as the two needn't agree.
    pub fn next_entry_offset(&self, index: usize) -> Option<u64> {
        let header = self.central_directory.file_headers.get(index)?;

        let next = self
            .central_directory
            .file_headers
            .iter()
            .filter(|other| {
                other.disk_number_start == header.disk_number_start
                    && other.local_header_offset > header.local_header_offset
            })
            .map(|other| other.local_header_offset)
            .min();

        Some(next.unwrap_or_else(|| self.central_directory_offset()))
    }
}
