// Copyright (c) 2022-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub const SIGNATURE_LENGTH: usize = 4;

// Local file header constants
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#437
pub const LFH_LENGTH: usize = 26;

// End of central directory record constants
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4316
pub const EOCDR_LENGTH: usize = 18;

/// The largest comment an end of central directory record can carry.
pub const EOCDR_MAX_COMMENT_LENGTH: usize = u16::MAX as usize;

// Zip64 end of central directory record & locator constants
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4314
pub const ZIP64_EOCDL_LENGTH: usize = 16;

/// The value of "size of zip64 end of central directory record" when no extensible data sector is present.
pub const ZIP64_EOCDR_SIZE_OF_RECORD: u64 = 44;

/// Sentinel stored in a 32-bit field whose true value lives in a Zip64 extra field or record.
pub const NON_ZIP64_MAX_SIZE: u32 = 0xFFFFFFFF;
pub const NON_ZIP64_MAX_NUM_FILES: u16 = 0xFFFF;

/// Headroom below [`NON_ZIP64_MAX_SIZE`] at which an uncompressed size is promoted to Zip64.
///
/// Leaves room for encryption headers and trailers added on top of the uncompressed size.
pub const ZIP64_SIZE_PROMOTION_MARGIN: u64 = 50;

// Extra field header IDs
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#452
pub const ZIP64_EXTRA_FIELD_ID: u16 = 0x0001;
pub const AES_EXTRA_FIELD_ID: u16 = 0x9901;
pub const EXTRA_FIELD_HEADER_LENGTH: usize = 4;
pub const AES_EXTRA_FIELD_DATA_LENGTH: u16 = 7;

/// The smallest part size accepted when splitting an archive.
pub const MIN_SPLIT_LENGTH: u64 = 65536;
