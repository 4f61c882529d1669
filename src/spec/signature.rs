// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#437
pub const LOCAL_FILE_HEADER: u32 = 0x04034b50;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#439
pub const DATA_DESCRIPTOR: u32 = 0x08074b50;

/// Marks the first part of a multi-volume archive. Shares its value with the data descriptor.
pub const SPLIT_ARCHIVE: u32 = 0x08074b50;

/// Marks an archive which was written in split mode but fitted within a single part.
pub const SPLIT_ARCHIVE_SINGLE_PART: u32 = 0x30304b50;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4312
pub const CENTRAL_DIRECTORY_FILE_HEADER: u32 = 0x02014b50;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4313
pub const DIGITAL_SIGNATURE: u32 = 0x05054b50;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4314
pub const ZIP64_END_OF_CENTRAL_DIRECTORY: u32 = 0x06064b50;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4315
pub const ZIP64_END_OF_CENTRAL_DIRECTORY_LOCATOR: u32 = 0x07064b50;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4316
pub const END_OF_CENTRAL_DIRECTORY: u32 = 0x06054b50;
