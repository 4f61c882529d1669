// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which holds relevant error reporting structures/types.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use thiserror::Error;

/// A Result type alias over ZipError to minimise repetition.
pub type Result<V> = std::result::Result<V, ZipError>;

/// Which operation was refused on a multi-volume archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOperation {
    Remove,
    Rename,
    Split,
}

impl Display for SplitOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remove => write!(f, "remove entries from"),
            Self::Rename => write!(f, "rename entries in"),
            Self::Split => write!(f, "split"),
        }
    }
}

/// An enum of possible errors and their descriptions.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ZipError {
    #[error("unable to locate the end of central directory record; not a zip file")]
    NotAZipFile,
    #[error("input was truncated; expected {0} more byte(s)")]
    TruncatedInput(usize),
    #[error("encountered an unexpected header (actual: {actual:#x}, expected: {expected:#x})")]
    UnexpectedSignature { actual: u32, expected: u32 },
    #[error("expected central directory entry not found (#{0})")]
    CentralDirectoryEntryNotFound(usize),
    #[error("corrupt extra field: {0}")]
    CorruptExtraField(&'static str),

    #[error("unable to {0} a split archive")]
    InvalidOperationOnSplitArchive(SplitOperation),
    #[error("an entry named '{0}' already exists")]
    NameCollision(String),
    #[error("AES encryption requested without a key strength")]
    MissingAesParameters,
    #[error("no entry named '{0}' exists within the archive")]
    EntryNotFound(String),
    #[error("archive is not a split archive")]
    NotASplitArchive,
    #[error("split archive part is missing: {0}")]
    MissingSplitPart(PathBuf),
    #[error("split length of {0} bytes is below the minimum")]
    InvalidSplitLength(u64),
    #[error("local file header of {length} bytes doesn't fit within a split length of {split_length} bytes")]
    LocalHeaderExceedsSplitLength { length: u64, split_length: u64 },

    #[error("compression method ({0}) requires pre-compressed data and an explicit CRC")]
    CompressionNotSupported(u16),
    #[error("file name too large")]
    FileNameTooLarge,
    #[error("comment too large")]
    CommentTooLarge,
    #[error("extra field too large")]
    ExtraFieldTooLarge,
    #[error("entry size exceeds what was reserved in its local file header")]
    Zip64NotReserved,

    #[error("another task is already in progress on this archive")]
    TaskInProgress,
    #[error("the task was cancelled")]
    Cancelled,

    #[error("an upstream reader returned an error: {0}")]
    UpstreamReadError(#[from] std::io::Error),
}
