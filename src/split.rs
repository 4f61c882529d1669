// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Mapping between the disks of a split archive and its physical parts.
//!
//! A split archive named `name.zip` with `n` disks is stored as `name.z01` through `name.z{n-1}`, followed by
//! `name.zip` itself as the final disk (which holds the central directory). The first part opens with a four-byte
//! marker, and offsets within that part count it.

use std::path::{Path, PathBuf};

use crate::spec::signature::{SPLIT_ARCHIVE, SPLIT_ARCHIVE_SINGLE_PART};

/// The length of the marker opening the first part.
pub const SPLIT_MARKER_LENGTH: u64 = 4;

/// Returns the path of the part holding `disk`, given the path of the final part.
pub fn part_path(archive: &Path, disk: u32, total_disks: u32) -> PathBuf {
    if disk + 1 >= total_disks {
        return archive.to_path_buf();
    }

    archive.with_extension(format!("z{:02}", disk + 1))
}

/// Returns the paths of every part in disk order.
pub fn part_paths(archive: &Path, total_disks: u32) -> Vec<PathBuf> {
    (0..total_disks.max(1)).map(|disk| part_path(archive, disk, total_disks)).collect()
}

/// Whether the given leading bytes of the first part are a split marker.
pub fn is_split_marker(leading: [u8; 4]) -> bool {
    matches!(u32::from_le_bytes(leading), SPLIT_ARCHIVE | SPLIT_ARCHIVE_SINGLE_PART)
}

/// The marker to open the first part with, given how many parts were produced.
pub fn split_marker(total_disks: u32) -> u32 {
    match total_disks {
        0 | 1 => SPLIT_ARCHIVE_SINGLE_PART,
        _ => SPLIT_ARCHIVE,
    }
}

/// Tracks the disk and part-relative position of a split archive being laid out.
///
/// Parts are rolled over lazily: a full part only gives way to a new one once more bytes are written, so no part
/// is ever left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitCursor {
    pub disk: u32,
    pub position: u64,
    split_length: u64,
}

impl SplitCursor {
    /// A cursor at the start of the first part, just after its marker.
    pub fn new(split_length: u64) -> Self {
        Self { disk: 0, position: SPLIT_MARKER_LENGTH, split_length }
    }

    pub fn split_length(&self) -> u64 {
        self.split_length
    }

    /// Moves to the next part.
    pub fn roll(&mut self) {
        self.disk += 1;
        self.position = 0;
    }

    /// Moves to the next part unless `length` bytes fit within the current one.
    ///
    /// Returns whether a new part was started. A part which is still empty is never rolled, so a record larger than
    /// the split length is written into a part of its own.
    pub fn reserve(&mut self, length: u64) -> bool {
        if self.position > 0 && self.position + length > self.split_length {
            self.roll();
            return true;
        }

        false
    }

    /// How many of `length` bytes fit in the current part, rolling first if it is already full.
    pub fn next_chunk(&mut self, length: u64) -> u64 {
        if self.position >= self.split_length {
            self.roll();
        }

        std::cmp::min(length, self.split_length - self.position)
    }

    /// Accounts for `length` bytes written to the current part.
    pub fn advance(&mut self, length: u64) {
        self.position += length;
    }

    /// Accounts for `length` bytes which may span parts.
    pub fn advance_spanning(&mut self, mut length: u64) {
        while length > 0 {
            let chunk = self.next_chunk(length);
            self.advance(chunk);
            length -= chunk;
        }
    }
}
