// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

/// A compression method as stored within a header.
///
/// Compression codecs live outside of this crate, so every method value is representable and carried through
/// verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionMethod {
    #[default]
    Stored,
    Deflate,
    /// Marks an AES-encrypted entry; the real method is held by the entry's AES extra field.
    AesInternalOnly,
    Other(u16),
}

impl From<u16> for CompressionMethod {
    // Convert a u16 stored with little endianness into a compression method.
    // https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#445
    fn from(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            99 => CompressionMethod::AesInternalOnly,
            other => CompressionMethod::Other(other),
        }
    }
}

impl From<&CompressionMethod> for u16 {
    fn from(compression: &CompressionMethod) -> u16 {
        match compression {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::AesInternalOnly => 99,
            CompressionMethod::Other(value) => *value,
        }
    }
}

impl From<CompressionMethod> for u16 {
    fn from(compression: CompressionMethod) -> u16 {
        (&compression).into()
    }
}
