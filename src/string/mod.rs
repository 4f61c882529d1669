// Copyright (c) 2023-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub(crate) mod cp437;

use encoding_rs::Encoding;

/// The encoding a [`ZipString`] was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    Utf8,
    /// A caller-supplied charset override.
    Charset(&'static Encoding),
    /// The legacy IBM437 code page.
    Cp437,
}

/// A file name or comment, holding both the bytes stored on disk and their decoded text.
///
/// The raw bytes are what gets written back, so an unchanged string always round-trips byte-for-byte regardless of
/// how lossy its decoding was.
#[derive(Debug, Clone)]
pub struct ZipString {
    raw: Vec<u8>,
    text: String,
    encoding: StringEncoding,
}

impl ZipString {
    /// Decodes raw header bytes.
    ///
    /// The UTF-8 flag takes precedence, then the charset override, then CP437.
    pub fn decode(raw: Vec<u8>, utf8: bool, charset: Option<&'static Encoding>) -> Self {
        let (text, encoding) = if utf8 {
            (String::from_utf8_lossy(&raw).into_owned(), StringEncoding::Utf8)
        } else if let Some(charset) = charset {
            (charset.decode_without_bom_handling(&raw).0.into_owned(), StringEncoding::Charset(charset))
        } else {
            (cp437::decode(&raw), StringEncoding::Cp437)
        };

        Self { raw, text, encoding }
    }

    /// Decodes an archive comment, which has no UTF-8 flag of its own.
    ///
    /// The charset override wins if given. Otherwise valid UTF-8 is taken as such and anything else falls back to
    /// CP437.
    pub fn decode_comment(raw: Vec<u8>, charset: Option<&'static Encoding>) -> Self {
        let utf8 = charset.is_none() && std::str::from_utf8(&raw).is_ok();
        Self::decode(raw, utf8, charset)
    }

    /// Encodes new text for a header.
    ///
    /// Returns the string along with whether the owning header must carry the UTF-8 flag. A header which already has
    /// the flag stays UTF-8. Otherwise the charset override is used if given, pure ASCII is stored as-is, and any
    /// other text falls back to UTF-8 with the flag set.
    pub fn encode(text: &str, utf8: bool, charset: Option<&'static Encoding>) -> (Self, bool) {
        if !utf8 {
            if let Some(charset) = charset {
                let raw = charset.encode(text).0.into_owned();
                return (Self { raw, text: text.to_owned(), encoding: StringEncoding::Charset(charset) }, false);
            }

            if text.is_ascii() {
                return (Self { raw: text.as_bytes().to_vec(), text: text.to_owned(), encoding: StringEncoding::Cp437 }, false);
            }
        }

        (text.into(), true)
    }

    /// Replaces the decoded text while keeping the stored bytes.
    pub(crate) fn replace_text(&mut self, text: String) {
        self.text = text;
    }

    /// Returns the raw bytes for this string.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Returns the decoded text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn encoding(&self) -> StringEncoding {
        self.encoding
    }

    /// Returns the encoded length in bytes.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether storing this string requires the UTF-8 flag on its header.
    pub fn requires_utf8_flag(&self) -> bool {
        matches!(self.encoding, StringEncoding::Utf8) && !self.raw.is_ascii()
    }
}

// Two strings are equal when they would be stored identically; the encoding tag is only a decoding detail.
impl PartialEq for ZipString {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.text == other.text
    }
}

impl Eq for ZipString {}

impl Default for ZipString {
    fn default() -> Self {
        String::new().into()
    }
}

impl From<String> for ZipString {
    fn from(value: String) -> Self {
        Self { raw: value.as_bytes().to_vec(), text: value, encoding: StringEncoding::Utf8 }
    }
}

impl From<&str> for ZipString {
    fn from(value: &str) -> Self {
        value.to_owned().into()
    }
}

impl std::fmt::Display for ZipString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
