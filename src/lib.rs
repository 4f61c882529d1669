// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! # zip_rewrite
//!
//! An asynchronous ZIP header codec with a heavy focus on rewriting existing archives in place.
//!
//! ## Features
//! - A runtime-agnostic design powered by `futures-lite`'s IO traits, with an optional `tokio` layer.
//! - Reading and writing of every header record, including Zip64, AES extra data and digital signatures.
//! - Removing and renaming entries, merging split archives and splitting single-file archives, copying untouched
//!   byte ranges verbatim.
//! - Atomic commit of mutations to disk, with cooperative cancellation and observable progress.
//! - Aims for reasonable [specification](https://pkware.cachefly.net/webdocs/casestudies/APPNOTE.TXT) compliance.
//!
//! Entry data is never compressed, decompressed, encrypted or decrypted here. Pre-processed data may be supplied
//! to [`base::write::ZipFileWriter::write_entry_raw()`] alongside its CRC.
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! zip_rewrite = { version = "0.1.0", features = ["full"] }
//! ```
//!
//! ### Feature Flags
//! - `full` - Enables all below features.
//! - `chrono` - Enables support for parsing dates via `chrono`.
//! - `tokio` - Enables support for the `tokio` implementation module.
//! - `tokio-fs` - Enables support for the `tokio::fs` reading and mutation module.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base;
pub mod core;
pub mod date;
pub mod error;
pub mod model;
pub mod mutate;
pub mod progress;
pub mod spec;
pub mod split;
pub mod string;

#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod tokio;

pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod tests;

pub use crate::base::write::{ZipEntryBuilder, ZipFileWriter};
pub use crate::date::{builder::ZipDateTimeBuilder, ZipDateTime};
pub use crate::model::{ArchiveModel, FileHeader, LocalFileHeader};
pub use crate::mutate::MutationOptions;
pub use crate::progress::ProgressMonitor;
pub use crate::spec::compression::CompressionMethod;
pub use crate::spec::encryption::{AesKeyStrength, AesVersion, EncryptionMethod};
pub use crate::string::ZipString;
