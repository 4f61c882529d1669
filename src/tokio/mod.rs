// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A set of [`tokio`]-specific type aliases and features.
//!
//! # Usage
//! With the `tokio` feature enabled, [`base::write::ZipFileWriter::with_tokio()`] accepts a [`tokio`] writer directly,
//! converting between the required async IO traits internally. The type it returns contains a wrapping compatibility
//! type provided by an external crate, which can't be named without also pulling in [`tokio_util`]. This is why
//! we've provided type aliases within this module.
//!
//! With the `tokio-fs` feature enabled, [`fs::ZipArchive`] opens archives by path and applies mutations to them
//! atomically, optionally in the background.

#[cfg(doc)]
use crate::base;
#[cfg(doc)]
use tokio;
#[cfg(doc)]
use tokio_util;

#[cfg(feature = "tokio-fs")]
pub mod fs;

pub mod write {
    //! A module which supports writing ZIP files.

    #[cfg(doc)]
    use crate::base;
    use tokio_util::compat::Compat;

    /// A [`tokio`]-specific type alias for [`base::write::ZipFileWriter`];
    pub type ZipFileWriter<W> = crate::base::write::ZipFileWriter<Compat<W>>;

    /// A [`tokio`]-specific type alias for [`base::write::EntryStreamWriter`];
    pub type EntryStreamWriter<'a, W> = crate::base::write::EntryStreamWriter<'a, Compat<W>>;

    /// A [`tokio`]-specific type alias for [`base::write::EntrySeekWriter`];
    pub type EntrySeekWriter<'a, W> = crate::base::write::EntrySeekWriter<'a, Compat<W>>;
}
