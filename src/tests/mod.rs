// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub(crate) mod mutate;
pub(crate) mod read;

use futures_lite::io::Cursor;

use crate::base::read::read_archive;
use crate::base::write::{ZipEntryBuilder, ZipFileWriter};
use crate::model::ArchiveModel;

/// Initialize the env logger for any tests that require it.
/// Safe to call multiple times.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Writes an archive of stored entries to memory.
pub(crate) async fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipFileWriter::new(Vec::<u8>::new());

    for (name, data) in entries {
        writer.write_entry_whole(ZipEntryBuilder::new(*name), data).await.expect("failed to write entry");
    }

    writer.close().await.expect("failed to close writer")
}

pub(crate) async fn read_model(data: &[u8]) -> ArchiveModel {
    read_archive(Cursor::new(data), None).await.expect("failed to read archive")
}

/// Reads every entry's data back with an independent implementation.
pub(crate) fn read_with_zip_crate(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).expect("zip crate failed to open archive");
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index).expect("zip crate failed to open entry");
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer).expect("zip crate failed to read entry");
        entries.push((file.name().to_owned(), buffer));
    }

    entries
}

pub(crate) fn names(model: &ArchiveModel) -> Vec<&str> {
    model.file_headers().iter().map(|header| header.file_name.as_str()).collect()
}
