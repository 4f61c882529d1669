// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use futures_lite::io::Cursor;

use crate::error::{SplitOperation, ZipError};
use crate::model::ArchiveModel;
use crate::mutate::{merge_split_archive, split_archive};
use crate::spec::signature::{LOCAL_FILE_HEADER, SPLIT_ARCHIVE, SPLIT_ARCHIVE_SINGLE_PART};
use crate::tests::mutate::{content, defaults};
use crate::tests::{build_archive, init_logger, read_model, read_with_zip_crate};

const SPLIT_LENGTH: u64 = 65536;

async fn large_archive() -> Vec<u8> {
    let files: Vec<(String, Vec<u8>)> =
        (0..6).map(|index| (format!("file-{index}.bin"), content(index as u8, 40_000 + index * 1000))).collect();
    let entries: Vec<(&str, &[u8])> = files.iter().map(|(name, data)| (name.as_str(), data.as_slice())).collect();

    build_archive(&entries).await
}

async fn split(data: &[u8], split_length: u64) -> crate::error::Result<(Vec<Vec<u8>>, ArchiveModel)> {
    let (options, monitor) = defaults();
    let mut model = read_model(data).await;

    let parts = split_archive(Cursor::new(data), &mut model, split_length, |_| Ok(Vec::new()), &options, &monitor).await?;
    Ok((parts, model))
}

#[tokio::test]
async fn split_layout() {
    init_logger();

    let data = large_archive().await;
    let (parts, model) = split(&data, SPLIT_LENGTH).await.unwrap();

    assert!(parts.len() > 1);
    assert!(model.is_split_archive());
    assert_eq!(model.this_disk() as usize, parts.len() - 1);
    assert_eq!(model.central_directory_disk() as usize, parts.len() - 1);
    assert_eq!(parts[0][..4], SPLIT_ARCHIVE.to_le_bytes());

    for part in &parts[..parts.len() - 1] {
        assert!(part.len() as u64 <= SPLIT_LENGTH);
    }

    // Local headers never straddle two parts.
    for header in model.file_headers() {
        let part = &parts[header.disk_number_start as usize];
        let offset = header.local_header_offset as usize;
        let header_end = offset + 30 + header.file_name.len();

        assert!(header_end <= part.len());
        assert_eq!(part[offset..offset + 4], LOCAL_FILE_HEADER.to_le_bytes());
    }

    // The final part carries the whole central directory and reads back on its own.
    let last = read_model(parts.last().unwrap()).await;
    assert!(last.is_split_archive());
    assert_eq!(last.central_directory, model.central_directory);
}

#[tokio::test]
async fn split_then_merge() {
    init_logger();

    let data = large_archive().await;
    let (parts, mut model) = split(&data, SPLIT_LENGTH).await.unwrap();

    let (options, monitor) = defaults();
    let mut readers: Vec<Cursor<Vec<u8>>> = parts.into_iter().map(Cursor::new).collect();
    let mut merged = Vec::<u8>::new();
    merge_split_archive(&mut readers, &mut merged, &mut model, &options, &monitor).await.unwrap();

    assert!(!model.is_split_archive());
    assert!(model.file_headers().iter().all(|header| header.disk_number_start == 0));
    assert_eq!(merged, data);
    assert_eq!(read_with_zip_crate(&merged).len(), 6);
}

#[tokio::test]
async fn split_single_part() {
    let data = build_archive(&[("a.txt", b"a"), ("b.txt", b"b")]).await;
    let (parts, model) = split(&data, SPLIT_LENGTH).await.unwrap();

    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0][..4], SPLIT_ARCHIVE_SINGLE_PART.to_le_bytes());
    assert!(!model.is_split_archive());

    let read = read_model(&parts[0]).await;
    assert!(!read.is_split_archive());
    assert_eq!(read.file_headers()[0].local_header_offset, 4);
    assert_eq!(read_with_zip_crate(&parts[0]).len(), 2);
}

#[tokio::test]
async fn split_length_minimum() {
    let data = build_archive(&[("a.txt", b"a")]).await;
    let result = split(&data, SPLIT_LENGTH - 1).await;
    assert!(matches!(result, Err(ZipError::InvalidSplitLength(length)) if length == SPLIT_LENGTH - 1));
}

#[tokio::test]
async fn split_refuses_header_longer_than_split_length() {
    let name = "n".repeat(40_000);
    let record = crate::model::ExtraDataRecord::new(0xCAFE, vec![7; 40_000]);

    let mut writer = crate::base::write::ZipFileWriter::new(Vec::<u8>::new());
    let builder = crate::base::write::ZipEntryBuilder::new(name.as_str()).extra_data_record(record);
    writer.write_entry_whole(builder, b"data").await.unwrap();
    let data = writer.close().await.unwrap();

    let result = split(&data, SPLIT_LENGTH).await;
    assert!(matches!(
        result,
        Err(ZipError::LocalHeaderExceedsSplitLength { length, split_length })
            if length == 30 + 40_000 + 40_004 && split_length == SPLIT_LENGTH
    ));
}

#[tokio::test]
async fn split_checks_local_header_signature() {
    let mut data = build_archive(&[("a.txt", b"a"), ("b.txt", b"b")]).await;
    let offset = read_model(&data).await.file_headers()[1].local_header_offset as usize;
    data[offset] = 0;

    let result = split(&data, SPLIT_LENGTH).await;
    assert!(matches!(result, Err(ZipError::UnexpectedSignature { expected: LOCAL_FILE_HEADER, .. })));
}

#[tokio::test]
async fn split_a_split_archive() {
    let data = large_archive().await;
    let (_, mut model) = split(&data, SPLIT_LENGTH).await.unwrap();

    let (options, monitor) = defaults();
    let result =
        split_archive(Cursor::new(&data), &mut model, SPLIT_LENGTH, |_| Ok(Vec::<u8>::new()), &options, &monitor).await;
    assert!(matches!(result, Err(ZipError::InvalidOperationOnSplitArchive(SplitOperation::Split))));
}

#[tokio::test]
async fn merge_requires_split_archive() {
    let (options, monitor) = defaults();
    let data = build_archive(&[("a.txt", b"a")]).await;
    let mut model = read_model(&data).await;

    let mut parts = vec![Cursor::new(data)];
    let result = merge_split_archive(&mut parts, Vec::<u8>::new(), &mut model, &options, &monitor).await;
    assert!(matches!(result, Err(ZipError::NotASplitArchive)));
}

#[tokio::test]
async fn merge_with_missing_parts() {
    let data = large_archive().await;
    let (mut parts, mut model) = split(&data, SPLIT_LENGTH).await.unwrap();
    parts.truncate(1);

    let (options, monitor) = defaults();
    let mut readers: Vec<Cursor<Vec<u8>>> = parts.into_iter().map(Cursor::new).collect();
    let result = merge_split_archive(&mut readers, Vec::<u8>::new(), &mut model, &options, &monitor).await;
    assert!(matches!(result, Err(ZipError::MissingSplitPart(_))));
}

#[tokio::test]
async fn split_cancelled() {
    let (options, monitor) = defaults();
    let data = large_archive().await;
    let mut model = read_model(&data).await;

    monitor.cancel();
    let result =
        split_archive(Cursor::new(&data), &mut model, SPLIT_LENGTH, |_| Ok(Vec::<u8>::new()), &options, &monitor).await;
    assert!(matches!(result, Err(ZipError::Cancelled)));
    assert!(!model.is_split_archive());
}
