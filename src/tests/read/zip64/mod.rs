// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// Copyright (c) 2023 Cognite AS
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::write::header::{central_directory_record, requires_zip64_offset, requires_zip64_sizes};
use crate::base::write::{ZipEntryBuilder, ZipFileWriter};
use crate::model::FileHeader;
use crate::spec::consts::{NON_ZIP64_MAX_NUM_FILES, NON_ZIP64_MAX_SIZE};
use crate::spec::version::ZIP64_VERSION_NEEDED;
use crate::tests::{init_logger, read_model};

const LIMIT: u64 = NON_ZIP64_MAX_SIZE as u64;

#[test]
fn size_promotion_threshold() {
    assert!(!requires_zip64_sizes(0, LIMIT - 50));
    assert!(requires_zip64_sizes(0, LIMIT - 49));
    assert!(!requires_zip64_sizes(LIMIT - 1, 0));
    assert!(requires_zip64_sizes(LIMIT, 0));
    assert!(requires_zip64_sizes(0, u64::MAX));
}

#[test]
fn offset_promotion_threshold() {
    assert!(!requires_zip64_offset(LIMIT - 1));
    assert!(requires_zip64_offset(LIMIT));
}

#[test]
fn central_directory_promotes_fields_independently() {
    let mut header = FileHeader { local_header_offset: 0x1_0000_0000, ..Default::default() };
    header.uncompressed_size = 10;
    header.compressed_size = 10;

    let (record, zip64) = central_directory_record(&mut header).unwrap();
    assert!(zip64);
    assert_eq!(record.raw.relative_offset_of_local_header, NON_ZIP64_MAX_SIZE);
    assert_eq!(record.raw.uncompressed_size, 10);
    assert_eq!(record.raw.disk_number_start, 0);

    let info = header.zip64_extended_info.expect("no zip64 extended info");
    assert_eq!(info.local_header_offset, Some(0x1_0000_0000));
    assert_eq!(info.uncompressed_size, None);
    assert_eq!(info.disk_number_start, None);
    // Only the offset is carried, so the sub-record holds eight bytes.
    assert_eq!(record.extra_field.len(), 4 + 8);

    let mut header = FileHeader { disk_number_start: NON_ZIP64_MAX_NUM_FILES as u32, ..Default::default() };
    let (record, _) = central_directory_record(&mut header).unwrap();
    assert_eq!(record.raw.disk_number_start, NON_ZIP64_MAX_NUM_FILES);
    assert_eq!(header.zip64_extended_info.and_then(|info| info.disk_number_start), Some(0xFFFF));
}

#[test]
fn small_header_has_no_zip64() {
    let mut header = FileHeader { local_header_offset: LIMIT - 1, ..Default::default() };
    header.uncompressed_size = LIMIT - 50;

    let (record, zip64) = central_directory_record(&mut header).unwrap();
    assert!(!zip64);
    assert!(record.extra_field.is_empty());
    assert!(header.zip64_extended_info.is_none());
}

/// Test writing a small zip64 file. No zip64 extra fields would be emitted, but z64 end of directory
/// records should be.
#[tokio::test]
async fn test_write_zip64_file() {
    init_logger();

    let mut writer = ZipFileWriter::new(Vec::<u8>::new()).force_zip64();
    writer.write_entry_whole("file1", &[0, 0, 0, 0]).await.unwrap();
    let data = writer.close().await.unwrap();

    let model = read_model(&data).await;
    assert!(model.is_zip64_format());
    assert!(model.zip64_locator.is_some());

    let record = model.zip64_record.as_ref().expect("no zip64 record");
    assert_eq!(record.total_entries_in_cd, 1);
    assert_eq!(record.size_of_record, 44);
    assert!(model.file_headers()[0].zip64_extended_info.is_none());

    assert_eq!(crate::tests::read_with_zip_crate(&data)[0].1, vec![0, 0, 0, 0]);
}

/// Test writing a zip64 file with more than u16::MAX files.
#[tokio::test]
async fn test_write_zip64_file_many_entries() {
    init_logger();

    let count = u16::MAX as usize + 4465;
    let mut writer = ZipFileWriter::new(Vec::with_capacity(8_000_000));
    for i in 0..count {
        writer.write_entry_whole(i.to_string(), &[]).await.unwrap();
    }
    let data = writer.close().await.unwrap();

    let model = read_model(&data).await;
    assert!(model.is_zip64_format());
    assert_eq!(model.entry_count(), count);
    assert_eq!(model.end_of_central_directory.total_entries_in_cd, NON_ZIP64_MAX_NUM_FILES);

    let archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
    assert_eq!(archive.len(), count);
}

/// Tests that entries declaring sizes beyond 4GiB are carried through zip64 extended information.
#[tokio::test]
async fn large_declared_sizes_round_trip() {
    init_logger();

    let uncompressed_size = 5 * 1024 * 1024 * 1024;
    let mut writer = ZipFileWriter::new(Vec::<u8>::new());
    let entry = ZipEntryBuilder::new("huge.bin").compression(crate::CompressionMethod::Deflate);
    writer.write_entry_raw(entry, b"pretend this is deflated", 0x1234_5678, uncompressed_size).await.unwrap();
    let data = writer.close().await.unwrap();

    let model = read_model(&data).await;
    let header = &model.file_headers()[0];

    assert_eq!(header.uncompressed_size, uncompressed_size);
    assert_eq!(header.compressed_size, 24);
    assert_eq!(header.crc32, 0x1234_5678);
    assert_eq!(header.version_needed_to_extract, ZIP64_VERSION_NEEDED);

    let info = header.zip64_extended_info.expect("no zip64 extended info");
    assert_eq!(info.uncompressed_size, Some(uncompressed_size));
    assert_eq!(info.compressed_size, Some(24));
    assert_eq!(info.local_header_offset, None);
}

#[tokio::test]
async fn zip64_format_is_sticky() {
    let mut writer = ZipFileWriter::new(Vec::<u8>::new()).force_zip64();
    writer.write_entry_whole("a", b"a").await.unwrap();
    let data = writer.close().await.unwrap();

    let mut model = read_model(&data).await;
    let mut rewritten = Vec::<u8>::new();
    let offset = model.central_directory_offset();
    crate::base::write::header::finalize(&mut rewritten, &mut model, offset, 0).await.unwrap();

    assert!(model.is_zip64_format());
    assert!(model.zip64_record.is_some());
    assert_eq!(&data[offset as usize..], &rewritten[..]);
}

#[tokio::test]
async fn oversized_record_length_is_truncated_input() {
    init_logger();

    let writer = ZipFileWriter::new(Vec::<u8>::new()).force_zip64();
    let mut data = writer.close().await.unwrap();

    // The empty archive opens with its zip64 end of central directory record.
    assert_eq!(&data[..4], &crate::spec::signature::ZIP64_END_OF_CENTRAL_DIRECTORY.to_le_bytes());
    data[4..12].copy_from_slice(&u64::MAX.to_le_bytes());

    let result = crate::base::read::read_archive(futures_lite::io::Cursor::new(&data), None).await;
    assert!(matches!(result, Err(crate::error::ZipError::TruncatedInput(_))));
}
