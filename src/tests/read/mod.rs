// Copyright (c) 2022-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub(crate) mod extra;
pub(crate) mod zip64;

use futures_lite::io::Cursor;

use crate::base::read::{read_archive, read_data_descriptor, read_local_file_header};
use crate::base::write::{ZipEntryBuilder, ZipFileWriter};
use crate::error::ZipError;
use crate::model::DigitalSignature;
use crate::spec::signature::CENTRAL_DIRECTORY_FILE_HEADER;
use crate::string::{StringEncoding, ZipString};
use crate::tests::{build_archive, init_logger, names, read_model};

#[tokio::test]
async fn empty() {
    init_logger();

    let data = build_archive(&[]).await;
    assert_eq!(data.len(), 22);

    let model = read_model(&data).await;
    assert_eq!(model.entry_count(), 0);
    assert!(!model.is_zip64_format());
    assert!(!model.is_split_archive());
}

#[tokio::test]
async fn zero_length_zip() {
    let result = read_archive(Cursor::new(Vec::<u8>::new()), None).await;
    assert!(matches!(result, Err(ZipError::NotAZipFile)));
}

#[tokio::test]
async fn round_trip_entries() {
    init_logger();

    for count in [1, 1000] {
        let files: Vec<(String, Vec<u8>)> =
            (0..count).map(|index| (format!("dir/file-{index}.txt"), index.to_string().into_bytes())).collect();
        let entries: Vec<(&str, &[u8])> = files.iter().map(|(name, data)| (name.as_str(), data.as_slice())).collect();

        let data = build_archive(&entries).await;
        let model = read_model(&data).await;

        assert_eq!(model.entry_count(), count);
        for (header, (name, content)) in model.file_headers().iter().zip(&files) {
            assert_eq!(header.file_name.as_str(), name);
            assert_eq!(header.uncompressed_size, content.len() as u64);
            assert_eq!(header.compressed_size, content.len() as u64);
            assert_eq!(header.crc32, crc32fast::hash(content));
        }

        let offsets: Vec<u64> = model.file_headers().iter().map(|header| header.local_header_offset).collect();
        assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(crate::tests::read_with_zip_crate(&data), files);
    }
}

#[tokio::test]
async fn archive_comment_round_trip() {
    let mut writer = ZipFileWriter::new(Vec::<u8>::new());
    writer.write_entry_whole("foo.txt", b"foo").await.unwrap();
    writer.comment("an archive comment".to_string());
    let data = writer.close().await.unwrap();

    let model = read_model(&data).await;
    assert_eq!(model.comment().as_str(), "an archive comment");
    assert_eq!(model.comment().encoding(), StringEncoding::Utf8);
}

#[tokio::test]
async fn entry_comment_and_attributes() {
    let mut writer = ZipFileWriter::new(Vec::<u8>::new());
    let entry = ZipEntryBuilder::new("script.sh").comment("runs things").unix_permissions(0o755);
    writer.write_entry_whole(entry, b"#!/bin/sh\n").await.unwrap();
    let data = writer.close().await.unwrap();

    let model = read_model(&data).await;
    let header = model.file_header("script.sh").expect("no 'script.sh' entry");

    assert_eq!(header.file_comment.as_str(), "runs things");
    assert_eq!(header.external_file_attributes >> 16, 0o755);
}

#[tokio::test]
async fn missing_central_directory_entry() {
    init_logger();

    let mut data = build_archive(&[("a", b"a"), ("b", b"b")]).await;

    // Declare a third entry in the end of central directory record.
    let eocdr = data.len() - 22;
    data[eocdr + 8..eocdr + 10].copy_from_slice(&3u16.to_le_bytes());
    data[eocdr + 10..eocdr + 12].copy_from_slice(&3u16.to_le_bytes());

    let result = read_archive(Cursor::new(&data), None).await;
    assert!(matches!(result, Err(ZipError::CentralDirectoryEntryNotFound(2))));

    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "expected central directory entry not found (#2)");
}

#[tokio::test]
async fn corrupt_central_directory_signature() {
    let mut data = build_archive(&[("a", b"a")]).await;
    let model = read_model(&data).await;

    let offset = model.central_directory_offset() as usize;
    assert_eq!(data[offset..offset + 4], CENTRAL_DIRECTORY_FILE_HEADER.to_le_bytes());
    data[offset] = 0;

    let result = read_archive(Cursor::new(&data), None).await;
    assert!(matches!(result, Err(ZipError::CentralDirectoryEntryNotFound(0))));
}

#[tokio::test]
async fn lookup_normalises_separators() {
    let data = build_archive(&[("dir/file.txt", b"x")]).await;
    let model = read_model(&data).await;

    assert_eq!(model.file_header_index("dir/file.txt"), Some(0));
    assert_eq!(model.file_header_index("dir\\file.txt"), Some(0));
    assert_eq!(model.file_header_index("dir/other.txt"), None);
}

#[tokio::test]
async fn next_entry_offset_follows_local_header_order() {
    let data = build_archive(&[("a", b"aaaa"), ("b", b"bb")]).await;
    let mut model = read_model(&data).await;

    let first = model.file_headers()[0].local_header_offset;
    let second = model.file_headers()[1].local_header_offset;
    assert_eq!(model.next_entry_offset(0), Some(second));
    assert_eq!(model.next_entry_offset(1), Some(model.central_directory_offset()));

    // Central directory order needn't match local header order.
    model.file_headers_mut().swap(0, 1);
    assert_eq!(model.next_entry_offset(1), Some(second));
    assert_eq!(model.next_entry_offset(0), Some(model.central_directory_offset()));
    assert_eq!(model.next_entry_offset(2), None);
    assert!(first < second);
}

#[tokio::test]
async fn utf8_names_set_the_flag() {
    let data = build_archive(&[("日本語.txt", b"x"), ("plain.txt", b"y")]).await;
    let model = read_model(&data).await;

    let unicode = model.file_header("日本語.txt").expect("no unicode entry");
    assert!(unicode.general_purpose_flag.utf8());
    assert_eq!(unicode.file_name.encoding(), StringEncoding::Utf8);

    let plain = model.file_header("plain.txt").expect("no plain entry");
    assert!(!plain.general_purpose_flag.utf8());
    assert_eq!(crate::tests::read_with_zip_crate(&data)[0].0, "日本語.txt");
}

#[test]
fn charset_precedence() {
    // 0x82 is 'é' in CP437.
    let cp437 = ZipString::decode(vec![0x82, b'a'], false, None);
    assert_eq!(cp437.as_str(), "éa");
    assert_eq!(cp437.encoding(), StringEncoding::Cp437);

    let shift_jis = ZipString::decode(vec![0x93, 0xfa, 0x96, 0x7b], false, Some(encoding_rs::SHIFT_JIS));
    assert_eq!(shift_jis.as_str(), "日本");

    // The UTF-8 flag wins over an override.
    let utf8 = ZipString::decode("日本".as_bytes().to_vec(), true, Some(encoding_rs::SHIFT_JIS));
    assert_eq!(utf8.as_str(), "日本");
    assert_eq!(utf8.as_bytes(), "日本".as_bytes());
}

#[test]
fn encode_with_override_skips_utf8() {
    let (encoded, utf8) = ZipString::encode("日本", false, Some(encoding_rs::SHIFT_JIS));
    assert!(!utf8);
    assert_eq!(encoded.as_bytes(), &[0x93, 0xfa, 0x96, 0x7b]);

    let (encoded, utf8) = ZipString::encode("日本", false, None);
    assert!(utf8);
    assert!(encoded.requires_utf8_flag());
}

#[tokio::test]
async fn local_header_strips_drive_letter() {
    let data = build_archive(&[("C:\\temp\\file.txt", b"x")]).await;
    let header = read_local_file_header(Cursor::new(&data), None).await.unwrap();
    assert_eq!(header.file_name.as_str(), "temp\\file.txt");
    assert_eq!(header.file_name.as_bytes(), b"C:\\temp\\file.txt");
}

#[tokio::test]
async fn streamed_entry_data_descriptor() {
    use futures_lite::io::{AsyncSeekExt, AsyncWriteExt, SeekFrom};

    let payload = b"streamed without a known size";

    let mut writer = ZipFileWriter::new(Vec::<u8>::new());
    let mut entry = writer.write_entry_stream("stream.txt").await.unwrap();
    entry.write_all(payload).await.unwrap();
    entry.close().await.unwrap();
    let data = writer.close().await.unwrap();

    let mut cursor = Cursor::new(&data);
    let local = read_local_file_header(&mut cursor, None).await.unwrap();
    assert!(local.general_purpose_flag.data_descriptor());
    assert_eq!(local.crc32, 0);
    assert_eq!(local.compressed_size, 0);

    cursor.seek(SeekFrom::Current(payload.len() as i64)).await.unwrap();
    let descriptor = read_data_descriptor(&mut cursor, &local).await.unwrap();

    assert_eq!(descriptor.crc_32, crc32fast::hash(payload));
    assert_eq!(descriptor.compressed_size, payload.len() as u64);
    assert_eq!(descriptor.uncompressed_size, payload.len() as u64);

    let model = read_model(&data).await;
    assert_eq!(model.file_headers()[0].crc32, crc32fast::hash(payload));
    assert_eq!(crate::tests::read_with_zip_crate(&data)[0].1, payload);
}

#[tokio::test]
async fn digital_signature_round_trip() {
    use crate::core::ds::RawDigitalSignature;

    let mut writer = ZipFileWriter::new(Vec::<u8>::new());
    writer.write_entry_whole("signed.txt", b"x").await.unwrap();
    writer.model.central_directory.digital_signature =
        Some(DigitalSignature { raw: RawDigitalSignature { size_of_data: 3 }, signature_data: vec![1, 2, 3] });
    let data = writer.close().await.unwrap();

    let model = read_model(&data).await;
    let signature = model.central_directory.digital_signature.as_ref().expect("no digital signature");
    assert_eq!(signature.signature_data, vec![1, 2, 3]);
    assert_eq!(names(&model), vec!["signed.txt"]);
}
