// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use std::collections::HashMap;

use futures_lite::io::Cursor;

use crate::base::read::read_local_file_header;
use crate::error::{SplitOperation, ZipError};
use crate::model::ArchiveModel;
use crate::mutate::{rename_entries, rename_entry};
use crate::tests::mutate::{content, defaults};
use crate::tests::{build_archive, init_logger, names, read_model, read_with_zip_crate};

async fn rename(data: &[u8], renames: &[(&str, &str)]) -> crate::error::Result<(Vec<u8>, ArchiveModel)> {
    let (options, monitor) = defaults();
    let mut model = read_model(data).await;
    let mut output = Vec::<u8>::new();

    let renames: HashMap<String, String> =
        renames.iter().map(|(from, to)| (from.to_string(), to.to_string())).collect();
    rename_entries(Cursor::new(data), &mut output, &mut model, &renames, &options, &monitor).await?;
    Ok((output, model))
}

#[tokio::test]
async fn rename_to_longer_name() {
    init_logger();

    let (a, b, c) = (content(1, 1000), content(2, 20), content(3, 300));
    let data = build_archive(&[("a.txt", &a), ("b.txt", &b), ("c.txt", &c)]).await;
    let original = read_model(&data).await;

    let (output, model) = rename(&data, &[("b.txt", "renamed/b-with-a-longer-name.txt")]).await.unwrap();
    assert_eq!(names(&model), ["a.txt", "renamed/b-with-a-longer-name.txt", "c.txt"]);

    let growth = "renamed/b-with-a-longer-name.txt".len() as u64 - "b.txt".len() as u64;
    assert_eq!(model.file_headers()[0].local_header_offset, 0);
    assert_eq!(model.file_headers()[1].local_header_offset, original.file_headers()[1].local_header_offset);
    assert_eq!(model.file_headers()[2].local_header_offset, original.file_headers()[2].local_header_offset + growth);
    assert_eq!(model.central_directory, read_model(&output).await.central_directory);

    let entries = read_with_zip_crate(&output);
    assert_eq!(entries[0], ("a.txt".to_owned(), a));
    assert_eq!(entries[1], ("renamed/b-with-a-longer-name.txt".to_owned(), b));
    assert_eq!(entries[2], ("c.txt".to_owned(), c));
}

#[tokio::test]
async fn rename_to_shorter_name() {
    let data = build_archive(&[("a-long-name.txt", b"aaaa"), ("b.txt", b"bb")]).await;
    let (output, model) = rename(&data, &[("a-long-name.txt", "a")]).await.unwrap();

    let second = &model.file_headers()[1];
    let header = read_local_file_header(Cursor::new(&output[second.local_header_offset as usize..]), None).await.unwrap();
    assert_eq!(header.file_name.as_str(), "b.txt");
    assert_eq!(read_with_zip_crate(&output)[0], ("a".to_owned(), b"aaaa".to_vec()));
}

#[tokio::test]
async fn rename_directory() {
    let data = build_archive(&[("dir/", b""), ("dir/a.txt", b"a"), ("dir/sub/b.txt", b"b"), ("other.txt", b"o")]).await;
    let (output, model) = rename(&data, &[("dir/", "folder")]).await.unwrap();

    assert_eq!(names(&model), ["folder/", "folder/a.txt", "folder/sub/b.txt", "other.txt"]);
    let names: Vec<String> = read_with_zip_crate(&output).into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["folder/", "folder/a.txt", "folder/sub/b.txt", "other.txt"]);
}

#[tokio::test]
async fn rename_within_renamed_directory() {
    let data = build_archive(&[
        ("dir/", b""),
        ("dir/a.txt", b"a"),
        ("dir/sub/", b""),
        ("dir/sub/b.txt", b"b"),
        ("dir/c.txt", b"c"),
    ])
    .await;

    // Each map is built afresh, so its iteration order varies between runs.
    for _ in 0..8 {
        let renames = [("dir/a.txt", "top.txt"), ("dir/", "x"), ("dir/sub/", "x/inner")];
        let (_, model) = rename(&data, &renames).await.unwrap();
        assert_eq!(names(&model), ["x/", "top.txt", "x/inner/", "x/inner/b.txt", "x/c.txt"]);
    }
}

#[tokio::test]
async fn rename_swaps_names() {
    let data = build_archive(&[("a.txt", b"a"), ("b.txt", b"b")]).await;
    let (output, _) = rename(&data, &[("a.txt", "b.txt"), ("b.txt", "a.txt")]).await.unwrap();

    let entries = read_with_zip_crate(&output);
    assert_eq!(entries[0], ("b.txt".to_owned(), b"a".to_vec()));
    assert_eq!(entries[1], ("a.txt".to_owned(), b"b".to_vec()));
}

#[tokio::test]
async fn rename_collision() {
    let data = build_archive(&[("a.txt", b"a"), ("b.txt", b"b")]).await;
    let result = rename(&data, &[("a.txt", "b.txt")]).await;
    assert!(matches!(result, Err(ZipError::NameCollision(name)) if name == "b.txt"));
}

#[tokio::test]
async fn rename_to_unicode_sets_flag() {
    let data = build_archive(&[("plain.txt", b"x")]).await;
    let (output, model) = rename(&data, &[("plain.txt", "日本語.txt")]).await.unwrap();

    assert!(model.file_headers()[0].general_purpose_flag.utf8());

    let header = read_local_file_header(Cursor::new(&output), None).await.unwrap();
    assert!(header.general_purpose_flag.utf8());
    assert_eq!(header.file_name.as_str(), "日本語.txt");
    assert_eq!(read_with_zip_crate(&output)[0].0, "日本語.txt");
}

#[tokio::test]
async fn rename_skips_missing_names() {
    let data = build_archive(&[("a.txt", b"a")]).await;
    let (output, model) = rename(&data, &[("missing.txt", "other.txt")]).await.unwrap();

    assert_eq!(names(&model), ["a.txt"]);
    assert_eq!(output, data);
}

#[tokio::test]
async fn rename_single_missing_entry() {
    let (options, monitor) = defaults();
    let data = build_archive(&[("a.txt", b"a")]).await;
    let mut model = read_model(&data).await;

    let result =
        rename_entry(Cursor::new(&data), Vec::<u8>::new(), &mut model, "missing.txt", "b.txt", &options, &monitor).await;
    assert!(matches!(result, Err(ZipError::EntryNotFound(_))));
}

#[tokio::test]
async fn rename_in_split_archive() {
    let (options, monitor) = defaults();
    let data = build_archive(&[("a.txt", b"a")]).await;
    let mut model = read_model(&data).await;
    model.split_archive = true;

    let result = rename_entry(Cursor::new(&data), Vec::<u8>::new(), &mut model, "a.txt", "b.txt", &options, &monitor).await;
    assert!(matches!(result, Err(ZipError::InvalidOperationOnSplitArchive(SplitOperation::Rename))));
}

#[tokio::test]
async fn rename_cancelled() {
    let (options, monitor) = defaults();
    let data = build_archive(&[("a.txt", b"a")]).await;
    let mut model = read_model(&data).await;

    monitor.cancel();
    let result = rename_entry(Cursor::new(&data), Vec::<u8>::new(), &mut model, "a.txt", "b.txt", &options, &monitor).await;
    assert!(matches!(result, Err(ZipError::Cancelled)));
}
