// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use futures_lite::io::Cursor;

use crate::error::{SplitOperation, ZipError};
use crate::model::ArchiveModel;
use crate::mutate::{remove_entries, remove_entry};
use crate::tests::mutate::{content, defaults};
use crate::tests::{build_archive, init_logger, names, read_model, read_with_zip_crate};

async fn remove(data: &[u8], removed: &[&str]) -> (Vec<u8>, ArchiveModel) {
    let (options, monitor) = defaults();
    let mut model = read_model(data).await;
    let mut output = Vec::<u8>::new();

    remove_entries(Cursor::new(data), &mut output, &mut model, removed, &options, &monitor).await.unwrap();
    (output, model)
}

#[tokio::test]
async fn remove_each_position() {
    init_logger();

    let (a, b, c) = (content(1, 100), content(2, 2000), content(3, 30));
    let data = build_archive(&[("a.txt", &a), ("b.txt", &b), ("c.txt", &c)]).await;

    for (removed, kept) in [("a.txt", ["b.txt", "c.txt"]), ("b.txt", ["a.txt", "c.txt"]), ("c.txt", ["a.txt", "b.txt"])] {
        let (output, model) = remove(&data, &[removed]).await;

        assert_eq!(names(&model), kept);
        assert_eq!(model.central_directory, read_model(&output).await.central_directory);

        let entries = read_with_zip_crate(&output);
        let expected: Vec<(String, Vec<u8>)> = kept
            .iter()
            .map(|name| {
                let data = match *name {
                    "a.txt" => &a,
                    "b.txt" => &b,
                    _ => &c,
                };
                (name.to_string(), data.clone())
            })
            .collect();
        assert_eq!(entries, expected);
    }
}

#[tokio::test]
async fn remove_shifts_later_offsets() {
    let data = build_archive(&[("a.txt", &content(1, 500)), ("b.txt", b"b"), ("c.txt", b"c")]).await;
    let original = read_model(&data).await;
    let (_, model) = remove(&data, &["a.txt"]).await;

    let removed_length = original.file_headers()[1].local_header_offset;
    assert_eq!(model.file_headers()[0].local_header_offset, 0);
    assert_eq!(
        model.file_headers()[1].local_header_offset,
        original.file_headers()[2].local_header_offset - removed_length
    );
}

#[tokio::test]
async fn remove_directory_with_children() {
    let data = build_archive(&[
        ("dir/", b""),
        ("dir/a.txt", b"a"),
        ("dir/sub/b.txt", b"b"),
        ("directory.txt", b"not a child"),
        ("other.txt", b"other"),
    ])
    .await;

    let (output, model) = remove(&data, &["dir/"]).await;
    assert_eq!(names(&model), ["directory.txt", "other.txt"]);
    assert_eq!(read_with_zip_crate(&output).len(), 2);
}

#[tokio::test]
async fn remove_skips_missing_names() {
    let data = build_archive(&[("a.txt", b"a"), ("b.txt", b"b")]).await;
    let (_, model) = remove(&data, &["missing.txt", "a.txt"]).await;
    assert_eq!(names(&model), ["b.txt"]);

    let (output, model) = remove(&data, &["missing.txt"]).await;
    assert_eq!(names(&model), ["a.txt", "b.txt"]);
    assert_eq!(output, data);
}

#[tokio::test]
async fn remove_all_entries() {
    let data = build_archive(&[("a.txt", b"a"), ("b.txt", b"b")]).await;
    let (output, model) = remove(&data, &["a.txt", "b.txt"]).await;

    assert_eq!(model.entry_count(), 0);
    assert_eq!(output, build_archive(&[]).await);
}

#[tokio::test]
async fn remove_single_missing_entry() {
    let (options, monitor) = defaults();
    let data = build_archive(&[("a.txt", b"a")]).await;
    let mut model = read_model(&data).await;

    let result =
        remove_entry(Cursor::new(&data), Vec::<u8>::new(), &mut model, "missing.txt", &options, &monitor).await;
    assert!(matches!(result, Err(ZipError::EntryNotFound(name)) if name == "missing.txt"));
}

#[tokio::test]
async fn remove_from_split_archive() {
    let (options, monitor) = defaults();
    let data = build_archive(&[("a.txt", b"a")]).await;
    let mut model = read_model(&data).await;
    model.split_archive = true;

    let result = remove_entry(Cursor::new(&data), Vec::<u8>::new(), &mut model, "a.txt", &options, &monitor).await;
    assert!(matches!(result, Err(ZipError::InvalidOperationOnSplitArchive(SplitOperation::Remove))));
}

#[tokio::test]
async fn remove_cancelled() {
    let (options, monitor) = defaults();
    let data = build_archive(&[("a.txt", b"a"), ("b.txt", b"b")]).await;
    let mut model = read_model(&data).await;

    monitor.cancel();
    let result = remove_entry(Cursor::new(&data), Vec::<u8>::new(), &mut model, "a.txt", &options, &monitor).await;
    assert!(matches!(result, Err(ZipError::Cancelled)));
}

#[tokio::test]
async fn remove_reports_progress() {
    let (options, monitor) = defaults();
    let data = build_archive(&[("a.txt", &content(1, 10_000)), ("b.txt", b"b")]).await;
    let mut model = read_model(&data).await;

    remove_entry(Cursor::new(&data), Vec::<u8>::new(), &mut model, "b.txt", &options, &monitor).await.unwrap();

    assert!(monitor.total_work() > 10_000);
    assert_eq!(monitor.work_completed(), monitor.total_work());
    assert_eq!(monitor.percent_done(), 100);
}
