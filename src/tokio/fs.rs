// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Archive mutation over a file system path.
//!
//! Every operation writes its result to a temporary file beside the destination and only moves it into place once
//! the new headers have been written in full. On failure or cancellation the temporary file is deleted and the
//! original archive is left untouched.
//!
//! ### Usage
//! A [`ZipArchive`] is cheap to clone; clones share the same model and [`ProgressMonitor`], and so also share the
//! rule that only one operation may run at a time. With [`MutationOptions::run_in_background`] set, operations are
//! spawned onto the runtime and return immediately; their progress and outcome are then observed through
//! [`ZipArchive::monitor()`].
//!
//! ### Example
//! ```no_run
//! # use zip_rewrite::tokio::fs::ZipArchive;
//! # use zip_rewrite::error::Result;
//! #
//! async fn run() -> Result<()> {
//!     let archive = ZipArchive::open("./foo.zip").await?;
//!
//!     archive.remove_entry("bar.txt").await?;
//!     archive.rename_entry("baz.txt", "qux.txt").await?;
//!
//!     for header in archive.model().file_headers() {
//!         println!("{}", header.file_name);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::base::read::{assemble, expected_entries, read_central_directory, read_central_directory_at};
use crate::base::read::{read_end_records, read_zip64_record, MAX_CD_BUFFER_SIZE};
use crate::error::{Result, ZipError};
use crate::model::{ArchiveModel, CentralDirectory};
use crate::mutate::MutationOptions;
use crate::progress::{Phase, ProgressMonitor, Task};
use crate::split::{part_path, part_paths};

use encoding_rs::Encoding;
use futures_lite::io::{AsyncReadExt, AsyncSeekExt, Cursor, SeekFrom};
use tempfile::TempPath;
use tokio::fs::File;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

const TEMP_PREFIX: &str = ".zip_rewrite";

/// An archive on disk, along with the model of its headers.
#[derive(Debug, Clone)]
pub struct ZipArchive {
    path: Arc<PathBuf>,
    model: Arc<Mutex<ArchiveModel>>,
    monitor: ProgressMonitor,
    options: MutationOptions,
}

impl ZipArchive {
    /// Opens the archive at the given path, reading its headers.
    ///
    /// For a split archive, this is the path of the final part (`name.zip`).
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_charset(path, None).await
    }

    /// Opens the archive at the given path, decoding names without the UTF-8 flag with `charset`.
    pub async fn open_with_charset(path: impl AsRef<Path>, charset: Option<&'static Encoding>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let model = read_model(&path, charset).await?;

        Ok(Self {
            path: Arc::new(path),
            model: Arc::new(Mutex::new(model)),
            monitor: ProgressMonitor::new(),
            options: MutationOptions::default(),
        })
    }

    pub fn with_options(mut self, options: MutationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &MutationOptions {
        &self.options
    }

    pub fn monitor(&self) -> &ProgressMonitor {
        &self.monitor
    }

    /// Returns a snapshot of the archive's headers.
    pub fn model(&self) -> ArchiveModel {
        self.model.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn replace_model(&self, model: ArchiveModel) {
        *self.model.lock().unwrap_or_else(PoisonError::into_inner) = model;
    }

    /// Re-reads the archive's headers from disk.
    pub async fn reload(&self) -> Result<()> {
        let model = read_model(&self.path, self.model().charset).await?;
        self.replace_model(model);
        Ok(())
    }

    /// Removes a single entry, failing with [`ZipError::EntryNotFound`] if it doesn't exist.
    pub async fn remove_entry(&self, name: &str) -> Result<()> {
        if self.model().file_header(name).is_none() {
            return Err(ZipError::EntryNotFound(name.to_owned()));
        }

        self.remove_entries(&[name]).await
    }

    /// Removes every named entry which exists. Removing a directory also removes its contents.
    pub async fn remove_entries<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let names: Vec<String> = names.iter().map(|name| name.as_ref().to_owned()).collect();

        self.run(Task::RemoveEntry, |archive| async move {
            let mut model = archive.model();
            let mut source = File::open(archive.path()).await?.compat();
            let mut staged = Staged::beside(archive.path())?;

            let result = crate::mutate::remove_entries(
                &mut source,
                &mut staged.file,
                &mut model,
                &names,
                &archive.options,
                &archive.monitor,
            )
            .await;

            drop(source);
            archive.commit(vec![(staged, archive.path().to_path_buf())], result).await?;
            archive.replace_model(model);
            Ok(())
        })
        .await
    }

    /// Renames a single entry, failing with [`ZipError::EntryNotFound`] if it doesn't exist.
    pub async fn rename_entry(&self, name: &str, new_name: &str) -> Result<()> {
        if self.model().file_header(name).is_none() {
            return Err(ZipError::EntryNotFound(name.to_owned()));
        }

        self.rename_entries(HashMap::from([(name.to_owned(), new_name.to_owned())])).await
    }

    /// Renames entries by mapping of old name to new name. Names which don't exist are skipped.
    pub async fn rename_entries(&self, renames: HashMap<String, String>) -> Result<()> {
        self.run(Task::RenameEntry, |archive| async move {
            let mut model = archive.model();
            let mut source = File::open(archive.path()).await?.compat();
            let mut staged = Staged::beside(archive.path())?;

            let result = crate::mutate::rename_entries(
                &mut source,
                &mut staged.file,
                &mut model,
                &renames,
                &archive.options,
                &archive.monitor,
            )
            .await;

            drop(source);
            archive.commit(vec![(staged, archive.path().to_path_buf())], result).await?;
            archive.replace_model(model);
            Ok(())
        })
        .await
    }

    /// Merges this split archive into a single archive at `destination`.
    ///
    /// The parts are left in place unless `destination` is this archive's own path, in which case the final part is
    /// replaced and this handle then describes the merged archive.
    pub async fn merge_split_archive(&self, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref().to_path_buf();

        self.run(Task::MergeSplitArchive, |archive| async move {
            let mut model = archive.model();
            if !model.is_split_archive() {
                return Err(ZipError::NotASplitArchive);
            }

            let mut parts = Vec::new();
            for path in part_paths(archive.path(), model.this_disk() + 1) {
                parts.push(open_part(&path).await?);
            }

            let mut staged = Staged::beside(&destination)?;
            let result = crate::mutate::merge_split_archive(
                &mut parts,
                &mut staged.file,
                &mut model,
                &archive.options,
                &archive.monitor,
            )
            .await;

            drop(parts);
            archive.commit(vec![(staged, destination.clone())], result).await?;

            if destination == *archive.path {
                model.path = Some(destination);
                archive.replace_model(model);
            }
            Ok(())
        })
        .await
    }

    /// Splits this archive into parts of at most `split_length` bytes, named after `destination`.
    ///
    /// `destination` names the final part; earlier parts take the extensions `.z01`, `.z02` and so on.
    pub async fn split_archive(&self, destination: impl AsRef<Path>, split_length: u64) -> Result<()> {
        let destination = destination.as_ref().to_path_buf();

        self.run(Task::SplitArchive, |archive| async move {
            let mut model = archive.model();
            let source = File::open(archive.path()).await?.compat();

            let mut temp_paths = Vec::new();
            let new_part = |_disk: u32| -> Result<Compat<File>> {
                let staged = Staged::beside(&destination)?;
                temp_paths.push(staged.path);
                Ok(staged.file)
            };

            let result =
                crate::mutate::split_archive(source, &mut model, split_length, new_part, &archive.options, &archive.monitor)
                    .await;

            let files = match result {
                Ok(files) => files,
                Err(error) => return archive.commit(Vec::new(), Err(error)).await,
            };

            let total_disks = files.len() as u32;
            let staged = files
                .into_iter()
                .zip(temp_paths)
                .enumerate()
                .map(|(disk, (file, path))| (Staged { file, path }, part_path(&destination, disk as u32, total_disks)))
                .collect();

            archive.commit(staged, Ok(())).await?;

            if destination == *archive.path {
                model.path = Some(destination);
                archive.replace_model(model);
            }
            Ok(())
        })
        .await
    }

    /// Runs an operation as the monitor's one task, in the background if so configured.
    async fn run<F, Fut>(&self, task: Task, operation: F) -> Result<()>
    where
        F: FnOnce(ZipArchive) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.monitor.begin(task)?;
        let future = operation(self.clone());

        if self.options.run_in_background {
            let monitor = self.monitor.clone();
            tokio::spawn(async move { monitor.finish_background(future.await) });
            return Ok(());
        }

        let result = future.await;
        self.monitor.finish(&result);
        result
    }

    /// Moves every staged file to its target if the operation succeeded, or discards them all if it didn't.
    async fn commit(&self, staged: Vec<(Staged, PathBuf)>, result: Result<()>) -> Result<()> {
        if let Err(error) = result {
            self.monitor.set_phase(Phase::Abort);
            tracing::debug!(%error, "discarding staged output");
            return Err(error);
        }

        self.monitor.set_phase(Phase::Commit);

        let mut synced = Vec::with_capacity(staged.len());
        for (staged, target) in staged {
            synced.push((staged.sync().await?, target));
        }

        for (path, target) in synced {
            path.persist(&target).map_err(|error| error.error)?;
            tracing::debug!(target = %target.display(), "committed archive");
        }

        Ok(())
    }
}

/// An output file written under a temporary name, deleted on drop unless persisted.
struct Staged {
    file: Compat<File>,
    path: TempPath,
}

impl Staged {
    /// Creates a temporary file in the same directory as `target`, so that it can later be renamed over it.
    fn beside(target: &Path) -> Result<Self> {
        let directory = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let (file, path) = tempfile::Builder::new().prefix(TEMP_PREFIX).tempfile_in(directory)?.into_parts();
        Ok(Self { file: File::from_std(file).compat(), path })
    }

    /// Flushes the file to disk and closes it, leaving the path to be persisted.
    async fn sync(self) -> Result<TempPath> {
        let file = self.file.into_inner();
        file.sync_all().await?;
        drop(file);
        Ok(self.path)
    }
}

async fn open_part(path: &Path) -> Result<Compat<File>> {
    match File::open(path).await {
        Ok(file) => Ok(file.compat()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Err(ZipError::MissingSplitPart(path.to_owned())),
        Err(error) => Err(error.into()),
    }
}

/// Reads an archive's headers from disk, following the end records into earlier parts of a split archive.
#[tracing::instrument]
pub async fn read_model(path: &Path, charset: Option<&'static Encoding>) -> Result<ArchiveModel> {
    let mut last = File::open(path).await?.compat();
    let end = read_end_records(&mut last, charset).await?;

    let zip64_record = match &end.zip64_locator {
        Some(locator) if locator.disk_with_start_eocdr + 1 < locator.total_disks => {
            let mut part = open_part(&part_path(path, locator.disk_with_start_eocdr, locator.total_disks)).await?;
            Some(read_zip64_record(&mut part, locator.relative_offset_eocdr).await?)
        }
        Some(locator) => Some(read_zip64_record(&mut last, locator.relative_offset_eocdr).await?),
        None => None,
    };

    let mut model = assemble(end, zip64_record, charset);

    model.central_directory = match model.central_directory_disk() == model.this_disk() {
        true => read_central_directory_at(&mut last, &model).await?,
        false => read_spanning_central_directory(path, &model).await?,
    };

    model.path = Some(path.to_path_buf());
    Ok(model)
}

/// Reads a central directory which starts in an earlier part, continuing through later parts as needed.
async fn read_spanning_central_directory(path: &Path, model: &ArchiveModel) -> Result<CentralDirectory> {
    let total_disks = model.this_disk() + 1;
    let mut remaining = model.central_directory_size();
    let mut bytes = Vec::with_capacity(std::cmp::min(remaining, MAX_CD_BUFFER_SIZE as u64) as usize);

    let mut disk = model.central_directory_disk();
    let mut offset = model.central_directory_offset();

    while remaining > 0 {
        if disk >= total_disks {
            return Err(ZipError::TruncatedInput(remaining as usize));
        }

        let mut part = open_part(&part_path(path, disk, total_disks)).await?;
        part.seek(SeekFrom::Start(offset)).await?;
        remaining -= (&mut part).take(remaining).read_to_end(&mut bytes).await? as u64;

        disk += 1;
        offset = 0;
    }

    tracing::debug!(size = bytes.len(), "read central directory spanning parts");
    read_central_directory(Cursor::new(bytes), expected_entries(model), model.charset).await
}
