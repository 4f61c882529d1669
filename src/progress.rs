// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! An observable progress object for long-running archive operations.
//!
//! A [`ProgressMonitor`] is cheap to clone; every clone observes the same operation. Cancellation is cooperative:
//! the mutation engine checks for it between copied chunks and between entries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Result, ZipError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Ready,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Task {
    #[default]
    None,
    RemoveEntry,
    RenameEntry,
    MergeSplitArchive,
    SplitArchive,
}

/// The step an operation is currently performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Planning,
    Copying,
    HeaderUpdate,
    Finalize,
    Commit,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskResult {
    Success,
    Error,
    Cancelled,
}

#[derive(Debug, Default)]
struct Progress {
    state: State,
    task: Task,
    phase: Phase,
    total_work: u64,
    work_completed: u64,
    file_name: Option<String>,
    result: Option<TaskResult>,
    error: Option<ZipError>,
}

#[derive(Debug, Default)]
struct Inner {
    progress: Mutex<Progress>,
    cancel: AtomicBool,
}

/// Publishes coarse progress of one operation at a time, and carries its cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct ProgressMonitor {
    inner: Arc<Inner>,
}

impl ProgressMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        self.inner.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the start of a task, failing with [`ZipError::TaskInProgress`] if one is already running.
    pub fn begin(&self, task: Task) -> Result<()> {
        let mut progress = self.lock();

        if progress.state == State::Busy {
            return Err(ZipError::TaskInProgress);
        }

        *progress = Progress { state: State::Busy, task, ..Default::default() };
        self.inner.cancel.store(false, Ordering::SeqCst);

        tracing::debug!(?task, "task started");
        Ok(())
    }

    /// Records how a task ended and returns the monitor to [`State::Ready`].
    pub fn finish<T>(&self, result: &Result<T>) {
        let mut progress = self.lock();
        Self::complete(&mut progress, result);
    }

    /// Records how a background task ended, keeping its error for [`ProgressMonitor::take_error`].
    ///
    /// The error is stored before the monitor returns to [`State::Ready`], so a caller polling the state always
    /// finds it.
    pub(crate) fn finish_background(&self, result: Result<()>) {
        let mut progress = self.lock();
        Self::complete(&mut progress, &result);

        if let Err(error) = result {
            tracing::warn!(%error, "background task failed");
            progress.error = Some(error);
        }
    }

    fn complete<T>(progress: &mut Progress, result: &Result<T>) {
        progress.result = Some(match result {
            Ok(_) => TaskResult::Success,
            Err(ZipError::Cancelled) => TaskResult::Cancelled,
            Err(_) => TaskResult::Error,
        });
        progress.state = State::Ready;
        progress.file_name = None;

        tracing::debug!(task = ?progress.task, result = ?progress.result, "task finished");
    }

    /// Takes the error a background task failed with, if any.
    pub fn take_error(&self) -> Option<ZipError> {
        self.lock().error.take()
    }

    pub fn set_phase(&self, phase: Phase) {
        let mut progress = self.lock();
        tracing::debug!(task = ?progress.task, ?phase, "phase changed");
        progress.phase = phase;
    }

    pub fn set_total_work(&self, total_work: u64) {
        let mut progress = self.lock();
        progress.total_work = total_work;
        progress.work_completed = 0;
    }

    pub fn update_work_completed(&self, work: u64) {
        let mut progress = self.lock();
        progress.work_completed = progress.work_completed.saturating_add(work);
    }

    pub fn set_file_name(&self, file_name: Option<&str>) {
        self.lock().file_name = file_name.map(str::to_owned);
    }

    /// Requests that the running task stops at its next checkpoint.
    pub fn cancel(&self) {
        self.inner.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.inner.cancel.load(Ordering::SeqCst)
    }

    /// A cancellation checkpoint.
    pub fn check_cancelled(&self) -> Result<()> {
        match self.is_cancel_requested() {
            true => Err(ZipError::Cancelled),
            false => Ok(()),
        }
    }

    pub fn state(&self) -> State {
        self.lock().state
    }

    pub fn task(&self) -> Task {
        self.lock().task
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn total_work(&self) -> u64 {
        self.lock().total_work
    }

    pub fn work_completed(&self) -> u64 {
        self.lock().work_completed
    }

    /// Completed work as a percentage of the total, capped at 100.
    pub fn percent_done(&self) -> u8 {
        let progress = self.lock();

        match progress.total_work {
            0 => 0,
            total => std::cmp::min(progress.work_completed.saturating_mul(100) / total, 100) as u8,
        }
    }

    pub fn file_name(&self) -> Option<String> {
        self.lock().file_name.clone()
    }

    pub fn result(&self) -> Option<TaskResult> {
        self.lock().result
    }
}
