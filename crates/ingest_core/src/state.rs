use std::path::{Path, PathBuf};

use crate::view_model::AppViewModel;
use crate::{fold, JobId, ProgressEvent, ProgressSnapshot};

/// Lifecycle of the single job a tracker instance owns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IngestionState {
    #[default]
    Idle,
    /// Transient: the upload request is in flight. Never receives progress events.
    Uploading,
    Tracking,
    Completed,
    Failed(String),
}

impl IngestionState {
    pub fn is_busy(&self) -> bool {
        matches!(self, IngestionState::Uploading | IngestionState::Tracking)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestionState::Completed | IngestionState::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            IngestionState::Idle => "idle",
            IngestionState::Uploading => "uploading",
            IngestionState::Tracking => "processing",
            IngestionState::Completed => "completed",
            IngestionState::Failed(_) => "error",
        }
    }
}

/// A bookmark export chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }
}

/// True for `.html` / `.htm` files, ignoring case.
pub fn has_bookmark_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

/// Sequence number of an upload request, so a late reply for an abandoned upload
/// cannot attach to a newer one.
pub type SubmissionId = u64;

/// A backend-accepted job. Discarded on reset, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub file: SelectedFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    ingestion: IngestionState,
    selected: Option<SelectedFile>,
    job: Option<Job>,
    snapshot: ProgressSnapshot,
    submission: Option<SubmissionId>,
    next_submission: SubmissionId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingestion(&self) -> &IngestionState {
        &self.ingestion
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            state: self.ingestion.clone(),
            file_name: self.selected.as_ref().map(|file| file.name.clone()),
            job_id: self.job.as_ref().map(|job| job.id.clone()),
            processed: self.snapshot.processed_count(),
            failed: self.snapshot.failed_count(),
            total: self.snapshot.total(),
            percent: self
                .snapshot
                .percent_complete()
                .map(|percent| percent.round() as u8)
                .unwrap_or(0),
            lines: self.snapshot.lines().to_vec(),
            controls_enabled: !self.ingestion.is_busy(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// True when `job_id` names the job currently being tracked.
    pub(crate) fn is_tracking(&self, job_id: &JobId) -> bool {
        self.ingestion == IngestionState::Tracking
            && self.job.as_ref().is_some_and(|job| &job.id == job_id)
    }

    /// True while the upload tagged `submission` is the one in flight.
    pub(crate) fn is_awaiting(&self, submission: SubmissionId) -> bool {
        self.ingestion == IngestionState::Uploading && self.submission == Some(submission)
    }

    pub(crate) fn select_file(&mut self, file: SelectedFile) {
        self.ingestion = IngestionState::Idle;
        self.selected = Some(file);
        self.job = None;
        self.submission = None;
        self.snapshot = ProgressSnapshot::new();
        self.dirty = true;
    }

    pub(crate) fn begin_upload(&mut self) -> Option<(SubmissionId, SelectedFile)> {
        let file = self.selected.clone()?;
        let submission = self.next_submission;
        self.next_submission = self.next_submission.wrapping_add(1);
        self.submission = Some(submission);
        self.ingestion = IngestionState::Uploading;
        self.dirty = true;
        Some((submission, file))
    }

    pub(crate) fn start_tracking(&mut self, job_id: JobId) {
        let Some(file) = self.selected.clone() else {
            return;
        };
        self.job = Some(Job { id: job_id, file });
        self.submission = None;
        self.ingestion = IngestionState::Tracking;
        self.dirty = true;
    }

    pub(crate) fn apply_event(&mut self, event: &ProgressEvent) {
        let snapshot = std::mem::take(&mut self.snapshot);
        self.snapshot = fold(snapshot, event);
        if self.snapshot.is_terminal() {
            self.ingestion = IngestionState::Completed;
        }
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.submission = None;
        self.ingestion = IngestionState::Failed(reason.into());
        self.dirty = true;
    }

    pub(crate) fn reset(&mut self) {
        self.ingestion = IngestionState::Idle;
        self.job = None;
        self.submission = None;
        self.snapshot = ProgressSnapshot::new();
        self.dirty = true;
    }
}
