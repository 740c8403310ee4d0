use crate::{JobId, ProgressEvent, SelectedFile, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a bookmark export. Resets any finished job.
    FileSelected(SelectedFile),
    /// User asked to start ingestion of the selected file.
    SubmitClicked,
    /// Backend accepted the upload.
    SubmitSucceeded {
        submission: SubmissionId,
        job_id: JobId,
    },
    /// Upload could not be turned into a job.
    SubmitFailed {
        submission: SubmissionId,
        reason: String,
    },
    /// Decoded event from the job's status feed.
    StreamEvent { job_id: JobId, event: ProgressEvent },
    /// Status feed broke before the terminal event.
    StreamFailed { job_id: JobId, reason: String },
    /// Tracker is being torn down (view closed, user navigated away).
    Dispose,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
