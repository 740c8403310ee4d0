use crate::{JobId, SelectedFile, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitFile {
        submission: SubmissionId,
        file: SelectedFile,
    },
    AttachStream { job_id: JobId },
    DetachStream { job_id: JobId },
}
