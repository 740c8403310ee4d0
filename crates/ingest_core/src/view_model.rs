use crate::{IngestionState, JobId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub state: IngestionState,
    pub file_name: Option<String>,
    pub job_id: Option<JobId>,
    pub processed: u64,
    pub failed: u64,
    pub total: u64,
    /// Rounded percent complete; 0 while the total is unknown.
    pub percent: u8,
    pub lines: Vec<String>,
    /// Upload controls are disabled while a job is uploading or tracking.
    pub controls_enabled: bool,
    pub dirty: bool,
}
