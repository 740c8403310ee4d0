//! Ingest core: pure job-tracking state machine, progress fold and view-model helpers.
mod effect;
mod event;
mod msg;
mod snapshot;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use event::{JobId, ProgressEvent};
pub use msg::Msg;
pub use snapshot::{fold, ProgressSnapshot};
pub use state::{
    has_bookmark_extension, AppState, IngestionState, Job, SelectedFile, SubmissionId,
};
pub use update::update;
pub use view_model::AppViewModel;
