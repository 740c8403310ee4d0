use crate::{AppState, Effect, IngestionState, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(file) => {
            // A running job keeps its file; selection is locked until it finishes.
            if state.ingestion().is_busy() {
                return (state, Vec::new());
            }
            state.select_file(file);
            Vec::new()
        }
        Msg::SubmitClicked => {
            // Single job per tracker: re-entrant submissions are rejected.
            if *state.ingestion() != IngestionState::Idle {
                return (state, Vec::new());
            }
            match state.begin_upload() {
                Some((submission, file)) => vec![Effect::SubmitFile { submission, file }],
                None => Vec::new(),
            }
        }
        Msg::SubmitSucceeded { submission, job_id } => {
            // Replies for an upload abandoned by Dispose or a new selection are stale.
            if !state.is_awaiting(submission) {
                return (state, Vec::new());
            }
            state.start_tracking(job_id.clone());
            vec![Effect::AttachStream { job_id }]
        }
        Msg::SubmitFailed { submission, reason } => {
            if state.is_awaiting(submission) {
                state.fail(reason);
            }
            Vec::new()
        }
        Msg::StreamEvent { job_id, event } => {
            if state.is_tracking(&job_id) {
                state.apply_event(&event);
            }
            Vec::new()
        }
        Msg::StreamFailed { job_id, reason } => {
            // Once Completed has been folded the job is no longer tracking, so late
            // transport errors fall through here without effect.
            if state.is_tracking(&job_id) {
                state.fail(reason);
            }
            Vec::new()
        }
        Msg::Dispose => {
            let detach = match (state.ingestion(), state.job()) {
                (IngestionState::Tracking, Some(job)) => vec![Effect::DetachStream {
                    job_id: job.id.clone(),
                }],
                _ => Vec::new(),
            };
            if *state.ingestion() != IngestionState::Idle || state.job().is_some() {
                state.reset();
            }
            detach
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
