use std::time::Duration;

use ingest_client::{EngineEvent, EngineHandle};
use ingest_core::{Effect, Msg};
use ingest_logging::{ingest_debug, ingest_info};

/// Executes core effects against the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitFile { submission, file } => {
                    ingest_info!(
                        "SubmitFile submission={} name={} path={:?}",
                        submission,
                        file.name,
                        file.path
                    );
                    self.engine.submit(submission, file);
                }
                Effect::AttachStream { job_id } => {
                    ingest_info!("AttachStream job_id={}", job_id);
                    self.engine.attach(job_id);
                }
                Effect::DetachStream { job_id } => {
                    ingest_info!("DetachStream job_id={}", job_id);
                    self.engine.detach(job_id);
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(to_msg)
    }
}

pub(crate) fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted {
            submission, result, ..
        } => match result {
            Ok(job_id) => Msg::SubmitSucceeded { submission, job_id },
            Err(err) => Msg::SubmitFailed {
                submission,
                reason: err.user_message(),
            },
        },
        EngineEvent::Progress { job_id, event } => Msg::StreamEvent { job_id, event },
        EngineEvent::StreamFailed { job_id, error } => Msg::StreamFailed {
            job_id,
            reason: error.to_string(),
        },
        other => {
            ingest_debug!("Engine event without tracker message: {}", other);
            Msg::NoOp
        }
    }
}

#[cfg(test)]
mod tests {
    use ingest_client::{EngineEvent, StreamTransportError, SubmissionError};
    use ingest_core::{JobId, Msg, SelectedFile};

    use super::to_msg;

    #[test]
    fn rejected_submission_becomes_failure_with_detail() {
        let msg = to_msg(EngineEvent::Submitted {
            submission: 3,
            file: SelectedFile::new("bookmarks.html"),
            result: Err(SubmissionError::Rejected {
                status: 400,
                detail: "unsupported file".into(),
            }),
        });
        assert_eq!(
            msg,
            Msg::SubmitFailed {
                submission: 3,
                reason: "unsupported file".into()
            }
        );
    }

    #[test]
    fn accepted_submission_keeps_its_sequence_number() {
        let msg = to_msg(EngineEvent::Submitted {
            submission: 4,
            file: SelectedFile::new("bookmarks.html"),
            result: Ok(JobId::new("abc123")),
        });
        assert_eq!(
            msg,
            Msg::SubmitSucceeded {
                submission: 4,
                job_id: JobId::new("abc123"),
            }
        );
    }

    #[test]
    fn early_close_becomes_stream_failure() {
        let msg = to_msg(EngineEvent::StreamFailed {
            job_id: JobId::new("abc123"),
            error: StreamTransportError::ClosedBeforeCompletion,
        });
        assert_eq!(
            msg,
            Msg::StreamFailed {
                job_id: JobId::new("abc123"),
                reason: "stream closed before completion".into()
            }
        );
    }

    #[test]
    fn clean_end_is_not_a_tracker_message() {
        let msg = to_msg(EngineEvent::StreamEnded {
            job_id: JobId::new("abc123"),
        });
        assert_eq!(msg, Msg::NoOp);
    }
}
