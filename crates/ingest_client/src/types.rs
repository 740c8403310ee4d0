use std::fmt;

use ingest_core::{JobId, ProgressEvent, SelectedFile, SubmissionId};
use thiserror::Error;

use crate::query::{IndexStats, QueryResponse};

/// Fallback shown when the backend gave no usable reason for a failed upload.
pub(crate) const UPLOAD_FAILED: &str = "Upload failed";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid upload endpoint: {0}")]
    Endpoint(String),
    #[error("upload request failed: {0}")]
    Network(String),
    #[error("upload rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("upload response carried no task id: {0}")]
    InvalidResponse(String),
}

impl SubmissionError {
    /// The single terminal message presented to the user.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Rejected { detail, .. } => detail.clone(),
            SubmissionError::Io { .. } => self.to_string(),
            _ => UPLOAD_FAILED.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamTransportError {
    #[error("invalid status endpoint: {0}")]
    Endpoint(String),
    #[error("could not connect to status feed: {0}")]
    Connect(String),
    #[error("status feed returned http status {0}")]
    HttpStatus(u16),
    #[error("status feed transport error: {0}")]
    Transport(String),
    #[error("stream closed before completion")]
    ClosedBeforeCompletion,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid query endpoint: {0}")]
    Endpoint(String),
    #[error("query request failed: {0}")]
    Network(String),
    #[error("query failed with status {status}: {detail}")]
    HttpStatus { status: u16, detail: String },
    #[error("unexpected query response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted {
        submission: SubmissionId,
        file: SelectedFile,
        result: Result<JobId, SubmissionError>,
    },
    Progress {
        job_id: JobId,
        event: ProgressEvent,
    },
    /// Status feed broke before a terminal event was seen.
    StreamFailed {
        job_id: JobId,
        error: StreamTransportError,
    },
    /// Status feed closed after the terminal event.
    StreamEnded { job_id: JobId },
    Answered(Result<QueryResponse, QueryError>),
    Stats(Result<IndexStats, QueryError>),
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::Submitted { file, result, .. } => match result {
                Ok(job_id) => write!(f, "submitted {} as job {job_id}", file.name),
                Err(err) => write!(f, "submission of {} failed: {err}", file.name),
            },
            EngineEvent::Progress { job_id, event } => write!(f, "job {job_id}: {event:?}"),
            EngineEvent::StreamFailed { job_id, error } => write!(f, "job {job_id}: {error}"),
            EngineEvent::StreamEnded { job_id } => write!(f, "job {job_id}: stream ended"),
            EngineEvent::Answered(Ok(_)) => write!(f, "answer received"),
            EngineEvent::Answered(Err(err)) => write!(f, "query failed: {err}"),
            EngineEvent::Stats(Ok(_)) => write!(f, "stats received"),
            EngineEvent::Stats(Err(err)) => write!(f, "stats failed: {err}"),
        }
    }
}
