use std::path::Path;

use ingest_core::{JobId, SelectedFile};
use ingest_logging::{ingest_info, ingest_warn};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::settings::{error_detail, ClientSettings, UPLOAD_PATH};
use crate::types::{SubmissionError, UPLOAD_FAILED};

/// A bookmark export read into memory, ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn read(file: &SelectedFile) -> Result<Self, SubmissionError> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|err| io_error(&file.path, err))?;
        Ok(Self::new(file.name.clone(), bytes))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> SubmissionError {
    SubmissionError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Turns an upload into a backend job. Does not touch tracker state.
#[async_trait::async_trait]
pub trait JobSubmitter: Send + Sync {
    async fn submit(&self, file: UploadFile) -> Result<JobId, SubmissionError>;
}

#[derive(Deserialize)]
struct UploadAccepted {
    task_id: String,
}

#[derive(Debug, Clone)]
pub struct ReqwestSubmitter {
    settings: ClientSettings,
}

impl ReqwestSubmitter {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl JobSubmitter for ReqwestSubmitter {
    async fn submit(&self, file: UploadFile) -> Result<JobId, SubmissionError> {
        let url = self
            .settings
            .endpoint(UPLOAD_PATH)
            .map_err(|err| SubmissionError::Endpoint(err.to_string()))?;
        let client = self
            .settings
            .http_client(Some(self.settings.request_timeout))
            .map_err(|err| SubmissionError::Network(err.to_string()))?;

        ingest_info!(
            "Uploading {} ({} bytes) to {}",
            file.file_name,
            file.bytes.len(),
            url
        );
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str("text/html")
            .map_err(|err| SubmissionError::Network(err.to_string()))?;
        let form = Form::new().part("file", part);

        let response = client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| SubmissionError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| SubmissionError::Network(err.to_string()))?;

        if !status.is_success() {
            let detail = error_detail(&body).unwrap_or_else(|| UPLOAD_FAILED.to_string());
            ingest_warn!("Upload rejected status={} detail={}", status.as_u16(), detail);
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let accepted: UploadAccepted = serde_json::from_slice(&body)
            .map_err(|err| SubmissionError::InvalidResponse(err.to_string()))?;
        if accepted.task_id.is_empty() {
            return Err(SubmissionError::InvalidResponse("empty task_id".into()));
        }
        ingest_info!("Upload accepted task_id={}", accepted.task_id);
        Ok(JobId::new(accepted.task_id))
    }
}
