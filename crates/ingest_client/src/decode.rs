use ingest_core::ProgressEvent;
use serde::Deserialize;
use thiserror::Error;

const KNOWN_STATUSES: &[&str] = &[
    "processing",
    "failed",
    "error",
    "parsing",
    "parsing_complete",
    "completed",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedFrame {
    Event(ProgressEvent),
    /// A well-formed frame whose `status` this client does not know. Ignorable.
    Unrecognized(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("frame has no string status field")]
    MissingStatus,
    #[error("invalid fields for status {status}: {message}")]
    InvalidFields { status: String, message: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum WireEvent {
    Processing {
        #[serde(alias = "index")]
        current: u64,
        total: u64,
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
    Failed {
        url: String,
        #[serde(default)]
        reason: String,
    },
    Error {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        message: String,
    },
    Parsing {
        #[serde(default)]
        message: String,
    },
    ParsingComplete {
        #[serde(default)]
        message: String,
    },
    Completed {
        #[serde(default)]
        success: u64,
        #[serde(default)]
        failed: u64,
    },
}

impl From<WireEvent> for ProgressEvent {
    fn from(wire: WireEvent) -> Self {
        match wire {
            WireEvent::Processing {
                current,
                total,
                url,
                title,
            } => ProgressEvent::Processing {
                index: current,
                total,
                url,
                title,
            },
            WireEvent::Failed { url, reason } => ProgressEvent::Failed { url, reason },
            WireEvent::Error { url, message } => ProgressEvent::Error { url, message },
            WireEvent::Parsing { message } => ProgressEvent::Parsing { message },
            WireEvent::ParsingComplete { message } => ProgressEvent::ParsingComplete { message },
            WireEvent::Completed { success, failed } => ProgressEvent::Completed { success, failed },
        }
    }
}

/// Decodes one status-feed `data` payload.
pub fn decode_frame(data: &str) -> Result<DecodedFrame, DecodeError> {
    let value: serde_json::Value =
        serde_json::from_str(data).map_err(|err| DecodeError::InvalidJson(err.to_string()))?;

    let status = value
        .get("status")
        .and_then(serde_json::Value::as_str)
        .ok_or(DecodeError::MissingStatus)?
        .to_string();
    if !KNOWN_STATUSES.contains(&status.as_str()) {
        return Ok(DecodedFrame::Unrecognized(status));
    }

    let wire: WireEvent =
        serde_json::from_value(value).map_err(|err| DecodeError::InvalidFields {
            status,
            message: err.to_string(),
        })?;
    Ok(DecodedFrame::Event(wire.into()))
}

#[cfg(test)]
mod tests {
    use super::{decode_frame, DecodeError, DecodedFrame};
    use ingest_core::ProgressEvent;

    fn event(data: &str) -> ProgressEvent {
        match decode_frame(data) {
            Ok(DecodedFrame::Event(event)) => event,
            other => panic!("expected an event, got {other:?}"),
        }
    }

    #[test]
    fn processing_reads_backend_field_names() {
        let decoded = event(
            r#"{"status":"processing","current":1,"total":3,"url":"a.com","title":"A"}"#,
        );
        assert_eq!(
            decoded,
            ProgressEvent::Processing {
                index: 1,
                total: 3,
                url: "a.com".into(),
                title: Some("A".into()),
            }
        );

        let decoded = event(r#"{"status":"processing","index":2,"total":3,"url":"b.com"}"#);
        assert!(matches!(
            decoded,
            ProgressEvent::Processing { index: 2, title: None, .. }
        ));
    }

    #[test]
    fn completed_and_parsing_ignore_extra_fields() {
        assert_eq!(
            event(r#"{"status":"completed","success":2,"failed":1,"message":"Ingestion complete"}"#),
            ProgressEvent::Completed { success: 2, failed: 1 }
        );
        assert_eq!(
            event(r#"{"status":"parsing_complete","total":3,"message":"Found 3 bookmarks"}"#),
            ProgressEvent::ParsingComplete {
                message: "Found 3 bookmarks".into()
            }
        );
    }

    #[test]
    fn pipeline_error_without_url_decodes() {
        assert_eq!(
            event(r#"{"status":"error","message":"disk full"}"#),
            ProgressEvent::Error {
                url: None,
                message: "disk full".into()
            }
        );
    }

    #[test]
    fn unknown_status_is_ignorable() {
        assert_eq!(
            decode_frame(r#"{"status":"heartbeat"}"#),
            Ok(DecodedFrame::Unrecognized("heartbeat".into()))
        );
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(matches!(
            decode_frame("not json"),
            Err(DecodeError::InvalidJson(_))
        ));
        assert_eq!(decode_frame(r#"{"current":1}"#), Err(DecodeError::MissingStatus));
        assert!(matches!(
            decode_frame(r#"{"status":"processing","total":3}"#),
            Err(DecodeError::InvalidFields { .. })
        ));
    }
}
