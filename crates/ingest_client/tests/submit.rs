use std::time::Duration;

use ingest_client::{ClientSettings, JobSubmitter, ReqwestSubmitter, SubmissionError, UploadFile};
use ingest_core::{JobId, SelectedFile};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn export() -> UploadFile {
    UploadFile::new(
        "bookmarks.html",
        b"<DL><DT><A HREF=\"https://a.example\">A</A></DL>".to_vec(),
    )
}

#[tokio::test]
async fn upload_posts_multipart_and_returns_task_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"bookmarks.html\""))
        .and(body_string_contains("https://a.example"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_id": "abc123",
            "message": "Ingestion started"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let submitter = ReqwestSubmitter::new(ClientSettings::with_base_url(server.uri()));
    let job_id = submitter.submit(export()).await.expect("upload accepted");

    assert_eq!(job_id, JobId::new("abc123"));
}

#[tokio::test]
async fn rejection_carries_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "detail": "unsupported file"
            })),
        )
        .mount(&server)
        .await;

    let submitter = ReqwestSubmitter::new(ClientSettings::with_base_url(server.uri()));
    let err = submitter.submit(export()).await.unwrap_err();

    assert_eq!(
        err,
        SubmissionError::Rejected {
            status: 400,
            detail: "unsupported file".into()
        }
    );
    assert_eq!(err.user_message(), "unsupported file");
}

#[tokio::test]
async fn rejection_without_detail_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let submitter = ReqwestSubmitter::new(ClientSettings::with_base_url(server.uri()));
    let err = submitter.submit(export()).await.unwrap_err();

    assert_eq!(err.user_message(), "Upload failed");
    assert!(matches!(err, SubmissionError::Rejected { status: 500, .. }));
}

#[tokio::test]
async fn empty_detail_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({ "detail": "" })),
        )
        .mount(&server)
        .await;

    let submitter = ReqwestSubmitter::new(ClientSettings::with_base_url(server.uri()));
    let err = submitter.submit(export()).await.unwrap_err();

    assert_eq!(
        err,
        SubmissionError::Rejected {
            status: 400,
            detail: "Upload failed".into()
        }
    );
    assert_eq!(err.user_message(), "Upload failed");
}

#[tokio::test]
async fn success_without_task_id_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Ingestion started"
        })))
        .mount(&server)
        .await;

    let submitter = ReqwestSubmitter::new(ClientSettings::with_base_url(server.uri()));
    let err = submitter.submit(export()).await.unwrap_err();
    assert!(matches!(err, SubmissionError::InvalidResponse(_)));
}

#[tokio::test]
async fn slow_backend_is_a_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(serde_json::json!({ "task_id": "late" })),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::with_base_url(server.uri())
    };
    let err = ReqwestSubmitter::new(settings)
        .submit(export())
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::Network(_)));
    assert_eq!(err.user_message(), "Upload failed");
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let file = SelectedFile::new("/definitely/not/here/bookmarks.html");
    let err = UploadFile::read(&file).await.unwrap_err();
    assert!(matches!(err, SubmissionError::Io { .. }));
}
