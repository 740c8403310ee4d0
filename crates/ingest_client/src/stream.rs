use std::collections::VecDeque;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use ingest_core::{JobId, ProgressEvent};
use ingest_logging::{ingest_debug, ingest_info, ingest_warn};
use reqwest::header::ACCEPT;

use crate::decode::{decode_frame, DecodedFrame};
use crate::settings::{ClientSettings, INGEST_STATUS_PATH};
use crate::sse::SseParser;
use crate::types::StreamTransportError;

/// Opens status feeds for jobs.
#[derive(Debug, Clone)]
pub struct StatusStreamClient {
    settings: ClientSettings,
}

impl StatusStreamClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    /// Connects to the job's feed. Fails on connection errors and non-2xx answers
    /// (the backend answers 404 for unknown tasks).
    pub async fn attach(&self, job_id: &JobId) -> Result<StatusStream, StreamTransportError> {
        let mut url = self
            .settings
            .endpoint(INGEST_STATUS_PATH)
            .map_err(|err| StreamTransportError::Endpoint(err.to_string()))?;
        url.query_pairs_mut().append_pair("task_id", job_id.as_str());

        // Long-lived: only the connect phase is bounded.
        let client = self
            .settings
            .http_client(None)
            .map_err(|err| StreamTransportError::Connect(err.to_string()))?;
        let response = client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|err| StreamTransportError::Connect(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            ingest_warn!(
                "Status feed refused job_id={} status={}",
                job_id,
                status.as_u16()
            );
            return Err(StreamTransportError::HttpStatus(status.as_u16()));
        }

        ingest_info!("Attached status feed job_id={}", job_id);
        Ok(StatusStream::new(job_id.clone(), response.bytes_stream().boxed()))
    }
}

/// Live event feed for one job.
///
/// Yields events in server order until the `Completed` event, after which the
/// connection is dropped and the feed is exhausted. A transport failure or a
/// close before `Completed` is yielded once as an error. Dropping the stream
/// closes the connection.
pub struct StatusStream {
    job_id: JobId,
    body: Option<BoxStream<'static, reqwest::Result<Bytes>>>,
    parser: SseParser,
    pending: VecDeque<String>,
    pending_error: Option<StreamTransportError>,
    seen_terminal: bool,
}

impl StatusStream {
    pub(crate) fn new(job_id: JobId, body: BoxStream<'static, reqwest::Result<Bytes>>) -> Self {
        Self {
            job_id,
            body: Some(body),
            parser: SseParser::new(),
            pending: VecDeque::new(),
            pending_error: None,
            seen_terminal: false,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn seen_terminal(&self) -> bool {
        self.seen_terminal
    }

    /// Next event, `Some(Err(..))` once on a broken feed, then `None`.
    pub async fn next_event(&mut self) -> Option<Result<ProgressEvent, StreamTransportError>> {
        loop {
            while let Some(data) = self.pending.pop_front() {
                match decode_frame(&data) {
                    Ok(DecodedFrame::Event(event)) => {
                        if event.is_terminal() {
                            self.seen_terminal = true;
                            self.close();
                            ingest_info!("Status feed completed job_id={}", self.job_id);
                        }
                        return Some(Ok(event));
                    }
                    Ok(DecodedFrame::Unrecognized(status)) => {
                        ingest_debug!(
                            "Ignoring unrecognized status job_id={} status={}",
                            self.job_id,
                            status
                        );
                    }
                    Err(err) => {
                        ingest_warn!(
                            "Dropping malformed status frame job_id={} error={} data={}",
                            self.job_id,
                            err,
                            data
                        );
                    }
                }
            }

            if let Some(error) = self.pending_error.take() {
                return Some(Err(error));
            }

            let body = self.body.as_mut()?;
            match body.next().await {
                Some(Ok(chunk)) => {
                    let payloads = self.parser.feed(&chunk);
                    self.pending.extend(payloads);
                }
                // The body is dropped as soon as `Completed` is decoded, so errors
                // reaching this point always precede the terminal event.
                Some(Err(err)) => {
                    self.body = None;
                    ingest_warn!("Status feed broke job_id={} error={}", self.job_id, err);
                    self.pending_error = Some(StreamTransportError::Transport(err.to_string()));
                }
                None => {
                    self.body = None;
                    if !self.seen_terminal {
                        ingest_warn!(
                            "Status feed closed before completion job_id={}",
                            self.job_id
                        );
                        self.pending_error = Some(StreamTransportError::ClosedBeforeCompletion);
                    }
                }
            }
        }
    }

    /// Closes the connection; no further events are produced.
    pub fn detach(mut self) {
        self.close();
        ingest_info!("Detached status feed job_id={}", self.job_id);
    }

    fn close(&mut self) {
        self.body = None;
        self.pending.clear();
        self.pending_error = None;
    }

    /// Adapts the feed into a `Stream` of events.
    pub fn into_stream(
        self,
    ) -> impl Stream<Item = Result<ProgressEvent, StreamTransportError>> + Send {
        futures_util::stream::unfold(self, |mut feed| async move {
            feed.next_event().await.map(|item| (item, feed))
        })
    }
}
