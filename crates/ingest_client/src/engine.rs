use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use ingest_core::{JobId, SelectedFile, SubmissionId};
use ingest_logging::{ingest_debug, ingest_info, ingest_warn};
use tokio_util::sync::CancellationToken;

use crate::query::QueryClient;
use crate::stream::StatusStreamClient;
use crate::upload::{JobSubmitter, ReqwestSubmitter, UploadFile};
use crate::{ClientSettings, EngineError, EngineEvent};

enum EngineCommand {
    Submit {
        submission: SubmissionId,
        file: SelectedFile,
    },
    Attach { job_id: JobId },
    Detach { job_id: JobId },
    Ask { question: String, k: usize },
    Stats,
}

/// Runs client IO on a background runtime. Commands go in, `EngineEvent`s come
/// out in the order the IO produced them.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

struct Services {
    submitter: Arc<dyn JobSubmitter>,
    streams: StatusStreamClient,
    queries: QueryClient,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let submitter = Arc::new(ReqwestSubmitter::new(settings.clone()));
        Self::with_submitter(settings, submitter)
    }

    /// Builds an engine whose uploads go through `submitter` instead of HTTP.
    pub fn with_submitter(
        settings: ClientSettings,
        submitter: Arc<dyn JobSubmitter>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let services = Services {
            submitter,
            streams: StatusStreamClient::new(settings.clone()),
            queries: QueryClient::new(settings),
        };

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let mut attachments: HashMap<JobId, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                dispatch(&runtime, &services, &mut attachments, command, &event_tx);
            }
            for token in attachments.values() {
                token.cancel();
            }
            runtime.shutdown_timeout(Duration::from_secs(1));
            ingest_debug!("Engine runtime stopped");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    /// Uploads `file`; the reply comes back as `EngineEvent::Submitted` tagged with `submission`.
    pub fn submit(&self, submission: SubmissionId, file: SelectedFile) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Submit { submission, file });
    }

    pub fn attach(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::Attach { job_id });
    }

    pub fn detach(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::Detach { job_id });
    }

    pub fn ask(&self, question: impl Into<String>, k: usize) {
        let _ = self.cmd_tx.send(EngineCommand::Ask {
            question: question.into(),
            k,
        });
    }

    pub fn stats(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Stats);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn dispatch(
    runtime: &tokio::runtime::Runtime,
    services: &Services,
    attachments: &mut HashMap<JobId, CancellationToken>,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    let event_tx = event_tx.clone();
    match command {
        EngineCommand::Submit { submission, file } => {
            let submitter = services.submitter.clone();
            runtime.spawn(async move {
                let result = match UploadFile::read(&file).await {
                    Ok(upload) => submitter.submit(upload).await,
                    Err(err) => Err(err),
                };
                if let Err(err) = &result {
                    ingest_warn!("Submission of {} failed: {}", file.name, err);
                }
                let _ = event_tx.send(EngineEvent::Submitted {
                    submission,
                    file,
                    result,
                });
            });
        }
        EngineCommand::Attach { job_id } => {
            // One attachment per job: a second attach replaces the first.
            if let Some(previous) = attachments.remove(&job_id) {
                previous.cancel();
            }
            attachments.retain(|_, token| !token.is_cancelled());

            let token = CancellationToken::new();
            attachments.insert(job_id.clone(), token.clone());
            let streams = services.streams.clone();
            runtime.spawn(track(streams, job_id, token, event_tx));
        }
        EngineCommand::Detach { job_id } => match attachments.remove(&job_id) {
            Some(token) => token.cancel(),
            None => ingest_debug!("Detach for unknown job_id={}", job_id),
        },
        EngineCommand::Ask { question, k } => {
            let queries = services.queries.clone();
            runtime.spawn(async move {
                let result = queries.ask(&question, k).await;
                let _ = event_tx.send(EngineEvent::Answered(result));
            });
        }
        EngineCommand::Stats => {
            let queries = services.queries.clone();
            runtime.spawn(async move {
                let result = queries.stats().await;
                let _ = event_tx.send(EngineEvent::Stats(result));
            });
        }
    }
}

/// Forwards one job's feed until it ends, breaks, or is cancelled.
async fn track(
    streams: StatusStreamClient,
    job_id: JobId,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let attached = tokio::select! {
        _ = token.cancelled() => {
            ingest_info!("Detached before status feed opened job_id={}", job_id);
            return;
        }
        attached = streams.attach(&job_id) => attached,
    };
    let mut feed = match attached {
        Ok(feed) => feed,
        Err(error) => {
            token.cancel();
            let _ = event_tx.send(EngineEvent::StreamFailed { job_id, error });
            return;
        }
    };

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                feed.detach();
                return;
            }
            item = feed.next_event() => match item {
                Some(Ok(event)) => {
                    let _ = event_tx.send(EngineEvent::Progress {
                        job_id: job_id.clone(),
                        event,
                    });
                }
                Some(Err(error)) => {
                    token.cancel();
                    let _ = event_tx.send(EngineEvent::StreamFailed { job_id, error });
                    return;
                }
                None => {
                    token.cancel();
                    let _ = event_tx.send(EngineEvent::StreamEnded { job_id });
                    return;
                }
            },
        }
    }
}
