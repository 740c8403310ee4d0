//! Ingest client: upload submission, status-feed tracking and query IO.
mod decode;
mod engine;
mod query;
mod settings;
mod sse;
mod stream;
mod types;
mod upload;

pub use decode::{decode_frame, DecodeError, DecodedFrame};
pub use engine::EngineHandle;
pub use query::{format_score, IndexStats, QueryClient, QueryResponse, Source};
pub use settings::{ClientSettings, SettingsError};
pub use sse::SseParser;
pub use stream::{StatusStream, StatusStreamClient};
pub use types::{EngineError, EngineEvent, QueryError, StreamTransportError, SubmissionError};
pub use upload::{JobSubmitter, ReqwestSubmitter, UploadFile};
