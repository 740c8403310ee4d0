use ingest_logging::{ingest_debug, ingest_warn};
use serde::{Deserialize, Serialize};

use crate::settings::{error_detail, ClientSettings, QUERY_PATH, STATS_PATH};
use crate::types::QueryError;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    question: &'a str,
    k: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// A retrieved chunk backing an answer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Source {
    pub url: String,
    pub title: String,
    /// Ranking confidence.
    pub score: f64,
    pub text: String,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IndexStats {
    pub total_bookmarks: u64,
    pub total_chunks: u64,
    pub failed_bookmarks: u64,
}

/// Renders a source score with three decimals.
pub fn format_score(score: f64) -> String {
    format!("{score:.3}")
}

/// Client for the question-answering and stats endpoints.
#[derive(Debug, Clone)]
pub struct QueryClient {
    settings: ClientSettings,
}

impl QueryClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    pub async fn ask(&self, question: &str, k: usize) -> Result<QueryResponse, QueryError> {
        let url = self
            .settings
            .endpoint(QUERY_PATH)
            .map_err(|err| QueryError::Endpoint(err.to_string()))?;
        let client = self.client()?;

        ingest_debug!("Query k={} question_len={}", k, question.len());
        let response = client
            .post(url)
            .json(&QueryRequest { question, k })
            .send()
            .await
            .map_err(|err| QueryError::Network(err.to_string()))?;
        read_json(response).await
    }

    pub async fn stats(&self) -> Result<IndexStats, QueryError> {
        let url = self
            .settings
            .endpoint(STATS_PATH)
            .map_err(|err| QueryError::Endpoint(err.to_string()))?;
        let response = self
            .client()?
            .get(url)
            .send()
            .await
            .map_err(|err| QueryError::Network(err.to_string()))?;
        read_json(response).await
    }

    fn client(&self) -> Result<reqwest::Client, QueryError> {
        self.settings
            .http_client(Some(self.settings.request_timeout))
            .map_err(|err| QueryError::Network(err.to_string()))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, QueryError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| QueryError::Network(err.to_string()))?;

    if !status.is_success() {
        let detail = error_detail(&body).unwrap_or_else(|| status.to_string());
        ingest_warn!("Query endpoint failed status={} detail={}", status.as_u16(), detail);
        return Err(QueryError::HttpStatus {
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_slice(&body).map_err(|err| QueryError::InvalidResponse(err.to_string()))
}
