use std::fmt;

/// Backend-assigned identifier of one ingestion run. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One decoded entry from a job's status feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Item `index` (1-based) of `total` is being processed.
    Processing {
        index: u64,
        total: u64,
        url: String,
        title: Option<String>,
    },
    /// One item could not be ingested.
    Failed { url: String, reason: String },
    /// A processing error, optionally tied to an item.
    Error {
        url: Option<String>,
        message: String,
    },
    Parsing { message: String },
    ParsingComplete { message: String },
    /// Terminal event carrying the authoritative final counts.
    Completed { success: u64, failed: u64 },
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Completed { .. })
    }
}
