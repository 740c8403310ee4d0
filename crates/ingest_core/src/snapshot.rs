use crate::ProgressEvent;

/// Running reconstruction of a job's progress.
///
/// Counts are estimates until a `Completed` event has been folded, after which
/// they hold the backend's authoritative values and the snapshot is frozen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    processed_count: u64,
    failed_count: u64,
    total: u64,
    lines: Vec<String>,
    terminal: bool,
}

impl ProgressSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    pub fn failed_count(&self) -> u64 {
        self.failed_count
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Human-readable audit trail. Append-only.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Percent of items processed, or `None` while the total is unknown (zero).
    pub fn percent_complete(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let percent = self.processed_count as f64 * 100.0 / self.total as f64;
        Some(percent.min(100.0))
    }
}

/// Folds one event into the snapshot. Events arriving after the terminal event are ignored.
pub fn fold(mut snapshot: ProgressSnapshot, event: &ProgressEvent) -> ProgressSnapshot {
    if snapshot.terminal {
        return snapshot;
    }

    match event {
        ProgressEvent::Processing {
            index, total, url, ..
        } => {
            // failed_count carries forward: this event has no cumulative failure count.
            snapshot.processed_count = *index;
            snapshot.total = *total;
            snapshot
                .lines
                .push(format!("[{index}/{total}] Processing: {url}"));
        }
        ProgressEvent::Failed { url, reason } => {
            snapshot.lines.push(format!("FAILED: {url} - {reason}"));
        }
        ProgressEvent::Error { url, message } => {
            let line = match url {
                Some(url) => format!("ERROR: {url} - {message}"),
                None => format!("ERROR: {message}"),
            };
            snapshot.lines.push(line);
        }
        ProgressEvent::Parsing { message } | ProgressEvent::ParsingComplete { message } => {
            snapshot.lines.push(message.clone());
        }
        ProgressEvent::Completed { success, failed } => {
            snapshot.processed_count = *success;
            snapshot.failed_count = *failed;
            snapshot.total = success.saturating_add(*failed);
            snapshot
                .lines
                .push(format!("Done! Success: {success}, Failed: {failed}"));
            snapshot.terminal = true;
        }
    }

    snapshot
}
