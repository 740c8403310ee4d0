use ingest_logging::ingest_warn;

/// Upper bound on a single line, and on the data of a single event.
pub(crate) const MAX_EVENT_BYTES: usize = 1024 * 1024;

/// Incremental parser for a `text/event-stream` body.
///
/// Only `data` fields matter to the status feed; `event`, `id`, `retry` and
/// comment lines are skipped. Lines end in `\n`, `\r\n` or a lone `\r`. An event
/// left unterminated when the body ends is discarded, as is any event that
/// grows past `MAX_EVENT_BYTES`.
#[derive(Debug)]
pub struct SseParser {
    buffer: Vec<u8>,
    data: Vec<String>,
    data_len: usize,
    max_event_bytes: usize,
    /// Previous line ended in `\r`; a `\n` right after it belongs to that line end.
    skip_lf: bool,
    /// Current event overflowed; everything up to the next blank line is dropped.
    discarding: bool,
}

impl Default for SseParser {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            data: Vec::new(),
            data_len: 0,
            max_event_bytes: MAX_EVENT_BYTES,
            skip_lf: false,
            discarding: false,
        }
    }
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_max_event_bytes(max_event_bytes: usize) -> Self {
        Self {
            max_event_bytes,
            ..Self::default()
        }
    }

    /// Feeds a chunk of the body and returns the data payloads of every event it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        loop {
            if self.skip_lf && !self.buffer.is_empty() {
                self.skip_lf = false;
                if self.buffer[0] == b'\n' {
                    self.buffer.remove(0);
                }
            }
            let Some(end) = self
                .buffer
                .iter()
                .position(|byte| matches!(byte, b'\n' | b'\r'))
            else {
                break;
            };
            self.skip_lf = self.buffer[end] == b'\r';
            let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
            line.pop();
            if let Some(payload) = self.process_line(&line) {
                payloads.push(payload);
            }
        }

        if self.buffer.len() > self.max_event_bytes {
            ingest_warn!(
                "Discarding status event with a {} byte line",
                self.buffer.len()
            );
            self.buffer.clear();
            self.drop_event();
        }
        payloads
    }

    fn process_line(&mut self, line: &[u8]) -> Option<String> {
        if line.is_empty() {
            let discarded = std::mem::take(&mut self.discarding);
            let payload = self.data.join("\n");
            self.data.clear();
            self.data_len = 0;
            return (!discarded && !payload.is_empty()).then_some(payload);
        }
        if self.discarding || line.starts_with(b":") {
            return None;
        }

        let line = String::from_utf8_lossy(line);
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (&*line, ""),
        };
        if field == "data" {
            self.data_len += value.len();
            if self.data_len > self.max_event_bytes {
                ingest_warn!("Discarding status event with {} bytes of data", self.data_len);
                self.drop_event();
                return None;
            }
            self.data.push(value.to_string());
        }
        None
    }

    fn drop_event(&mut self) {
        self.data.clear();
        self.data_len = 0;
        self.discarding = true;
    }
}
