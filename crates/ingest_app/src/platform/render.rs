//! Terminal rendering of the tracker view model.

use std::io::{self, Write};

use ingest_client::{format_score, IndexStats, QueryResponse};
use ingest_core::{AppViewModel, IngestionState};

type Clock = Box<dyn Fn() -> String>;

/// Prints only what changed since the previous render: state transitions,
/// new audit-log lines and the progress line.
pub struct TerminalRenderer<W: Write> {
    out: W,
    clock: Clock,
    printed_lines: usize,
    last_state: Option<IngestionState>,
    last_progress: Option<(u64, u64, u64)>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self::with_clock(out, Box::new(|| chrono::Local::now().format("%H:%M:%S").to_string()))
    }

    pub fn with_clock(out: W, clock: Clock) -> Self {
        Self {
            out,
            clock,
            printed_lines: 0,
            last_state: None,
            last_progress: None,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        // A reset (new file selected) empties the log.
        if view.lines.len() < self.printed_lines {
            self.printed_lines = 0;
            self.last_progress = None;
        }

        if self.last_state.as_ref() != Some(&view.state) {
            self.render_transition(view)?;
        }

        for line in &view.lines[self.printed_lines..] {
            writeln!(self.out, "[{}] {}", (self.clock)(), line)?;
        }
        self.printed_lines = view.lines.len();

        let progress = (view.processed, view.failed, view.total);
        if view.state == IngestionState::Tracking && self.last_progress != Some(progress) {
            writeln!(
                self.out,
                "Progress: {}% (processed {}, failed {}, total {})",
                view.percent, view.processed, view.failed, view.total
            )?;
            self.last_progress = Some(progress);
        }

        if self.last_state.as_ref() != Some(&view.state) {
            self.render_outcome(view)?;
            self.last_state = Some(view.state.clone());
        }
        self.out.flush()
    }

    fn render_transition(&mut self, view: &AppViewModel) -> io::Result<()> {
        let file = view.file_name.as_deref().unwrap_or("-");
        match &view.state {
            IngestionState::Uploading => writeln!(self.out, "Uploading {file}..."),
            IngestionState::Tracking => match &view.job_id {
                Some(job_id) => writeln!(self.out, "Processing {file} as task {job_id}"),
                None => writeln!(self.out, "Processing {file}"),
            },
            _ => Ok(()),
        }
    }

    fn render_outcome(&mut self, view: &AppViewModel) -> io::Result<()> {
        match &view.state {
            IngestionState::Completed => writeln!(
                self.out,
                "Ingestion complete! Successfully processed {} bookmarks ({} failed).",
                view.processed, view.failed
            ),
            IngestionState::Failed(reason) => writeln!(self.out, "Error: {reason}"),
            _ => Ok(()),
        }
    }
}

pub fn render_answer(out: &mut impl Write, response: &QueryResponse) -> io::Result<()> {
    writeln!(out, "{}", response.answer)?;
    if response.sources.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Sources:")?;
    for (position, source) in response.sources.iter().enumerate() {
        let title = if source.title.is_empty() {
            &source.url
        } else {
            &source.title
        };
        writeln!(
            out,
            "  [{}] {} (score {})",
            position + 1,
            title,
            format_score(source.score)
        )?;
        writeln!(out, "      {}", source.url)?;
    }
    Ok(())
}

pub fn render_stats(out: &mut impl Write, stats: &IndexStats) -> io::Result<()> {
    writeln!(out, "Bookmarks: {}", stats.total_bookmarks)?;
    writeln!(out, "Chunks:    {}", stats.total_chunks)?;
    writeln!(out, "Failed:    {}", stats.failed_bookmarks)
}

#[cfg(test)]
mod tests {
    use ingest_client::{QueryResponse, Source};
    use ingest_core::{update, AppState, JobId, Msg, ProgressEvent, SelectedFile};

    use super::{render_answer, TerminalRenderer};

    fn fixed_clock() -> Box<dyn Fn() -> String> {
        Box::new(|| "12:00:00".to_string())
    }

    fn rendered(out: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(out)
            .lines()
            .map(ToOwned::to_owned)
            .collect()
    }

    #[test]
    fn renders_only_changes_between_frames() {
        let mut out = Vec::new();
        {
            let mut renderer = TerminalRenderer::with_clock(&mut out, fixed_clock());
            let (state, _) = update(
                AppState::new(),
                Msg::FileSelected(SelectedFile::new("bookmarks.html")),
            );
            let (state, _) = update(state, Msg::SubmitClicked);
            renderer.render(&state.view()).unwrap();

            let (state, _) = update(
                state,
                Msg::SubmitSucceeded {
                    submission: 0,
                    job_id: JobId::new("abc123"),
                },
            );
            let (state, _) = update(
                state,
                Msg::StreamEvent {
                    job_id: JobId::new("abc123"),
                    event: ProgressEvent::Processing {
                        index: 1,
                        total: 2,
                        url: "a.com".into(),
                        title: None,
                    },
                },
            );
            renderer.render(&state.view()).unwrap();
            renderer.render(&state.view()).unwrap();

            let (state, _) = update(
                state,
                Msg::StreamEvent {
                    job_id: JobId::new("abc123"),
                    event: ProgressEvent::Completed { success: 2, failed: 0 },
                },
            );
            renderer.render(&state.view()).unwrap();
        }

        assert_eq!(
            rendered(&out),
            vec![
                "Uploading bookmarks.html...",
                "Processing bookmarks.html as task abc123",
                "[12:00:00] [1/2] Processing: a.com",
                "Progress: 50% (processed 1, failed 0, total 2)",
                "[12:00:00] Done! Success: 2, Failed: 0",
                "Ingestion complete! Successfully processed 2 bookmarks (0 failed).",
            ]
        );
    }

    #[test]
    fn failure_is_a_single_terminal_message() {
        let mut out = Vec::new();
        {
            let mut renderer = TerminalRenderer::with_clock(&mut out, fixed_clock());
            let (state, _) = update(
                AppState::new(),
                Msg::FileSelected(SelectedFile::new("bookmarks.html")),
            );
            let (state, _) = update(state, Msg::SubmitClicked);
            let (state, _) = update(
                state,
                Msg::SubmitFailed {
                    submission: 0,
                    reason: "unsupported file".into(),
                },
            );
            renderer.render(&state.view()).unwrap();
        }

        assert_eq!(rendered(&out), vec!["Error: unsupported file"]);
    }

    #[test]
    fn answer_lists_sources_with_scores() {
        let response = QueryResponse {
            answer: "Tokio drives async IO.".into(),
            sources: vec![Source {
                url: "https://tokio.rs".into(),
                title: "Tokio".into(),
                score: 0.91234,
                text: "Tokio is a runtime".into(),
                folder: None,
                domain: None,
            }],
        };
        let mut out = Vec::new();
        render_answer(&mut out, &response).unwrap();

        assert_eq!(
            rendered(&out),
            vec![
                "Tokio drives async IO.",
                "",
                "Sources:",
                "  [1] Tokio (score 0.912)",
                "      https://tokio.rs",
            ]
        );
    }
}
