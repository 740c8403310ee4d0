use std::collections::VecDeque;
use std::io;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use ingest_client::{EngineEvent, EngineHandle};
use ingest_core::{has_bookmark_extension, update, AppState, IngestionState, Msg, SelectedFile};
use ingest_logging::{ingest_info, ingest_warn};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::render::{render_answer, render_stats, TerminalRenderer};

/// Render throttle; also bounds how long the loop blocks waiting for the engine.
const TICK: Duration = Duration::from_millis(75);

/// Rejects files that cannot be a bookmark export before anything is sent.
fn check_bookmark_export(path: &Path) -> anyhow::Result<()> {
    if !has_bookmark_extension(path) {
        bail!(
            "{} is not a bookmark export (expected .html or .htm)",
            path.display()
        );
    }
    let metadata =
        fs::metadata(path).with_context(|| format!("reading {}", path.display()))?;
    if metadata.len() == 0 {
        bail!("{} is empty", path.display());
    }
    Ok(())
}

/// Uploads `path` and tracks the job to its terminal state.
///
/// Returns whether the job completed.
pub fn run_upload(config: &AppConfig, path: PathBuf) -> anyhow::Result<bool> {
    check_bookmark_export(&path)?;

    let engine = EngineHandle::new(config.client_settings()).context("starting client engine")?;
    let runner = EffectRunner::new(engine);
    let mut renderer = TerminalRenderer::new(io::stdout());

    let mut state = AppState::new();
    let mut inbox = VecDeque::from([
        Msg::FileSelected(SelectedFile::new(path)),
        Msg::SubmitClicked,
    ]);

    loop {
        // Strictly sequential: one message folded at a time, in arrival order.
        while let Some(msg) = inbox.pop_front() {
            let (next, effects) = update(state, msg);
            state = next;
            runner.run(effects);
        }

        if state.consume_dirty() {
            renderer.render(&state.view())?;
        }
        if state.ingestion().is_terminal() {
            break;
        }

        inbox.push_back(runner.next_msg(TICK).unwrap_or(Msg::Tick));
    }

    let completed = *state.ingestion() == IngestionState::Completed;
    ingest_info!(
        "Ingestion finished state={} processed={} failed={}",
        state.ingestion().label(),
        state.snapshot().processed_count(),
        state.snapshot().failed_count()
    );

    let (_state, effects) = update(state, Msg::Dispose);
    runner.run(effects);
    Ok(completed)
}

pub fn run_ask(config: &AppConfig, question: &str, k: usize) -> anyhow::Result<bool> {
    let engine = EngineHandle::new(config.client_settings()).context("starting client engine")?;
    engine.ask(question, k);

    match wait_for(&engine, config, |event| matches!(event, EngineEvent::Answered(_))) {
        Some(EngineEvent::Answered(Ok(response))) => {
            render_answer(&mut io::stdout(), &response)?;
            Ok(true)
        }
        Some(EngineEvent::Answered(Err(err))) => {
            ingest_warn!("Query failed: {}", err);
            println!(
                "Sorry, I encountered an error while processing your request. Please try again."
            );
            Ok(false)
        }
        _ => bail!("no answer received"),
    }
}

pub fn run_stats(config: &AppConfig) -> anyhow::Result<bool> {
    let engine = EngineHandle::new(config.client_settings()).context("starting client engine")?;
    engine.stats();

    match wait_for(&engine, config, |event| matches!(event, EngineEvent::Stats(_))) {
        Some(EngineEvent::Stats(Ok(stats))) => {
            render_stats(&mut io::stdout(), &stats)?;
            Ok(true)
        }
        Some(EngineEvent::Stats(Err(err))) => {
            println!("Error: {err}");
            Ok(false)
        }
        _ => bail!("no stats received"),
    }
}

/// Waits for the first event matching `wanted`, bounded by the request timeout.
fn wait_for(
    engine: &EngineHandle,
    config: &AppConfig,
    wanted: impl Fn(&EngineEvent) -> bool,
) -> Option<EngineEvent> {
    let deadline = Instant::now() + config.client_settings().request_timeout + Duration::from_secs(1);
    while Instant::now() < deadline {
        if let Some(event) = engine.recv_timeout(TICK) {
            if wanted(&event) {
                return Some(event);
            }
        }
    }
    None
}
