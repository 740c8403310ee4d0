mod platform;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ingest_logging::ingest_warn;

#[derive(Parser, Debug)]
#[command(name = "ingest_app")]
#[command(about = "Upload bookmark exports and question the ingested knowledge base")]
#[command(version)]
struct Cli {
    /// RON configuration file; defaults apply when it does not exist.
    #[arg(long, default_value = platform::config::DEFAULT_CONFIG_PATH, env = "INGEST_CONFIG")]
    config: PathBuf,

    /// Backend root URL, overriding the configuration file.
    #[arg(long, env = "INGEST_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a bookmark export (.html/.htm) and track its ingestion.
    Upload { file: PathBuf },
    /// Ask a question against the ingested bookmarks.
    Ask {
        question: String,
        /// Number of sources to retrieve.
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Show index statistics.
    Stats,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let (mut config, config_error) = match platform::config::load(&cli.config) {
        Ok(config) => (config, None),
        Err(err) => (platform::config::AppConfig::default(), Some(err)),
    };
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    platform::logging::initialize(
        config.log_destination,
        ingest_logging::parse_level(&config.log_level),
    );
    if let Some(err) = config_error {
        ingest_warn!("Using default configuration: {}", err);
    }

    let succeeded = match cli.command {
        Command::Upload { file } => platform::app::run_upload(&config, file)?,
        Command::Ask { question, k } => {
            platform::app::run_ask(&config, &question, k.unwrap_or(config.top_k))?
        }
        Command::Stats => platform::app::run_stats(&config)?,
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
