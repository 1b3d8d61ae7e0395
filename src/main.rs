mod input;
mod sender;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use brakelog_config::DeliveryConfig;
use brakelog_notice::{NoticeSender, Pipeline};

use input::{Batch, Batcher};
use sender::JsonLinesSender;

/// Brakelog - Forward Python logging records with exceptions as Airbrake notices
#[derive(Parser, Debug)]
#[command(name = "brakelog")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// NDJSON event input, one `[tag, time, record]` per line (defaults to stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Maximum number of events per batch
    #[arg(long, default_value = "100")]
    batch_size: usize,

    /// Overrides `api_key` from the settings file
    #[arg(long, env = "BRAKELOG_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Diagnostic log level, combined with RUST_LOG directives
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Diagnostics go to stderr, stdout carries notices
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(args.log_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run_app(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_app(args: Args) -> Result<()> {
    ensure!(args.batch_size > 0, "--batch-size must be greater than 0");

    let mut settings = settings::load(&args.config)?;
    if let Some(api_key) = args.api_key {
        settings.api_key = Some(api_key);
    }
    let config = DeliveryConfig::from_settings(&settings).context("Invalid configuration")?;

    tracing::info!(
        environment = %config.environment.environment_name,
        threshold = config.threshold,
        project_id = ?config.project_id,
        "Forwarding notices"
    );

    let sender = JsonLinesSender::stdout(&config);
    let pipeline = Pipeline::new(&config, &sender);

    let reader: Box<dyn AsyncBufRead + Unpin> = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .await
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut lines = reader.lines();
    let mut batcher = Batcher::new(args.batch_size);
    let mut acknowledged = 0usize;
    let mut line_number = 0u64;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let event = match input::parse_line(&line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(line = line_number, error = %format!("{e:#}"), "Skipping malformed event");
                continue;
            }
        };

        if let Some(batch) = batcher.push(event) {
            dispatch(&pipeline, batch, &mut acknowledged);
        }
        if let Some(batch) = batcher.take_full() {
            dispatch(&pipeline, batch, &mut acknowledged);
        }
    }

    if let Some(batch) = batcher.finish() {
        dispatch(&pipeline, batch, &mut acknowledged);
    }

    sender.flush().context("Failed to flush notices")?;

    tracing::info!(
        batches = acknowledged,
        notices = sender.sent(),
        "Input exhausted"
    );

    Ok(())
}

fn dispatch<S: NoticeSender>(pipeline: &Pipeline<'_, S>, batch: Batch, acknowledged: &mut usize) {
    pipeline.emit(&batch.tag, batch.events, || *acknowledged += 1);
}
