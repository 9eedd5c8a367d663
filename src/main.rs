use anyhow::Context;
use clap::{Parser, Subcommand};
use evidx::{AppConfig, CancelToken, DecodeMode, FeatureAssembler, FeatureBatch, SimilarityEngine, SimilarityReport};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Decode quantized sentence features and compare sentences
#[derive(Parser, Debug)]
#[command(name = "evidx")]
#[command(about = "Decode quantized sentence features and compute similarity matrices", long_about = None)]
struct Args {
    /// JSON file with engine, selection and decode settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Abort the similarity kernel after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print decoded features as JSON
    Decode {
        /// Batch file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// dense or keyed
        #[arg(long)]
        mode: Option<DecodeMode>,
    },
    /// Print the similarity report as JSON
    Similarity {
        /// Batch file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Keep at most this many top-scored rows
        #[arg(long)]
        limit: Option<usize>,

        /// Skip this many top-scored rows
        #[arg(long)]
        offset: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => evidx::load_config(path)?,
        None => AppConfig::default(),
    };

    match args.command {
        Command::Decode { input, mode } => {
            let mode = mode.unwrap_or(config.mode);
            let raw = evidx::load_batch(&input)?;
            info!("Decoding {} rows from {:?} ({:?})", raw.len(), input, mode);

            let batch = FeatureBatch::from_raw_with_widths(&raw, config.widths.as_ref())
                .with_context(|| format!("validating batch {}", input.display()))?;
            let decoded = FeatureAssembler::new(mode).assemble(&batch)?;
            print_json(&decoded)
        }
        Command::Similarity { input, limit, offset } => {
            let mut selection = config.selection;
            if limit.is_some() {
                selection.limit = limit;
            }
            if let Some(offset) = offset {
                selection.offset = offset;
            }

            let raw = evidx::load_batch(&input)?;
            info!("Comparing {} rows from {:?}", raw.len(), input);

            let engine = SimilarityEngine::new(config.engine)?;
            // the deadline covers the kernel only, not loading
            let cancel = kernel_token(args.timeout_ms);
            let report = SimilarityReport::compute(&raw, &selection, &engine, Some(&cancel))
                .with_context(|| format!("similarity for {}", input.display()))?;
            info!("Similarity report ready ({} rows kept)", report.num);
            print_json(&report)
        }
    }
}

/// Token whose deadline starts now
fn kernel_token(timeout_ms: Option<u64>) -> CancelToken {
    match timeout_ms {
        Some(ms) => CancelToken::with_timeout(Duration::from_millis(ms)),
        None => CancelToken::new(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
