//! placelens
//!
//! Extracts classified place entities from OCR transcripts of screenshots.
//!
//! Reads transcripts from files or stdin, runs one extraction pipeline per
//! transcript in parallel, and prints JSON to stdout. Logs go to stderr.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use placelens_core::{Category, ExtractionResult, PlaceCandidate};
use placelens_extract::{
    describe_metrics, extract_batch, normalize_transcript, EntityRegistry, HierarchicalExtractor,
    SignalExtractor, TranscriptSignals,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod config;
mod input;

use config::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "placelens")]
#[command(about = "Extract place entities from OCR transcripts", long_about = None)]
pub(crate) struct Cli {
    /// Transcript files (.txt, .json, .jsonl); `-` or nothing reads stdin
    inputs: Vec<String>,

    /// Configuration file path (default: placelens.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gazetteer YAML replacing the built-in one
    #[arg(short, long, env = "PLACELENS_GAZETTEER")]
    gazetteer: Option<PathBuf>,

    /// OCR confidence for inputs that do not carry one
    #[arg(long)]
    confidence: Option<f32>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Include contact, rating, content-type and language signals
    #[arg(short, long)]
    signals: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One JSON report per transcript
    Json,
    /// Human-readable buckets
    Pretty,
    /// Merged, deduplicated candidate list
    Candidates,
}

#[derive(Debug, Serialize)]
struct TranscriptReport {
    source: String,
    ocr_confidence: f32,
    result: ExtractionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    signals: Option<TranscriptSignals>,
}

#[derive(Debug, Serialize)]
struct BatchReport {
    transcripts: Vec<TranscriptReport>,
    candidates: Vec<PlaceCandidate>,
    total_latency_us: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);
    describe_metrics();

    let config = CliConfig::load(&cli)?;

    let registry = match &config.gazetteer {
        Some(path) => {
            info!("Loading gazetteer from {}", path.display());
            EntityRegistry::from_file(path)?
        }
        None => EntityRegistry::builtin()?,
    };
    let extractor = Arc::new(HierarchicalExtractor::new(
        registry.shared(),
        config.extractor.clone(),
    )?);

    let inputs = input::load_inputs(&cli.inputs, config.default_confidence)?;
    info!("Loaded {} transcripts", inputs.len());

    let signals = if cli.signals {
        let extractor = SignalExtractor::new()?;
        inputs
            .iter()
            .map(|i| Some(extractor.extract(&normalize_transcript(i.transcript.text()))))
            .collect()
    } else {
        vec![None; inputs.len()]
    };

    let transcripts = inputs.iter().map(|i| i.transcript.clone()).collect();
    let batch = extract_batch(extractor, transcripts).await;

    let report = BatchReport {
        transcripts: inputs
            .into_iter()
            .zip(batch.results)
            .zip(signals)
            .map(|((input, result), signals)| TranscriptReport {
                source: input.source,
                ocr_confidence: input.transcript.ocr_confidence(),
                result,
                signals,
            })
            .collect(),
        candidates: batch.candidates,
        total_latency_us: batch.total_latency_us,
    };

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Candidates => {
            println!("{}", serde_json::to_string_pretty(&report.candidates)?)
        }
        OutputFormat::Pretty => print_pretty(&report),
    }

    Ok(())
}

fn print_pretty(report: &BatchReport) {
    for transcript in &report.transcripts {
        println!("== {} (ocr {:.2})", transcript.source, transcript.ocr_confidence);
        for category in Category::ALL {
            let bucket = transcript.result.get(category);
            if bucket.is_empty() {
                continue;
            }
            println!("  {}:", category);
            for c in bucket {
                println!("    {:.3}  {}  [{}]", c.confidence, c.text, c.subtype);
            }
        }
        if let Some(signals) = &transcript.signals {
            println!(
                "  signals: {} ({:.2}), {:?}",
                signals.content_type, signals.content_confidence, signals.language
            );
        }
    }
    println!(
        "{} candidates in {}us",
        report.candidates.len(),
        report.total_latency_us
    );
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("placelens=debug,placelens_extract=debug,placelens_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("placelens=info,placelens_extract=info,placelens_cli=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
