//! Memory feature extraction CLI - turns memory dumps into dataset rows.
//!
//! Usage:
//!   memscan /dumps --volatility /opt/volatility3/vol.py --output ./out
//!   memscan image.raw -V vol.py -o ./out --format json
//!   memscan /dumps -V vol.py -o ./out --fingerprint

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;

use memscan_core::dataset::DatasetWriter;
use memscan_core::engine::VolatilityEngine;
use memscan_core::image::{collect_images, MemoryImage};
use memscan_core::pipeline::{extract_features, ExtractProgress, ProgressEvent, ProgressSink, Stage};
use memscan_core::report::{print_results, ImageOutcome, OutputFormat};

#[derive(Parser)]
#[command(name = "memscan")]
#[command(about = "Volatility3-based memory image feature extractor")]
struct Cli {
    /// Memory dumps or directories containing them
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Path to the Volatility3 vol.py script
    #[arg(short = 'V', long)]
    volatility: PathBuf,

    /// Python interpreter used to run Volatility3
    #[arg(long, default_value = "python3")]
    python: PathBuf,

    /// Output directory for the dataset (output.csv)
    #[arg(short, long)]
    output: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Compute a SHA-256 fingerprint per image (slow on large dumps)
    #[arg(long)]
    fingerprint: bool,
}

/// Renders pipeline progress to stderr in real time.
struct StderrSink;

impl ProgressSink for StderrSink {
    fn emit(&self, event: &ProgressEvent) {
        match event.stage {
            Stage::Failed => eprintln!("[ERR ] {}", event.message),
            _ => eprintln!("[*] {}", event.message),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("cannot create output directory {}", cli.output.display()))?;

    let images = collect_images(&cli.paths);
    eprintln!("[*] Found {} memory images", images.len());
    if images.is_empty() {
        eprintln!("[*] Nothing to extract.");
        return Ok(());
    }

    let engine = VolatilityEngine::new(&cli.python, &cli.volatility);
    let writer = DatasetWriter::new(cli.output.join("output.csv"));
    let sink = StderrSink;

    let outcomes: Vec<ImageOutcome> = images
        .par_iter()
        .map(|image| process_image(image, &engine, &writer, &sink, cli.fingerprint))
        .collect();

    eprintln!("[*] Processed {} images", outcomes.len());
    print_results(&outcomes, cli.format);

    if outcomes.iter().any(|o| o.error.is_some()) {
        std::process::exit(1);
    }
    Ok(())
}

fn process_image(
    image: &MemoryImage,
    engine: &VolatilityEngine,
    writer: &DatasetWriter,
    sink: &StderrSink,
    fingerprint: bool,
) -> ImageOutcome {
    eprintln!("[*] Extracting features from {}", image.path().display());

    let sha256 = if fingerprint {
        match image.sha256() {
            Ok(hash) => Some(hash),
            Err(e) => {
                eprintln!("[ERR ] fingerprint of {} failed: {e}", image.path().display());
                None
            }
        }
    } else {
        None
    };

    let progress = ExtractProgress::new();
    match extract_features(engine, image, writer, sink, &progress) {
        Ok(extraction) => ImageOutcome {
            image: image.path().to_path_buf(),
            features: extraction.record.len(),
            row_written: true,
            plugin_errors: extraction.errors,
            sha256,
            error: None,
        },
        Err(e) => ImageOutcome {
            image: image.path().to_path_buf(),
            features: 0,
            row_written: false,
            plugin_errors: Vec::new(),
            sha256,
            error: Some(format!("{e}")),
        },
    }
}
