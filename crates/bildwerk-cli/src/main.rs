// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — resize every image inside a batch of .docx documents.
//
// Entry point. Initialises logging, resolves configuration, runs the batch,
// exports completed documents, and prints a per-document summary.
//
// Exit codes: 0 when every document completed, 1 when at least one document
// ended in error, 2 when the submission was rejected or could not be read.

mod inputs;
mod report;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};

use bildwerk_batch::{BatchDriver, BatchEvent, BatchReport, export_completed};
use bildwerk_core::error::Result;
use bildwerk_core::human_errors::humanize_error;
use bildwerk_core::{ResizeConfig, TargetSize};

use settings::Overrides;

#[derive(Debug, Parser)]
#[command(
    name = "bildwerk",
    version,
    about = "Resize every image inside .docx documents to one fixed size"
)]
struct Cli {
    /// Documents to process (.docx; .doc files are reported as unsupported)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Target width (defaults to the configured width, 3.8)
    #[arg(long)]
    width: Option<String>,

    /// Target height (defaults to the configured height, 2.14)
    #[arg(long)]
    height: Option<String>,

    /// Unit for width and height: cm, mm, in, px
    #[arg(long)]
    unit: Option<String>,

    /// Directory for the resized documents
    #[arg(long, short = 'o', default_value = ".")]
    out_dir: PathBuf,

    /// Config file (defaults to $XDG_CONFIG_HOME/bildwerk/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON report of every outcome to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Documents processed at the same time
    #[arg(long, env = "BILDWERK_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Images of one document transcoded at the same time
    #[arg(long, env = "BILDWERK_IMAGE_CONCURRENCY")]
    image_concurrency: Option<usize>,

    /// Maximum documents per run
    #[arg(long, env = "BILDWERK_MAX_BATCH")]
    max_batch: Option<usize>,

    /// JPEG quality (1-100) for re-encoded JPEG images
    #[arg(long)]
    jpeg_quality: Option<u8>,

    /// Give up on a single document after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            max_batch_size: self.max_batch,
            max_concurrent_documents: self.concurrency,
            max_concurrent_images: self.image_concurrency,
            jpeg_quality: self.jpeg_quality,
            document_timeout_secs: self.timeout_secs,
        }
    }

    /// Target size from flags, falling back to the configured default.
    fn target(&self, config: &ResizeConfig) -> Result<TargetSize> {
        let width = self
            .width
            .clone()
            .unwrap_or_else(|| config.default_width.to_string());
        let height = self
            .height
            .clone()
            .unwrap_or_else(|| config.default_height.to_string());
        let unit = self
            .unit
            .clone()
            .unwrap_or_else(|| config.default_unit.label().to_owned());
        TargetSize::parse(&width, &height, &unit)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(report) => {
            print!("{}", report::render_summary(&report));
            if report.error_count() == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(err) => {
            error!(error = %err, "Run aborted");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: &Cli) -> Result<BatchReport> {
    let config = settings::resolve(settings::load_config(cli.config.as_deref())?, &cli.overrides())?;
    let target = cli.target(&config)?;
    info!(
        target = %target,
        pixels = %format!("{}x{}", target.pixel_width(), target.pixel_height()),
        "Target size"
    );

    let selected = inputs::select_documents(&cli.files);
    let documents = inputs::read_documents(&selected)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let progress = tokio::spawn(log_progress(rx, documents.len()));

    let report = BatchDriver::new(config)
        .with_events(tx)
        .process(documents, target)
        .await;
    // The driver (and its sender) is gone once `process` returns.
    let _ = progress.await;
    let report = report?;

    let written = export_completed(&report.outcomes, &report.target, &cli.out_dir)?;
    info!(count = written.len(), dir = %cli.out_dir.display(), "Exported resized documents");

    if let Some(path) = &cli.report {
        report::write_json(&report, path)?;
        info!(path = %path.display(), "Wrote JSON report");
    }

    Ok(report)
}

async fn log_progress(mut rx: mpsc::UnboundedReceiver<BatchEvent>, total: usize) {
    while let Some(event) = rx.recv().await {
        match event {
            BatchEvent::Started { index, file_name } => {
                info!("[{}/{}] processing {}", index + 1, total, file_name);
            }
            BatchEvent::Finished {
                index,
                file_name,
                status,
                ..
            } => {
                info!("[{}/{}] {} {:?}", index + 1, total, file_name, status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::LengthUnit;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bildwerk").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn default_target_comes_from_config() {
        let target = cli(&["a.docx"]).target(&ResizeConfig::default()).unwrap();
        assert_eq!((target.pixel_width(), target.pixel_height()), (144, 81));
        assert_eq!(target.size_label(), "3.8x2.14cm");
    }

    #[test]
    fn flags_override_target() {
        let target = cli(&["a.docx", "--width", "2", "--height", "1", "--unit", "in"])
            .target(&ResizeConfig::default())
            .unwrap();
        assert_eq!((target.pixel_width(), target.pixel_height()), (192, 96));
    }

    #[test]
    fn unknown_unit_falls_back_to_cm() {
        let target = cli(&["a.docx", "--unit", "furlong"])
            .target(&ResizeConfig::default())
            .unwrap();
        assert_eq!(target.unit(), LengthUnit::Cm);
    }

    #[test]
    fn non_numeric_width_is_rejected() {
        assert!(
            cli(&["a.docx", "--width", "wide"])
                .target(&ResizeConfig::default())
                .is_err()
        );
    }

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["bildwerk"]).is_err());
    }

    #[test]
    fn numeric_flags_become_overrides() {
        let parsed = cli(&[
            "a.docx",
            "--concurrency",
            "2",
            "--image-concurrency",
            "3",
            "--max-batch",
            "10",
            "--timeout-secs",
            "30",
        ]);
        let overrides = parsed.overrides();
        assert_eq!(overrides.max_concurrent_documents, Some(2));
        assert_eq!(overrides.max_concurrent_images, Some(3));
        assert_eq!(overrides.max_batch_size, Some(10));
        assert_eq!(overrides.document_timeout_secs, Some(30));
    }
}
