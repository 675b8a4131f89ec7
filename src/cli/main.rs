//! Background Removal CLI Tool
//!
//! `remove-bg <input> <output> [threshold_percentile]`: removes the background
//! of one image and writes a PNG with an alpha channel.

use super::config::CliConfigBuilder;
use crate::{
    error::BgRemovalError,
    processor::{BackgroundRemovalProcessor, RemovalReport},
};
use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

/// Remove the background of an image
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "remove-bg")]
pub struct Cli {
    /// Image to process
    #[arg(value_name = "INPUT_PATH")]
    pub input: PathBuf,

    /// Where to write the PNG result
    #[arg(value_name = "OUTPUT_PATH")]
    pub output: PathBuf,

    /// Percentile of background distances used as the fallback threshold
    /// (recommended 5-30, default 10)
    #[arg(
        value_name = "THRESHOLD_PERCENTILE",
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub threshold_percentile: Option<u8>,

    /// ONNX segmentation model for the primary remover
    #[arg(short, long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Skip the primary remover and use the threshold fallback only
    #[arg(long)]
    pub fallback_only: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Run the command line tool and map the outcome to an exit status
#[must_use]
pub fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout; everything else is a usage error
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        },
    };

    match run(&cli) {
        Ok(report) => {
            println!(
                "Successfully removed background: {}",
                report.output.display()
            );
            ExitCode::SUCCESS
        },
        Err(e) => {
            let missing_input = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<BgRemovalError>())
                .filter(|cause| matches!(cause, BgRemovalError::MissingInput(_)));

            match missing_input {
                Some(cause) => eprintln!("{cause}"),
                None => eprintln!("Failed to remove background: {}", error_summary(&e)),
            }
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<RemovalReport> {
    init_tracing(cli.verbose).context("Failed to initialize tracing")?;

    CliConfigBuilder::validate_cli(cli).context("Invalid CLI arguments")?;

    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;
    debug!(?config, "Resolved configuration");

    let mut processor = BackgroundRemovalProcessor::new(config)
        .context("Failed to create background removal processor")?;

    let report = processor.process_file(&cli.input, &cli.output)?;
    info!(
        strategy = %report.strategy,
        elapsed_ms = report.elapsed.as_millis(),
        "Background removal finished"
    );

    Ok(report)
}

/// One line for the error and its causes.
///
/// Library errors embed their source in their own message, so a cause whose
/// text is already present is skipped.
fn error_summary(error: &anyhow::Error) -> String {
    let mut summary = String::new();
    for cause in error.chain() {
        let message = cause.to_string();
        if summary.contains(&message) {
            continue;
        }
        if !summary.is_empty() {
            summary.push_str(": ");
        }
        summary.push_str(&message);
    }
    summary
}

/// Initialize tracing based on verbosity level
fn init_tracing(verbose_count: u8) -> Result<()> {
    use crate::tracing_config::{TracingConfig, TracingFormat};
    use std::io::IsTerminal;

    TracingConfig::new()
        .with_verbosity(verbose_count)
        .with_format(TracingFormat::for_terminal(
            std::io::stderr().is_terminal(),
        ))
        .init()
        .context("Failed to initialize tracing subscriber")?;

    debug!(verbosity = verbose_count, "Tracing initialized");
    Ok(())
}
