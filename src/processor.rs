//! Background removal processor
//!
//! `BackgroundRemovalProcessor` owns the primary remover and the fallback
//! segmenter and runs the fallback sequence for one input/output pair. The
//! CLI is a thin shell around [`BackgroundRemovalProcessor::process_file`].

use crate::{
    backends::{create_primary_remover, PrimaryOutcome, PrimaryRemover},
    config::RemovalConfig,
    error::Result,
    segmentation::FallbackSegmenter,
    services::ImageIOService,
};
use instant::{Duration, Instant};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Which strategy produced the output image
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    /// The neural primary remover
    Primary,
    /// The colour-distance fallback, with the threshold it settled on
    Fallback { threshold: f32 },
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback { threshold } => write!(f, "fallback (threshold {threshold:.2})"),
        }
    }
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct RemovalReport {
    pub strategy: Strategy,
    /// Path the PNG was written to
    pub output: PathBuf,
    /// Image dimensions, known when the fallback decoded the input
    pub dimensions: Option<(u32, u32)>,
    /// Wall time from reading the input to persisting the output
    pub elapsed: Duration,
}

impl RemovalReport {
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        matches!(self.strategy, Strategy::Fallback { .. })
    }
}

/// Runs the primary remover and falls back to the segmenter when needed
pub struct BackgroundRemovalProcessor {
    config: RemovalConfig,
    primary: Box<dyn PrimaryRemover>,
    fallback: FallbackSegmenter,
}

impl BackgroundRemovalProcessor {
    /// Create a processor with the primary remover described by `config`
    pub fn new(config: RemovalConfig) -> Result<Self> {
        let primary = create_primary_remover(&config);
        Self::with_primary(config, primary)
    }

    /// Create a processor with an explicit primary remover
    pub fn with_primary(config: RemovalConfig, primary: Box<dyn PrimaryRemover>) -> Result<Self> {
        config.validate()?;
        let fallback = FallbackSegmenter::new(config.segmenter)?;
        Ok(Self {
            config,
            primary,
            fallback,
        })
    }

    #[must_use]
    pub fn config(&self) -> &RemovalConfig {
        &self.config
    }

    /// Remove the background of `input` and write a PNG to `output`.
    ///
    /// # Errors
    /// - [`BgRemovalError::MissingInput`](crate::BgRemovalError::MissingInput)
    ///   when `input` does not exist; nothing is written
    /// - Any fallback failure once the primary remover did not produce output
    pub fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        input: P,
        output: Q,
    ) -> Result<RemovalReport> {
        let start = Instant::now();
        let input = input.as_ref();
        let output = output.as_ref();

        let image_bytes = ImageIOService::read_input(input)?;
        info!(
            input = %input.display(),
            output = %output.display(),
            "Removing background"
        );

        match self.primary.attempt(&image_bytes) {
            PrimaryOutcome::Success(png) => match ImageIOService::write_output(output, &png) {
                Ok(()) => {
                    let report = RemovalReport {
                        strategy: Strategy::Primary,
                        output: output.to_path_buf(),
                        dimensions: None,
                        elapsed: start.elapsed(),
                    };
                    info!(
                        remover = self.primary.name(),
                        elapsed_ms = report.elapsed.as_millis(),
                        "Primary remover succeeded"
                    );
                    return Ok(report);
                },
                Err(e) => {
                    warn!(error = %e, "Could not write primary remover output, falling back");
                },
            },
            PrimaryOutcome::Unavailable(reason) => {
                info!(%reason, "Primary remover unavailable, using threshold fallback");
            },
            PrimaryOutcome::Failed(e) => {
                warn!(
                    remover = self.primary.name(),
                    error = %e,
                    "Primary remover failed, using threshold fallback"
                );
            },
        }

        self.run_fallback(&image_bytes, output, start).inspect_err(|e| {
            error!(error = %e, "Fallback segmentation failed");
        })
    }

    fn run_fallback(
        &self,
        image_bytes: &[u8],
        output: &Path,
        start: Instant,
    ) -> Result<RemovalReport> {
        let image = ImageIOService::decode(image_bytes)?;
        let dimensions = (image.width(), image.height());

        let (segmented, stats) = self.fallback.segment_with_stats(&image)?;
        let png = ImageIOService::encode_png(&segmented)?;
        ImageIOService::write_output(output, &png)?;

        debug!(
            background_color = ?stats.background_color,
            background_fraction = stats.background_fraction,
            "Fallback output written"
        );

        Ok(RemovalReport {
            strategy: Strategy::Fallback {
                threshold: stats.threshold,
            },
            output: output.to_path_buf(),
            dimensions: Some(dimensions),
            elapsed: start.elapsed(),
        })
    }
}
