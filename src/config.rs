//! Configuration types for background removal operations

use crate::error::{BgRemovalError, Result};
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Percentile of the distance map used when none is supplied
pub const DEFAULT_THRESHOLD_PERCENTILE: u8 = 10;

/// Documented working range of the threshold percentile.
///
/// Lower values remove more aggressively, higher values keep more of the
/// image opaque. Values outside the range are accepted but logged.
pub const RECOMMENDED_PERCENTILE_RANGE: RangeInclusive<u8> = 5..=30;

/// Side length of the square blocks sampled in each image corner
pub const DEFAULT_CORNER_BLOCK_SIZE: u32 = 10;

/// Floor applied to the adaptive threshold, in RGB distance units
pub const DEFAULT_MIN_THRESHOLD: f32 = 30.0;

/// Gaussian sigma used to soften the binary mask
pub const DEFAULT_BLUR_SIGMA: f32 = 1.0;

/// Square input size of the default segmentation model
pub const DEFAULT_MODEL_INPUT_SIZE: u32 = 1024;

/// Tunables of the colour-distance fallback segmenter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmenterConfig {
    /// Percentile (0-100) of the distance map used as adaptive threshold
    pub threshold_percentile: u8,
    /// Corner sampling block size in pixels
    pub corner_block_size: u32,
    /// Minimum adaptive threshold
    pub min_threshold: f32,
    /// Gaussian blur sigma applied to the binary mask (0 disables smoothing)
    pub blur_sigma: f32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            threshold_percentile: DEFAULT_THRESHOLD_PERCENTILE,
            corner_block_size: DEFAULT_CORNER_BLOCK_SIZE,
            min_threshold: DEFAULT_MIN_THRESHOLD,
            blur_sigma: DEFAULT_BLUR_SIGMA,
        }
    }
}

impl SegmenterConfig {
    /// Create a configuration with the given percentile and default tunables
    #[must_use]
    pub fn with_percentile(threshold_percentile: u8) -> Self {
        Self {
            threshold_percentile,
            ..Self::default()
        }
    }

    /// Whether the percentile lies inside [`RECOMMENDED_PERCENTILE_RANGE`]
    #[must_use]
    pub fn is_recommended_percentile(&self) -> bool {
        RECOMMENDED_PERCENTILE_RANGE.contains(&self.threshold_percentile)
    }

    /// Validate segmenter parameters
    pub fn validate(&self) -> Result<()> {
        if self.threshold_percentile > 100 {
            return Err(BgRemovalError::config_value_error(
                "threshold percentile",
                self.threshold_percentile,
                "0-100",
            ));
        }

        if self.corner_block_size == 0 {
            return Err(BgRemovalError::config_value_error(
                "corner block size",
                self.corner_block_size,
                ">= 1",
            ));
        }

        if !self.min_threshold.is_finite() || self.min_threshold < 0.0 {
            return Err(BgRemovalError::config_value_error(
                "minimum threshold",
                self.min_threshold,
                "finite, >= 0",
            ));
        }

        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(BgRemovalError::config_value_error(
                "blur sigma",
                self.blur_sigma,
                "finite, >= 0",
            ));
        }

        Ok(())
    }
}

/// Model input preparation for the neural primary remover
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessingConfig {
    /// Square model input side length
    pub target_size: u32,
    /// Per-channel mean subtracted from values scaled to 0-1
    pub normalization_mean: [f32; 3],
    /// Per-channel standard deviation
    pub normalization_std: [f32; 3],
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_MODEL_INPUT_SIZE,
            normalization_mean: [0.5, 0.5, 0.5],
            normalization_std: [1.0, 1.0, 1.0],
        }
    }
}

/// Configuration for a single background removal run
#[derive(Debug, Clone, Default)]
pub struct RemovalConfig {
    /// Fallback segmenter tunables
    pub segmenter: SegmenterConfig,
    /// ONNX model used by the primary remover, if any
    pub model_path: Option<PathBuf>,
    /// Skip the primary remover entirely
    pub fallback_only: bool,
    /// Primary remover input preparation
    pub preprocessing: PreprocessingConfig,
}

impl RemovalConfig {
    /// Create a builder for `RemovalConfig`
    #[must_use]
    pub fn builder() -> RemovalConfigBuilder {
        RemovalConfigBuilder::default()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.segmenter.validate()?;

        if self.preprocessing.target_size == 0 {
            return Err(BgRemovalError::config_value_error(
                "model input size",
                self.preprocessing.target_size,
                ">= 1",
            ));
        }

        if self
            .preprocessing
            .normalization_std
            .iter()
            .any(|std| !std.is_finite() || *std <= 0.0)
        {
            return Err(BgRemovalError::invalid_config(
                "Normalization std values must be finite and positive",
            ));
        }

        Ok(())
    }
}

/// Builder for `RemovalConfig`
#[derive(Debug, Default)]
pub struct RemovalConfigBuilder {
    config: RemovalConfig,
}

impl RemovalConfigBuilder {
    /// Set the threshold percentile of the fallback segmenter
    #[must_use]
    pub fn threshold_percentile(mut self, percentile: u8) -> Self {
        self.config.segmenter.threshold_percentile = percentile;
        self
    }

    /// Replace all fallback segmenter tunables
    #[must_use]
    pub fn segmenter(mut self, segmenter: SegmenterConfig) -> Self {
        self.config.segmenter = segmenter;
        self
    }

    /// Set the ONNX model for the primary remover
    #[must_use]
    pub fn model_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.model_path = Some(path.into());
        self
    }

    /// Skip the primary remover
    #[must_use]
    pub fn fallback_only(mut self, fallback_only: bool) -> Self {
        self.config.fallback_only = fallback_only;
        self
    }

    /// Set primary remover preprocessing
    #[must_use]
    pub fn preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.config.preprocessing = preprocessing;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<RemovalConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
