//! Colour-distance fallback segmentation
//!
//! Used when the neural primary remover is unavailable or fails. The
//! background colour is estimated from the image corners, every pixel is
//! scored by its RGB distance to that colour, and pixels above an adaptive
//! percentile threshold are kept as foreground. The binary mask is then
//! softened with a small Gaussian blur and written into the alpha channel.

mod background;
mod distance;
mod mask;

pub use background::estimate_background_color;
pub use distance::{adaptive_threshold, DistanceMap};
pub use mask::{AlphaMask, BACKGROUND, FOREGROUND};

use crate::config::SegmenterConfig;
use crate::error::{BgRemovalError, Result};
use crate::services::ImageIOService;
use image::{DynamicImage, RgbaImage};
use instant::Instant;
use tracing::{debug, warn};

/// Values computed while segmenting one image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationStats {
    /// Estimated background colour (RGB)
    pub background_color: [f32; 3],
    /// Threshold actually used, after the floor
    pub threshold: f32,
    /// Fraction of pixels classified as background before smoothing
    pub background_fraction: f32,
}

/// Heuristic background remover based on colour distance
#[derive(Debug, Clone, Default)]
pub struct FallbackSegmenter {
    config: SegmenterConfig,
}

impl FallbackSegmenter {
    /// Create a segmenter after validating its configuration
    pub fn new(config: SegmenterConfig) -> Result<Self> {
        config.validate()?;
        if !config.is_recommended_percentile() {
            warn!(
                threshold_percentile = config.threshold_percentile,
                "Threshold percentile outside the recommended 5-30 range"
            );
        }
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segment `image`, returning an RGBA copy whose alpha marks the foreground
    pub fn segment(&self, image: &DynamicImage) -> Result<RgbaImage> {
        self.segment_with_stats(image).map(|(rgba, _)| rgba)
    }

    /// Like [`segment`](Self::segment), also returning intermediate values
    pub fn segment_with_stats(
        &self,
        image: &DynamicImage,
    ) -> Result<(RgbaImage, SegmentationStats)> {
        let mut rgba = image.to_rgba8();
        let stats = self.segment_in_place(&mut rgba)?;
        Ok((rgba, stats))
    }

    /// Overwrite the alpha channel of `image` with the segmentation mask
    pub fn segment_in_place(&self, image: &mut RgbaImage) -> Result<SegmentationStats> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(BgRemovalError::EmptyImage { width, height });
        }

        let start = Instant::now();

        let background_color = estimate_background_color(image, self.config.corner_block_size)?;
        let distances = DistanceMap::compute(image, background_color);
        let threshold = adaptive_threshold(
            &distances,
            self.config.threshold_percentile,
            self.config.min_threshold,
        )?;

        let binary = AlphaMask::classify(&distances, threshold)?;
        let background_fraction = binary.background_fraction();
        binary.smooth(self.config.blur_sigma).apply_to(image)?;

        debug!(
            width,
            height,
            ?background_color,
            threshold,
            background_fraction,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Fallback segmentation complete"
        );

        Ok(SegmentationStats {
            background_color,
            threshold,
            background_fraction,
        })
    }

    /// Decode `image_bytes`, segment, and encode the result as PNG
    pub fn segment_bytes(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let image = ImageIOService::decode(image_bytes)?;
        let segmented = self.segment(&image)?;
        ImageIOService::encode_png(&segmented)
    }
}
