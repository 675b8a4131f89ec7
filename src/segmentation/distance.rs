//! Per-pixel colour distance to the background estimate

use crate::error::{BgRemovalError, Result};
use image::{Rgba, RgbaImage};
use ndarray::Array2;

/// Euclidean RGB distance of every pixel to a background colour.
///
/// Stored row-major as `(height, width)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMap {
    distances: Array2<f32>,
}

impl DistanceMap {
    /// Compute the distance map of `image` against `background`
    #[must_use]
    pub fn compute(image: &RgbaImage, background: [f32; 3]) -> Self {
        let (width, height) = image.dimensions();
        let [bg_red, bg_green, bg_blue] = background;

        let distances = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            let Rgba([red, green, blue, _]) = *image.get_pixel(col as u32, row as u32);
            let d_red = f32::from(red) - bg_red;
            let d_green = f32::from(green) - bg_green;
            let d_blue = f32::from(blue) - bg_blue;
            (d_red * d_red + d_green * d_green + d_blue * d_blue).sqrt()
        });

        Self { distances }
    }

    /// Image dimensions as `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        let (rows, cols) = self.distances.dim();
        (cols as u32, rows as u32)
    }

    /// Distance at pixel `(x, y)`
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        self.distances.get([y as usize, x as usize]).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Underlying `(height, width)` array
    #[must_use]
    pub fn as_array(&self) -> &Array2<f32> {
        &self.distances
    }

    /// Value at `percentile` (0-100) of the distance distribution.
    ///
    /// Linear interpolation between the two closest ranks, with rank
    /// `percentile / 100 * (n - 1)`.
    ///
    /// # Errors
    /// - [`BgRemovalError::EmptyImage`] for an empty map
    /// - [`BgRemovalError::InvalidConfig`] for a percentile outside 0-100
    pub fn percentile(&self, percentile: f32) -> Result<f32> {
        if !(0.0..=100.0).contains(&percentile) {
            return Err(BgRemovalError::config_value_error(
                "percentile",
                percentile,
                "0-100",
            ));
        }
        if self.is_empty() {
            let (width, height) = self.dimensions();
            return Err(BgRemovalError::EmptyImage { width, height });
        }

        let mut sorted: Vec<f32> = self.distances.iter().copied().collect();
        sorted.sort_unstable_by(f32::total_cmp);

        let rank = f64::from(percentile) / 100.0 * (sorted.len() - 1) as f64;
        let lower_rank = rank.floor();
        let fraction = (rank - lower_rank) as f32;

        let lower = sorted.get(lower_rank as usize).copied();
        let upper = sorted.get(rank.ceil() as usize).copied();
        match (lower, upper) {
            // Rounding must not carry the result past the next rank
            (Some(lower), Some(upper)) => Ok((lower + (upper - lower) * fraction).min(upper)),
            _ => Err(BgRemovalError::processing(format!(
                "Percentile rank {rank} outside distance map of {} values",
                sorted.len()
            ))),
        }
    }
}

/// Adaptive foreground threshold: the distance map percentile, floored at
/// `min_threshold`.
///
/// The floor keeps near-uniform images, whose low percentiles sit close to
/// zero, from classifying sensor noise as foreground.
pub fn adaptive_threshold(
    distances: &DistanceMap,
    percentile: u8,
    min_threshold: f32,
) -> Result<f32> {
    let threshold = distances.percentile(f32::from(percentile))?;
    Ok(threshold.max(min_threshold))
}
