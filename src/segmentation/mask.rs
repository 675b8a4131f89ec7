//! Alpha mask classification, smoothing and application

use super::distance::DistanceMap;
use crate::error::{BgRemovalError, Result};
use image::{imageops, GrayImage, Luma, RgbaImage};

/// Fully opaque foreground value
pub const FOREGROUND: u8 = 255;
/// Fully transparent background value
pub const BACKGROUND: u8 = 0;

/// Single-channel opacity mask with the dimensions of its source image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    mask: GrayImage,
}

impl AlphaMask {
    /// Binary classification: [`FOREGROUND`] where the distance exceeds
    /// `threshold`, [`BACKGROUND`] elsewhere.
    pub fn classify(distances: &DistanceMap, threshold: f32) -> Result<Self> {
        let (width, height) = distances.dimensions();
        let data: Vec<u8> = distances
            .as_array()
            .iter()
            .map(|&distance| {
                if distance > threshold {
                    FOREGROUND
                } else {
                    BACKGROUND
                }
            })
            .collect();

        let mask = GrayImage::from_raw(width, height, data).ok_or_else(|| {
            BgRemovalError::processing(format!(
                "Mask buffer does not match {width}x{height} distance map"
            ))
        })?;
        Ok(Self { mask })
    }

    /// Wrap an existing grayscale mask
    #[must_use]
    pub fn from_image(mask: GrayImage) -> Self {
        Self { mask }
    }

    /// Gaussian blur with the given sigma; a sigma of zero returns the mask unchanged
    #[must_use]
    pub fn smooth(&self, sigma: f32) -> Self {
        if sigma <= 0.0 {
            return self.clone();
        }
        Self {
            mask: imageops::blur(&self.mask, sigma),
        }
    }

    /// Mask dimensions as `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }

    /// Opacity at pixel `(x, y)`
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        self.mask.get_pixel_checked(x, y).map(|&Luma([alpha])| alpha)
    }

    /// Fraction of pixels that are fully transparent
    #[must_use]
    pub fn background_fraction(&self) -> f32 {
        let total = self.mask.as_raw().len();
        if total == 0 {
            return 0.0;
        }
        let background = self
            .mask
            .as_raw()
            .iter()
            .filter(|&&alpha| alpha == BACKGROUND)
            .count();
        background as f32 / total as f32
    }

    /// Replace the alpha channel of `image` with this mask, leaving RGB untouched
    ///
    /// # Errors
    /// Returns [`BgRemovalError::Processing`] when the dimensions differ.
    pub fn apply_to(&self, image: &mut RgbaImage) -> Result<()> {
        if image.dimensions() != self.mask.dimensions() {
            let (image_width, image_height) = image.dimensions();
            let (mask_width, mask_height) = self.mask.dimensions();
            return Err(BgRemovalError::processing(format!(
                "Mask {mask_width}x{mask_height} does not match image {image_width}x{image_height}"
            )));
        }

        for (pixel, &Luma([alpha])) in image.pixels_mut().zip(self.mask.pixels()) {
            pixel.0[3] = alpha;
        }
        Ok(())
    }

    #[must_use]
    pub fn as_image(&self) -> &GrayImage {
        &self.mask
    }
}
