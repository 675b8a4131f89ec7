//! Model input preparation for the neural primary remover
//!
//! Images are letterboxed into the model's square input: resized with their
//! aspect ratio preserved, centred on a white canvas, and converted to a
//! normalized NCHW tensor. [`Letterbox`] records the geometry so the model's
//! output can be mapped back onto the original pixels.

use crate::{
    config::PreprocessingConfig,
    error::{BgRemovalError, Result},
};
use image::{DynamicImage, ImageBuffer, RgbImage};
use ndarray::Array4;

/// Configuration for preprocessing behavior
#[derive(Debug, Clone)]
pub struct PreprocessingOptions {
    /// Padding color for aspect ratio preservation (RGB)
    pub padding_color: [u8; 3],
}

impl Default for PreprocessingOptions {
    fn default() -> Self {
        Self {
            padding_color: [255, 255, 255], // White padding
        }
    }
}

/// Placement of an image inside the square model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Scale from original to model coordinates
    pub scale: f32,
    /// Scaled image width
    pub scaled_width: u32,
    /// Scaled image height
    pub scaled_height: u32,
    /// Horizontal centring offset
    pub offset_x: u32,
    /// Vertical centring offset
    pub offset_y: u32,
}

impl Letterbox {
    /// Compute the placement of a `width` x `height` image in a `target_size` square
    pub fn fit(width: u32, height: u32, target_size: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BgRemovalError::EmptyImage { width, height });
        }
        if target_size == 0 {
            return Err(BgRemovalError::invalid_config("Model input size must be positive"));
        }

        let target_size_f32 = target_size as f32;
        let scale = (target_size_f32 / width as f32).min(target_size_f32 / height as f32);

        // Never round past the canvas
        let scaled_width = ((width as f32 * scale).round() as u32).clamp(1, target_size);
        let scaled_height = ((height as f32 * scale).round() as u32).clamp(1, target_size);

        Ok(Self {
            scale,
            scaled_width,
            scaled_height,
            offset_x: (target_size - scaled_width) / 2,
            offset_y: (target_size - scaled_height) / 2,
        })
    }

    /// Model coordinates of original pixel `(x, y)`
    #[must_use]
    pub fn to_model(&self, x: u32, y: u32) -> (u32, u32) {
        let scaled_x = ((x as f32 * self.scale).round() as u32).min(self.scaled_width - 1);
        let scaled_y = ((y as f32 * self.scale).round() as u32).min(self.scaled_height - 1);
        (scaled_x + self.offset_x, scaled_y + self.offset_y)
    }
}

/// Shared image preprocessing utilities
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Preprocess image for model inference
    ///
    /// Returns the `(1, 3, S, S)` tensor and the letterbox used to build it.
    pub fn preprocess_image(
        image: &DynamicImage,
        preprocessing_config: &PreprocessingConfig,
        options: &PreprocessingOptions,
    ) -> Result<(Array4<f32>, Letterbox)> {
        let target_size = preprocessing_config.target_size;
        if target_size == 0 {
            return Err(BgRemovalError::invalid_config("Model input size must be positive"));
        }

        let rgb_image = image.to_rgb8();
        let (orig_width, orig_height) = rgb_image.dimensions();
        let letterbox = Letterbox::fit(orig_width, orig_height, target_size)?;

        let resized = image::imageops::resize(
            &rgb_image,
            letterbox.scaled_width,
            letterbox.scaled_height,
            image::imageops::FilterType::Triangle,
        );

        let [red, green, blue] = options.padding_color;
        let mut canvas =
            ImageBuffer::from_pixel(target_size, target_size, image::Rgb([red, green, blue]));
        image::imageops::replace(
            &mut canvas,
            &resized,
            i64::from(letterbox.offset_x),
            i64::from(letterbox.offset_y),
        );

        let target_size_usize = usize::try_from(target_size).map_err(|_| {
            BgRemovalError::processing("Target size too large for tensor allocation")
        })?;
        let tensor = Self::canvas_to_tensor(&canvas, preprocessing_config, target_size_usize);

        Ok((tensor, letterbox))
    }

    /// Preprocess with default options (white padding)
    pub fn preprocess_for_inference(
        image: &DynamicImage,
        preprocessing_config: &PreprocessingConfig,
    ) -> Result<(Array4<f32>, Letterbox)> {
        Self::preprocess_image(image, preprocessing_config, &PreprocessingOptions::default())
    }

    /// Convert canvas to normalized tensor
    #[allow(clippy::indexing_slicing)]
    // Safe: channel < 3 by tensor shape
    fn canvas_to_tensor(
        canvas: &RgbImage,
        preprocessing_config: &PreprocessingConfig,
        target_size: usize,
    ) -> Array4<f32> {
        let mean = preprocessing_config.normalization_mean;
        let std = preprocessing_config.normalization_std;

        Array4::from_shape_fn((1, 3, target_size, target_size), |(_, channel, y, x)| {
            let pixel = canvas.get_pixel(x as u32, y as u32);
            (f32::from(pixel[channel]) / 255.0 - mean[channel]) / std[channel]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn small_config() -> PreprocessingConfig {
        PreprocessingConfig {
            target_size: 8,
            ..PreprocessingConfig::default()
        }
    }

    #[test]
    fn test_letterbox_landscape() {
        let letterbox = Letterbox::fit(200, 100, 8).unwrap();
        assert_eq!(letterbox.scaled_width, 8);
        assert_eq!(letterbox.scaled_height, 4);
        assert_eq!(letterbox.offset_x, 0);
        assert_eq!(letterbox.offset_y, 2);
        assert_eq!(letterbox.to_model(0, 0), (0, 2));
        assert_eq!(letterbox.to_model(199, 99), (7, 5));
    }

    #[test]
    fn test_letterbox_upscales_small_images() {
        let letterbox = Letterbox::fit(2, 4, 8).unwrap();
        assert_eq!((letterbox.scaled_width, letterbox.scaled_height), (4, 8));
        assert_eq!((letterbox.offset_x, letterbox.offset_y), (2, 0));
    }

    #[test]
    fn test_letterbox_rejects_empty() {
        assert!(Letterbox::fit(0, 5, 8).is_err());
    }

    #[test]
    fn test_tensor_shape_and_normalization() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, Rgb([255, 0, 255])));
        let (tensor, letterbox) =
            ImagePreprocessor::preprocess_for_inference(&image, &small_config()).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 8, 8]);
        assert_eq!(letterbox.offset_y, 2);

        // Inside the image: R = 1.0 - 0.5, G = 0.0 - 0.5
        assert!((tensor[[0, 0, 4, 4]] - 0.5).abs() < 1e-3);
        assert!((tensor[[0, 1, 4, 4]] + 0.5).abs() < 1e-3);
        // White padding row
        assert!((tensor[[0, 1, 0, 0]] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_custom_padding_color() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 4, Rgb([255, 255, 255])));
        let options = PreprocessingOptions {
            padding_color: [0, 255, 0],
        };
        let (tensor, letterbox) =
            ImagePreprocessor::preprocess_image(&image, &small_config(), &options).unwrap();

        assert_eq!((letterbox.offset_x, letterbox.offset_y), (0, 2));
        // Green padding above the image: R = 0.0 - 0.5, G = 1.0 - 0.5
        assert!((tensor[[0, 0, 0, 3]] + 0.5).abs() < 1e-3);
        assert!((tensor[[0, 1, 0, 3]] - 0.5).abs() < 1e-3);
        // Image rows stay white
        assert!((tensor[[0, 0, 3, 3]] - 0.5).abs() < 1e-3);
    }
}
