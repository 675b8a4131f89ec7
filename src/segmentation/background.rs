//! Background colour estimation from corner samples

use crate::error::{BgRemovalError, Result};
use image::{GenericImageView, Rgba, RgbaImage};

/// Estimate the background colour as the per-channel RGB median of the four
/// corner blocks.
///
/// Each block is `block_size` x `block_size`, shrunk to the image size when the
/// image is smaller; blocks of small images therefore overlap and overlapping
/// pixels are sampled once per block. The median of an even-sized sample is the
/// mean of its two middle values.
///
/// # Errors
/// - [`BgRemovalError::EmptyImage`] when the image has no pixels
/// - [`BgRemovalError::InvalidConfig`] when `block_size` is zero
pub fn estimate_background_color(image: &RgbaImage, block_size: u32) -> Result<[f32; 3]> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(BgRemovalError::EmptyImage { width, height });
    }
    if block_size == 0 {
        return Err(BgRemovalError::config_value_error(
            "corner block size",
            block_size,
            ">= 1",
        ));
    }

    let block_width = block_size.min(width);
    let block_height = block_size.min(height);
    let right = width - block_width;
    let bottom = height - block_height;
    let corners = [(0, 0), (right, 0), (0, bottom), (right, bottom)];

    let sample_len = (block_width * block_height) as usize * corners.len();
    let mut channels: [Vec<u8>; 3] = [
        Vec::with_capacity(sample_len),
        Vec::with_capacity(sample_len),
        Vec::with_capacity(sample_len),
    ];

    for (x, y) in corners {
        for (_, _, Rgba([red, green, blue, _])) in
            image.view(x, y, block_width, block_height).pixels()
        {
            channels[0].push(red);
            channels[1].push(green);
            channels[2].push(blue);
        }
    }

    let [mut red, mut green, mut blue] = channels;
    Ok([median(&mut red)?, median(&mut green)?, median(&mut blue)?])
}

fn median(values: &mut [u8]) -> Result<f32> {
    values.sort_unstable();
    let middle = values.len() / 2;

    let upper = values
        .get(middle)
        .copied()
        .ok_or_else(|| BgRemovalError::processing("Cannot take the median of an empty sample"))?;

    if values.len() % 2 == 1 {
        return Ok(f32::from(upper));
    }

    let lower = values
        .get(middle - 1)
        .copied()
        .unwrap_or(upper);
    Ok((f32::from(lower) + f32::from(upper)) / 2.0)
}
