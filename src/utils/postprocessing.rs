//! Conversion of model output tensors into alpha masks

use super::preprocessing::Letterbox;
use crate::{
    error::{BgRemovalError, Result},
    segmentation::AlphaMask,
};
use image::GrayImage;
use ndarray::Array4;

/// Map a `(1, 1, S, S)` probability tensor back onto a `width` x `height`
/// image placed with `letterbox`.
///
/// Probabilities are clamped to 0-1 and scaled to 0-255.
pub fn tensor_to_mask(
    tensor: &Array4<f32>,
    width: u32,
    height: u32,
    letterbox: &Letterbox,
) -> Result<AlphaMask> {
    let (batch, channels, mask_height, mask_width) = tensor.dim();
    if batch != 1 || channels != 1 {
        return Err(BgRemovalError::inference(format!(
            "Invalid output tensor shape {:?}, expected (1, 1, H, W)",
            tensor.shape()
        )));
    }
    if mask_width == 0 || mask_height == 0 {
        return Err(BgRemovalError::inference("Output tensor has no spatial extent"));
    }

    let mask = GrayImage::from_fn(width, height, |x, y| {
        let (tensor_x, tensor_y) = letterbox.to_model(x, y);
        let value = tensor
            .get([0, 0, tensor_y as usize, tensor_x as usize])
            .copied()
            .unwrap_or(0.0); // Outside the model's prediction area
        image::Luma([(value.clamp(0.0, 1.0) * 255.0).round() as u8])
    });

    Ok(AlphaMask::from_image(mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_letterboxed_output() {
        // 4x2 image letterboxed into 4x4: rows 1..3 hold the image
        let letterbox = Letterbox::fit(4, 2, 4).unwrap();
        let mut tensor = Array4::<f32>::zeros((1, 1, 4, 4));
        for x in 0..4 {
            tensor[[0, 0, 1, x]] = 1.0;
            tensor[[0, 0, 2, x]] = 0.5;
        }

        let mask = tensor_to_mask(&tensor, 4, 2, &letterbox).unwrap();
        assert_eq!(mask.dimensions(), (4, 2));
        assert_eq!(mask.get(0, 0), Some(255));
        assert_eq!(mask.get(3, 1), Some(128));
    }

    #[test]
    fn test_clamps_logits() {
        let letterbox = Letterbox::fit(2, 2, 2).unwrap();
        let mut tensor = Array4::<f32>::zeros((1, 1, 2, 2));
        tensor[[0, 0, 0, 0]] = 3.5;
        tensor[[0, 0, 1, 1]] = -2.0;

        let mask = tensor_to_mask(&tensor, 2, 2, &letterbox).unwrap();
        assert_eq!(mask.get(0, 0), Some(255));
        assert_eq!(mask.get(1, 1), Some(0));
    }

    #[test]
    fn test_rejects_multi_channel_output() {
        let letterbox = Letterbox::fit(2, 2, 2).unwrap();
        let tensor = Array4::<f32>::zeros((1, 3, 2, 2));
        assert!(tensor_to_mask(&tensor, 2, 2, &letterbox).is_err());
    }
}
