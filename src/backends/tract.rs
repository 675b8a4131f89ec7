//! Tract backend for the primary remover
//!
//! Runs a single-output salient object segmentation model (ISNet-style,
//! `(1, 3, S, S)` in, `(1, 1, S, S)` probabilities out) with Tract, a pure
//! Rust ONNX inference library. The model is loaded lazily on the first
//! removal so that an unusable model surfaces as a failure of that attempt.

use super::PrimaryRemover;
use crate::config::PreprocessingConfig;
use crate::error::{BgRemovalError, Result};
use crate::services::ImageIOService;
use crate::utils::{tensor_to_mask, ImagePreprocessor};
use instant::Instant;
use ndarray::Array4;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tract_onnx::prelude::*;

/// Type alias for the complex Tract model type to reduce complexity warnings
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Neural primary remover backed by Tract
pub struct TractRemover {
    model_path: PathBuf,
    preprocessing: PreprocessingConfig,
    model: Option<TractModel>,
}

impl TractRemover {
    /// Create a remover for the ONNX model at `model_path`; nothing is loaded yet
    #[must_use]
    pub fn new<P: Into<PathBuf>>(model_path: P, preprocessing: PreprocessingConfig) -> Self {
        Self {
            model_path: model_path.into(),
            preprocessing,
            model: None,
        }
    }

    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Load and optimize the model, once
    fn load_model(&mut self) -> Result<&TractModel> {
        if self.model.is_none() {
            let model_load_start = Instant::now();

            let model_data = std::fs::read(&self.model_path)
                .map_err(|e| BgRemovalError::file_io_error("read model", &self.model_path, &e))?;

            #[allow(clippy::cast_precision_loss)]
            let size_mb = model_data.len() as f64 / (1024.0 * 1024.0);
            info!(
                model = %self.model_path.display(),
                size_mb = format!("{size_mb:.2}"),
                "Loading segmentation model"
            );

            let size = self.preprocessing.target_size as usize;
            let model = onnx()
                .model_for_read(&mut std::io::Cursor::new(model_data))
                .map_err(|e| BgRemovalError::model(format!("Failed to load ONNX model: {e}")))?
                .with_input_fact(0, f32::fact([1, 3, size, size]).into())
                .map_err(|e| {
                    BgRemovalError::model(format!("Failed to set model input shape: {e}"))
                })?
                .into_optimized()
                .map_err(|e| BgRemovalError::model(format!("Failed to optimize model: {e}")))?
                .into_runnable()
                .map_err(|e| {
                    BgRemovalError::model(format!("Failed to create runnable model: {e}"))
                })?;

            info!(
                elapsed_ms = model_load_start.elapsed().as_millis(),
                "Segmentation model ready"
            );
            self.model = Some(model);
        }

        self.model
            .as_ref()
            .ok_or_else(|| BgRemovalError::model("Tract model not initialized"))
    }

    /// Run the model on a preprocessed `(1, 3, S, S)` tensor
    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        let model = self.load_model()?;

        debug!(input_shape = ?input.shape(), "Running Tract inference");
        let inference_start = Instant::now();

        let input_tensor = Tensor::from(input.clone());
        let outputs = model
            .run(tvec![input_tensor.into()])
            .map_err(|e| BgRemovalError::inference(format!("Tract inference failed: {e}")))?;

        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| BgRemovalError::inference("No output tensor found"))?
            .into_arc_tensor();

        let output_data = output_tensor.to_array_view::<f32>().map_err(|e| {
            BgRemovalError::inference(format!("Failed to convert output tensor: {e}"))
        })?;

        let &[batch, channels, height, width] = output_data.shape() else {
            return Err(BgRemovalError::inference(format!(
                "Expected 4D output tensor, got {}D",
                output_data.ndim()
            )));
        };

        let output_array = Array4::from_shape_vec(
            (batch, channels, height, width),
            output_data.iter().copied().collect(),
        )
        .map_err(|e| BgRemovalError::inference(format!("Failed to reshape output tensor: {e}")))?;

        debug!(
            output_shape = ?output_array.shape(),
            elapsed_ms = inference_start.elapsed().as_millis(),
            "Tract inference completed"
        );

        Ok(output_array)
    }
}

impl PrimaryRemover for TractRemover {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn unavailable_reason(&self) -> Option<String> {
        if self.model_path.is_file() {
            None
        } else {
            Some(format!(
                "segmentation model not found at {}",
                self.model_path.display()
            ))
        }
    }

    fn remove(&mut self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let image = ImageIOService::decode(image_bytes)?;
        let (width, height) = (image.width(), image.height());

        let (input, letterbox) =
            ImagePreprocessor::preprocess_for_inference(&image, &self.preprocessing)?;
        let output = self.infer(&input)?;
        let mask = tensor_to_mask(&output, width, height, &letterbox)?;

        let mut rgba = image.to_rgba8();
        mask.apply_to(&mut rgba)?;
        ImageIOService::encode_png(&rgba)
    }
}
