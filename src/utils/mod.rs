//! Tensor preparation and mask recovery for the neural primary remover

pub mod postprocessing;
pub mod preprocessing;

pub use postprocessing::tensor_to_mask;
pub use preprocessing::{ImagePreprocessor, Letterbox, PreprocessingOptions};
