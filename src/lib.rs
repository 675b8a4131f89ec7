#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # remove-bg
//!
//! Single-image background removal. A neural primary remover (Tract, pure
//! Rust ONNX inference) is tried first; when it is unavailable or fails, a
//! colour-distance heuristic estimates the background from the image corners
//! and writes a softened foreground mask into the alpha channel.
//!
//! ## Features
//!
//! - **Primary remover**: any single-output salient segmentation ONNX model
//!   (ISNet-style) through the `tract` feature
//! - **Fallback segmenter**: corner-median background estimate, adaptive
//!   percentile threshold with a floor, Gaussian-smoothed mask
//! - **Safe output**: results are written through a temporary file, so a
//!   failed run never leaves a partial PNG behind
//! - **CLI Integration**: `remove-bg <input> <output> [threshold_percentile]`
//!   (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use remove_bg::{BackgroundRemovalProcessor, RemovalConfig, Strategy};
//!
//! # fn example() -> remove_bg::Result<()> {
//! let config = RemovalConfig::builder()
//!     .model_path("models/isnet.onnx")
//!     .threshold_percentile(15)
//!     .build()?;
//!
//! let mut processor = BackgroundRemovalProcessor::new(config)?;
//! let report = processor.process_file("photo.jpg", "photo-cutout.png")?;
//! if let Strategy::Fallback { threshold } = report.strategy {
//!     println!("used the fallback with threshold {threshold}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Fallback only
//!
//! ```rust,no_run
//! use remove_bg::{FallbackSegmenter, SegmenterConfig};
//!
//! # fn example() -> remove_bg::Result<()> {
//! let image = image::open("product.png")?;
//! let segmenter = FallbackSegmenter::new(SegmenterConfig::with_percentile(10))?;
//! segmenter.segment(&image)?.save("product-cutout.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `tract` (default): neural primary remover
//! - `cli` (default): command-line interface and tracing subscriber
//! - `webp-support`: WebP input decoding

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod processor;
pub mod segmentation;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod utils;

#[cfg(feature = "tract")]
pub use backends::TractRemover;
pub use backends::{create_primary_remover, PrimaryOutcome, PrimaryRemover, UnavailableRemover};
pub use config::{PreprocessingConfig, RemovalConfig, RemovalConfigBuilder, SegmenterConfig};
pub use error::{BgRemovalError, Result};
pub use processor::{BackgroundRemovalProcessor, RemovalReport, Strategy};
pub use segmentation::{AlphaMask, DistanceMap, FallbackSegmenter, SegmentationStats};
pub use services::ImageIOService;
