//! Primary background remover backends
//!
//! The primary remover is an optional capability: it turns encoded image bytes
//! into encoded PNG bytes with an alpha channel, or it is not there at all.
//! Callers go through [`PrimaryRemover::attempt`], which folds "not there" and
//! "there but failed" into a [`PrimaryOutcome`] without losing the difference.
//!
//! - Tract backend (pure Rust ONNX inference, `tract` feature)
//! - Unavailable backend (no model configured, or built without inference)

#[cfg(feature = "tract")]
pub mod tract;

// Test utilities for backend testing
#[cfg(test)]
pub mod test_utils;

#[cfg(feature = "tract")]
pub use self::tract::TractRemover;

use crate::{config::RemovalConfig, error::BgRemovalError, error::Result};
use std::fmt;
use std::path::PathBuf;

/// Result of one primary remover attempt
#[derive(Debug)]
pub enum PrimaryOutcome {
    /// Encoded output image
    Success(Vec<u8>),
    /// The capability is not present; carries the reason
    Unavailable(String),
    /// The capability is present but failed on this input
    Failed(BgRemovalError),
}

impl PrimaryOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for PrimaryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(bytes) => write!(f, "success ({} bytes)", bytes.len()),
            Self::Unavailable(reason) => write!(f, "unavailable: {reason}"),
            Self::Failed(error) => write!(f, "failed: {error}"),
        }
    }
}

/// An external-style background remover: image bytes in, image bytes out
pub trait PrimaryRemover {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Why the capability is missing, or `None` when it can be used
    fn unavailable_reason(&self) -> Option<String>;

    /// Remove the background from an encoded image
    ///
    /// # Errors
    /// - Model loading failures
    /// - Decoding, inference or encoding failures
    fn remove(&mut self, image_bytes: &[u8]) -> Result<Vec<u8>>;

    /// Availability check followed by the call, as a tagged outcome
    fn attempt(&mut self, image_bytes: &[u8]) -> PrimaryOutcome {
        if let Some(reason) = self.unavailable_reason() {
            return PrimaryOutcome::Unavailable(reason);
        }
        match self.remove(image_bytes) {
            Ok(bytes) => PrimaryOutcome::Success(bytes),
            Err(error) => PrimaryOutcome::Failed(error),
        }
    }
}

/// Primary remover that is never available
#[derive(Debug, Clone)]
pub struct UnavailableRemover {
    reason: String,
}

impl UnavailableRemover {
    #[must_use]
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl PrimaryRemover for UnavailableRemover {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn unavailable_reason(&self) -> Option<String> {
        Some(self.reason.clone())
    }

    fn remove(&mut self, _image_bytes: &[u8]) -> Result<Vec<u8>> {
        Err(BgRemovalError::model(self.reason.clone()))
    }
}

/// Create the primary remover described by `config`
#[must_use]
pub fn create_primary_remover(config: &RemovalConfig) -> Box<dyn PrimaryRemover> {
    if config.fallback_only {
        return Box::new(UnavailableRemover::new("disabled by --fallback-only"));
    }

    let Some(model_path) = config.model_path.clone() else {
        return Box::new(UnavailableRemover::new("no segmentation model configured"));
    };

    model_remover(model_path, config)
}

#[cfg(feature = "tract")]
fn model_remover(model_path: PathBuf, config: &RemovalConfig) -> Box<dyn PrimaryRemover> {
    Box::new(TractRemover::new(model_path, config.preprocessing))
}

#[cfg(not(feature = "tract"))]
fn model_remover(model_path: PathBuf, _config: &RemovalConfig) -> Box<dyn PrimaryRemover> {
    Box::new(UnavailableRemover::new(format!(
        "built without the `tract` feature, cannot run {}",
        model_path.display()
    )))
}
