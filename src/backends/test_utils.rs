//! Test utilities and mock primary removers
//!
//! Lets the fallback path be exercised without a model file or an inference
//! runtime.

use super::PrimaryRemover;
use crate::error::{BgRemovalError, Result};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockBehavior {
    Succeed(Vec<u8>),
    Fail(String),
    Unavailable(String),
}

/// Scripted primary remover
#[derive(Debug, Clone)]
pub struct MockRemover {
    behavior: MockBehavior,
    /// Inputs passed to `remove`, shared across clones
    call_history: Arc<Mutex<Vec<usize>>>,
}

impl MockRemover {
    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Remover that returns `output` for every input
    #[must_use]
    pub fn succeeding(output: Vec<u8>) -> Self {
        Self::with_behavior(MockBehavior::Succeed(output))
    }

    /// Remover that is present but errors on every input
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::with_behavior(MockBehavior::Fail(message.to_string()))
    }

    /// Remover that reports itself as not installed
    #[must_use]
    pub fn unavailable(reason: &str) -> Self {
        Self::with_behavior(MockBehavior::Unavailable(reason.to_string()))
    }

    /// Number of times `remove` was called
    pub fn calls(&self) -> usize {
        self.call_history.lock().map_or(0, |history| history.len())
    }

    /// Byte lengths of the inputs `remove` received, in order
    pub fn input_sizes(&self) -> Vec<usize> {
        self.call_history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    fn record_call(&self, input_len: usize) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(input_len);
        }
    }
}

impl PrimaryRemover for MockRemover {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn unavailable_reason(&self) -> Option<String> {
        match &self.behavior {
            MockBehavior::Unavailable(reason) => Some(reason.clone()),
            MockBehavior::Succeed(_) | MockBehavior::Fail(_) => None,
        }
    }

    fn remove(&mut self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        self.record_call(image_bytes.len());

        match &self.behavior {
            MockBehavior::Succeed(output) => Ok(output.clone()),
            MockBehavior::Fail(message) => Err(BgRemovalError::inference(message.clone())),
            MockBehavior::Unavailable(reason) => Err(BgRemovalError::model(reason.clone())),
        }
    }
}
