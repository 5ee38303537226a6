//! Cooperative cancellation for long-running pages.

use crate::core::errors::{OCRError, ProcessingStage};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable flag checked by the pipeline between stages.
///
/// Cancelling one clone cancels all of them. A stage already running (for
/// example a forward pass) completes; the next stage boundary returns
/// [`OCRError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fails with `OCRError::Cancelled` when cancellation was requested.
    pub fn check(&self, next_stage: ProcessingStage) -> Result<(), OCRError> {
        if self.is_cancelled() {
            Err(OCRError::cancelled(next_stage))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(token.check(ProcessingStage::Inference).is_ok());

        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            token.check(ProcessingStage::Vectorization),
            Err(OCRError::Cancelled {
                stage: ProcessingStage::Vectorization
            })
        ));
    }
}
