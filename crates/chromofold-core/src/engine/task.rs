use crate::engine::error::EngineError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation handle shared between a front end and a run.
///
/// Clones observe the same flag. The engine polls the token between optimizer
/// iterations and between search runs, never mid-gradient, so cancelled work
/// is discarded at a clean boundary and no partial model escapes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns [`EngineError::Cancelled`] once the token has been cancelled.
    #[inline]
    pub fn check(&self) -> Result<(), EngineError> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn clones_share_the_cancelled_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
        assert!(matches!(clone.check(), Err(EngineError::Cancelled)));
    }

    #[test]
    fn cancellation_is_visible_across_threads() {
        let token = CancellationToken::new();
        let observer = token.clone();

        thread::spawn(move || token.cancel()).join().unwrap();
        assert!(observer.is_cancelled());
    }
}
