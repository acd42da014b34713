//! Cooperative cancellation for long-running solves and fits.
//!
//! Runs own no threads; the owning orchestrator hands a token in and may
//! flag it from elsewhere. Loops check at coarse boundaries (end of a
//! heat-treatment phase, end of a fit iteration), not every inner step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::{QlError, QlResult};

/// Shared cancellation flag with an optional deadline.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Token that never cancels.
    pub fn none() -> Self {
        Self::default()
    }

    /// Token that cancels when `deadline` passes.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Request cancellation from another owner of the same token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::Relaxed) {
            return true;
        }
        match self.deadline {
            Some(d) => Instant::now() >= d,
            None => false,
        }
    }

    /// Check the token, returning `QlError::Cancelled` when flagged.
    pub fn check(&self) -> QlResult<()> {
        if self.is_cancelled() {
            Err(QlError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_live() {
        let token = CancelToken::none();
        assert!(token.check().is_ok());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::none();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(QlError::Cancelled)));
    }

    #[test]
    fn past_deadline_cancels() {
        let token = CancelToken::with_deadline(Instant::now());
        assert!(token.is_cancelled());
    }
}
