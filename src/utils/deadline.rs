use crate::error::{OracleError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Request-wide cancellation token.
///
/// Cloned into every strategy; any clone observing expiry flips the shared
/// flag so siblings stop at their next checkpoint.
#[derive(Debug, Clone)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
    cancelled: Arc<AtomicBool>,
}

impl Deadline {
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            budget,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn expired(&self) -> bool {
        if self.cancelled.load(Ordering::Relaxed) {
            return true;
        }
        match self.budget {
            Some(budget) if self.start.elapsed() >= budget => {
                self.cancelled.store(true, Ordering::Relaxed);
                true
            }
            _ => false,
        }
    }

    /// Cancellation point: `Err(Timeout)` once the budget is spent.
    pub fn check(&self) -> Result<()> {
        if self.expired() {
            return Err(self.timeout_error());
        }
        Ok(())
    }

    pub fn timeout_error(&self) -> OracleError {
        OracleError::Timeout {
            elapsed_ms: self.elapsed().as_millis() as u64,
            budget_ms: self.budget.map(|b| b.as_millis() as u64).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_zero_budget_expires_immediately() {
        let deadline = Deadline::new(Some(Duration::ZERO));
        assert!(deadline.expired());
        assert_eq!(deadline.check().unwrap_err().kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_expiry_is_shared_between_clones() {
        let deadline = Deadline::new(Some(Duration::ZERO));
        let clone = deadline.clone();
        assert!(clone.expired());
        assert!(deadline.cancelled.load(Ordering::Relaxed));
    }

    #[test]
    fn test_unbounded_never_expires() {
        assert!(Deadline::unbounded().check().is_ok());
    }
}
