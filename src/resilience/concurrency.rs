//! In-flight upstream call limiter.
//!
//! # Responsibilities
//! - Bound the number of concurrent upstream calls
//! - Shed load immediately when every permit is taken
//!
//! # Design Decisions
//! - Non-blocking acquire: a full gate rejects, it never queues
//! - Permits are RAII guards, released on drop whatever the exit path

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

use crate::features::{FeatureFlag, FeatureRegistry};

/// Outcome of asking for a permit.
#[derive(Debug)]
pub enum Admission {
    /// `concurrency` is off; no permit taken.
    Disabled,
    /// Permit held until the guard is dropped.
    Admitted(ConcurrencyPermit),
    /// Every permit is in use.
    Rejected,
}

/// A held slot. Dropping it frees the slot.
#[derive(Debug)]
pub struct ConcurrencyPermit {
    _permit: OwnedSemaphorePermit,
}

/// Counting gate gated by the `concurrency` flag.
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    features: Arc<FeatureRegistry>,
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize, features: Arc<FeatureRegistry>) -> Self {
        Self {
            features,
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn try_acquire(&self) -> Admission {
        if !self.features.is_flag_enabled(FeatureFlag::Concurrency) {
            return Admission::Disabled;
        }

        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => Admission::Admitted(ConcurrencyPermit { _permit: permit }),
            Err(TryAcquireError::NoPermits) => Admission::Rejected,
            // The semaphore is never closed.
            Err(TryAcquireError::Closed) => Admission::Rejected,
        }
    }

    /// Free permits right now.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(capacity: usize) -> ConcurrencyLimiter {
        let features = Arc::new(FeatureRegistry::new());
        features.set_flag(FeatureFlag::Concurrency, true);
        ConcurrencyLimiter::new(capacity, features)
    }

    #[test]
    fn test_rejects_when_full() {
        let limiter = enabled(2);
        let a = limiter.try_acquire();
        let b = limiter.try_acquire();
        assert!(matches!(a, Admission::Admitted(_)));
        assert!(matches!(b, Admission::Admitted(_)));
        assert!(matches!(limiter.try_acquire(), Admission::Rejected));
        assert_eq!(limiter.available(), 0);

        drop(a);
        assert_eq!(limiter.available(), 1);
        assert!(matches!(limiter.try_acquire(), Admission::Admitted(_)));
    }

    #[test]
    fn test_disabled_takes_no_permit() {
        let features = Arc::new(FeatureRegistry::new());
        let limiter = ConcurrencyLimiter::new(1, features);
        for _ in 0..10 {
            assert!(matches!(limiter.try_acquire(), Admission::Disabled));
        }
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test]
    async fn test_permit_released_when_task_panics() {
        let limiter = Arc::new(enabled(1));
        let l = limiter.clone();
        let result = tokio::spawn(async move {
            let _permit = l.try_acquire();
            panic!("boom");
        })
        .await;
        assert!(result.is_err());
        assert_eq!(limiter.available(), 1);
    }
}
