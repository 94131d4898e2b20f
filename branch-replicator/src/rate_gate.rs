//! Admission control for outbound API requests.
//!
//! Every request made against the Bitbucket API passes through a single
//! [`RateGate`]. The gate hands out a fixed number of permits; callers that
//! find the pool exhausted are suspended until a permit is returned.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

/// Counting gate bounding the number of concurrent outbound requests.
///
/// Cloning is cheap and every clone shares the same permit pool.
#[derive(Debug, Clone)]
pub struct RateGate {
    permits: Arc<Semaphore>,
    limit: usize,
}

/// A held admission. The permit returns to the gate when this is dropped,
/// including when the holder bails out early with an error.
#[derive(Debug)]
#[must_use = "the permit is released as soon as it is dropped"]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

/// Returned when the gate has been closed and no longer admits callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rate gate is closed")]
pub struct GateClosed;

impl RateGate {
    /// Creates a gate admitting at most `limit` concurrent holders.
    ///
    /// A `limit` of zero is raised to one so the gate can always make progress.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Waits until fewer than `limit` permits are outstanding, then takes one.
    ///
    /// Waiters are admitted in FIFO order.
    ///
    /// # Errors
    ///
    /// Returns [`GateClosed`] if [`RateGate::close`] was called.
    pub async fn acquire(&self) -> Result<GatePermit, GateClosed> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| GateClosed)?;
        trace!(available = self.available(), "Permit acquired");
        Ok(GatePermit { _permit: permit })
    }

    /// Returns the maximum number of concurrent holders.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of permits currently free.
    #[must_use]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Stops admitting new callers. Pending and future `acquire` calls fail.
    pub fn close(&self) {
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn permit_is_returned_on_drop() {
        let gate = RateGate::new(2);
        let first = gate.acquire().await.unwrap();
        assert_eq!(gate.available(), 1);
        drop(first);
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test]
    async fn zero_limit_still_admits_one() {
        let gate = RateGate::new(0);
        assert_eq!(gate.limit(), 1);
        let _permit = gate.acquire().await.unwrap();
        assert_eq!(gate.available(), 0);
    }

    #[tokio::test]
    async fn closed_gate_rejects_acquire() {
        let gate = RateGate::new(1);
        gate.close();
        assert_eq!(gate.acquire().await.unwrap_err(), GateClosed);
    }

    #[tokio::test]
    async fn permit_is_released_on_error_path() {
        async fn failing(gate: &RateGate) -> Result<(), &'static str> {
            let _permit = gate.acquire().await.map_err(|_| "closed")?;
            Err("request failed")
        }

        let gate = RateGate::new(1);
        assert!(failing(&gate).await.is_err());
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_admits_more_than_limit() {
        const LIMIT: usize = 3;
        const TASKS: usize = 40;

        let gate = RateGate::new(LIMIT);
        let active = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..TASKS)
            .map(|_| {
                let gate = gate.clone();
                let active = Arc::clone(&active);
                let high_water = Arc::clone(&high_water);
                let completed = Arc::clone(&completed);
                tokio::spawn(async move {
                    let _permit = gate.acquire().await.unwrap();
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    high_water.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    completed.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert!(high_water.load(Ordering::SeqCst) <= LIMIT);
        assert_eq!(completed.load(Ordering::SeqCst), TASKS);
        assert_eq!(gate.available(), LIMIT);
    }
}
