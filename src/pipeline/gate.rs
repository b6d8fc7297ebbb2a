use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds how many workers run at once.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A held admission slot, given back when dropped.
#[derive(Debug)]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> AdmissionGate {
        let capacity = capacity.max(1);
        AdmissionGate {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits until fewer than `capacity` slots are held, then takes one.
    pub async fn acquire(&self) -> Result<Slot> {
        let permit = self.semaphore.clone().acquire_owned().await.context("admission gate closed")?;
        Ok(Slot { _permit: permit })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn in_use(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }
}

impl Slot {
    #[inline]
    pub fn release(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn blocks_when_saturated() {
        let gate = AdmissionGate::new(2);
        let first = gate.acquire().await.unwrap();
        let _second = gate.acquire().await.unwrap();
        assert_eq!(gate.in_use(), 2);

        assert!(timeout(Duration::from_millis(20), gate.acquire()).await.is_err());

        first.release();
        assert_eq!(gate.in_use(), 1);
        let third = timeout(Duration::from_millis(20), gate.acquire()).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn waiter_wakes_on_release() {
        let gate = AdmissionGate::new(1);
        let held = gate.acquire().await.unwrap();

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.acquire().await.map(|_| ()) })
        };
        tokio::task::yield_now().await;

        drop(held);
        waiter.await.unwrap().unwrap();
        assert_eq!(gate.in_use(), 0);
    }

    #[test]
    fn zero_capacity_is_raised() {
        assert_eq!(AdmissionGate::new(0).capacity(), 1);
    }
}
