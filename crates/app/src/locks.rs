//! Slot Locks
//!
//! Serialises reservation attempts on the same slot within this process before the
//! database row lock is taken. Attempts on different slots never contend.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use thiserror::Error;
use tokio::{
    sync::{Mutex, OwnedMutexGuard},
    time::timeout,
};

use crate::domain::slots::records::SlotUuid;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("timed out after {waited:?} waiting for slot {slot}")]
pub struct LockTimeout {
    pub slot: SlotUuid,
    pub waited: Duration,
}

type Registry = Arc<DashMap<SlotUuid, Arc<Mutex<()>>>>;

/// Registry of per-slot async mutexes with a bounded wait.
///
/// A slot's entry lives only while someone holds or waits on it.
#[derive(Debug, Clone)]
pub struct SlotLocks {
    locks: Registry,
    max_wait: Duration,
}

/// Held for the duration of a read-check-write on one slot; released on drop.
#[derive(Debug)]
pub struct SlotLockGuard {
    slot: SlotUuid,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Registry,
}

impl SlotLockGuard {
    pub fn slot(&self) -> SlotUuid {
        self.slot
    }
}

impl Drop for SlotLockGuard {
    fn drop(&mut self) {
        // Unlock before pruning so our own guard no longer counts as a user.
        drop(self.guard.take());

        prune(&self.locks, self.slot);
    }
}

/// Forget `slot` once the registry holds the only reference to its mutex.
fn prune(locks: &Registry, slot: SlotUuid) {
    locks.remove_if(&slot, |_, lock| Arc::strong_count(lock) == 1);
}

impl SlotLocks {
    #[must_use]
    pub fn new(max_wait: Duration) -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
            max_wait,
        }
    }

    /// Wait up to the configured bound for exclusive access to `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`LockTimeout`] if another holder keeps the slot for longer than the bound.
    pub async fn acquire(&self, slot: SlotUuid) -> Result<SlotLockGuard, LockTimeout> {
        // Clone out of the map so the shard lock is not held across the await.
        let lock = Arc::clone(self.locks.entry(slot).or_default().value());

        let acquired = timeout(self.max_wait, lock.lock_owned()).await;

        match acquired {
            Ok(guard) => Ok(SlotLockGuard {
                slot,
                guard: Some(guard),
                locks: Arc::clone(&self.locks),
            }),
            Err(_elapsed) => {
                prune(&self.locks, slot);

                Err(LockTimeout {
                    slot,
                    waited: self.max_wait,
                })
            }
        }
    }
}
