//! Per-aggregate mutual exclusion for the load, mutate, append cycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use common::AggregateId;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = HashMap<AggregateId, Arc<Mutex<()>>>;

/// Keyed in-process lock.
///
/// Lazily creates one mutex per aggregate ID and hands out the same mutex for
/// repeated lookups, so writers to one aggregate are serialized while writers
/// to different aggregates proceed in parallel. Clones share the same locks.
///
/// An entry lives only while a guard holds it or a task waits for it: the
/// last guard to be dropped removes it, whether the write succeeded or not.
#[derive(Clone, Default)]
pub struct AggregateLocks {
    // Only held for map lookups, never across an await.
    locks: Arc<StdMutex<LockMap>>,
}

impl AggregateLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the lock for `aggregate_id` is free and takes it.
    ///
    /// The lock is released when the returned guard is dropped.
    pub async fn acquire(&self, aggregate_id: &AggregateId) -> AggregateGuard {
        let lock = {
            let mut locks = lock_map(&self.locks);
            Arc::clone(locks.entry(aggregate_id.clone()).or_default())
        };

        AggregateGuard {
            guard: Some(lock.lock_owned().await),
            locks: Arc::clone(&self.locks),
            aggregate_id: aggregate_id.clone(),
        }
    }

    /// Number of aggregate IDs with a mutex allocated.
    pub fn len(&self) -> usize {
        lock_map(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_map(locks: &StdMutex<LockMap>) -> MutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the lock of one aggregate.
pub struct AggregateGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<StdMutex<LockMap>>,
    aggregate_id: AggregateId,
}

impl Drop for AggregateGuard {
    fn drop(&mut self) {
        // Release first so the map's reference is the only one left when idle
        drop(self.guard.take());

        let mut locks = lock_map(&self.locks);
        if locks
            .get(&self.aggregate_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.aggregate_id);
        }
    }
}
