//! Per-key lock registry.
//!
//! Operations on one key hold that key's mutex plus a shared hold on a
//! store-wide gate. Store-wide operations take the gate exclusively, which
//! waits for in-flight per-key work and holds back new work until they are
//! done. The gate is FIFO, so work queued after a store-wide operation runs
//! after it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
pub struct KeyLocks {
    gate: RwLock<()>,
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Held for the duration of a single-key operation.
///
/// Dropping the guard releases the key and forgets its mutex when no other
/// task holds or waits on it.
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    held: Option<OwnedMutexGuard<()>>,
    _gate: RwLockReadGuard<'a, ()>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.held.take());
        let mut registry = self.locks.registry();
        // Clones are only taken under the registry mutex, so a count of one
        // means the registry is the last owner.
        if registry
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            registry.remove(&self.key);
        }
    }
}

/// Held for the duration of a store-wide operation.
pub struct StoreGuard<'a> {
    _gate: RwLockWriteGuard<'a, ()>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let gate = self.gate.read().await;
        let key_lock = self.entry(key);
        let held = key_lock.lock_owned().await;
        KeyGuard {
            locks: self,
            key: key.to_string(),
            held: Some(held),
            _gate: gate,
        }
    }

    /// Waits until no key is locked and blocks new key locks while held.
    ///
    /// Also drops mutexes left behind by cancelled waiters.
    pub async fn lock_all(&self) -> StoreGuard<'_> {
        let gate = self.gate.write().await;
        self.registry().retain(|_, lock| Arc::strong_count(lock) > 1);
        StoreGuard { _gate: gate }
    }

    /// Number of keys with a registered mutex.
    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.registry().len()
    }

    fn entry(&self, key: &str) -> Arc<Mutex<()>> {
        let mut registry = self.registry();
        if let Some(lock) = registry.get(key) {
            return Arc::clone(lock);
        }
        let lock = Arc::new(Mutex::new(()));
        registry.insert(key.to_string(), Arc::clone(&lock));
        lock
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = KeyLocks::new();
        let _held = locks.lock("a").await;

        let second = timeout(Duration::from_millis(50), locks.lock("a")).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyLocks::new();
        let _a = locks.lock("a").await;

        let b = timeout(Duration::from_millis(50), locks.lock("b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_lock_all_waits_for_key_holders() {
        let locks = KeyLocks::new();
        let held = locks.lock("a").await;

        assert!(
            timeout(Duration::from_millis(50), locks.lock_all())
                .await
                .is_err()
        );

        drop(held);
        assert!(
            timeout(Duration::from_millis(50), locks.lock_all())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_released_keys_are_forgotten() {
        let locks = KeyLocks::new();
        for i in 0..1000 {
            drop(locks.lock(&format!("key-{i}")).await);
        }
        assert_eq!(locks.tracked_keys(), 0);
    }

    #[tokio::test]
    async fn test_waited_on_key_stays_registered() {
        let locks = Arc::new(KeyLocks::new());
        let held = locks.lock("a").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock("a").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(held);
        assert_eq!(locks.tracked_keys(), 1);
        waiter.await.unwrap();
        assert_eq!(locks.tracked_keys(), 0);
    }

    #[tokio::test]
    async fn test_lock_all_prunes_cancelled_waiters() {
        let locks = KeyLocks::new();
        let held = locks.lock("a").await;

        let mut waiter = Box::pin(locks.lock("a"));
        assert!(timeout(Duration::from_millis(20), &mut waiter).await.is_err());
        drop(held);
        drop(waiter);
        assert_eq!(locks.tracked_keys(), 1);

        drop(locks.lock_all().await);
        assert_eq!(locks.tracked_keys(), 0);
    }
}
