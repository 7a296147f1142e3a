//! Per-domain async locks

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes read-modify-write sections on the same domain name.
///
/// Entries nobody holds are pruned on the next `acquire`.
#[derive(Debug, Default)]
pub struct DomainLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DomainLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `domain_name`.
    pub async fn acquire(&self, domain_name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks
                .entry(domain_name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of domains currently locked or waited on.
    pub async fn active(&self) -> usize {
        self.locks
            .lock()
            .await
            .values()
            .filter(|l| Arc::strong_count(l) > 1)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_domain_is_exclusive() {
        let locks = Arc::new(DomainLocks::new());
        let guard = locks.acquire("example.com").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire("example.com").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn different_domains_do_not_block() {
        let locks = DomainLocks::new();
        let _a = locks.acquire("a.com").await;
        let _b = locks.acquire("b.com").await;
        assert_eq!(locks.active().await, 2);
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = DomainLocks::new();
        drop(locks.acquire("a.com").await);
        let _b = locks.acquire("b.com").await;
        assert_eq!(locks.locks.lock().await.len(), 1);
    }
}
