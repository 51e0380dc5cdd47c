//! Per-anchor serialization.

use anchorwatch_canonical::HardwareId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OwnedMutexGuard;

#[derive(Debug, Default)]
struct Slot {
    lock: Arc<tokio::sync::Mutex<()>>,
    users: usize,
}

type Table = Mutex<HashMap<HardwareId, Slot>>;

/// Keyed async locks, one per hardware id in use.
///
/// Entries exist only while some task holds or waits for them, so the table
/// does not grow with the number of anchors ever seen.
#[derive(Debug, Default, Clone)]
pub struct AnchorLocks {
    table: Arc<Table>,
}

fn lock_table(table: &Table) -> MutexGuard<'_, HashMap<HardwareId, Slot>> {
    // The map is never left half-updated, so a poisoned lock is still usable.
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AnchorLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `hardware_id`.
    pub async fn acquire(&self, hardware_id: &HardwareId) -> AnchorGuard {
        let lock = {
            let mut table = lock_table(&self.table);
            let slot = table.entry(hardware_id.clone()).or_default();
            slot.users += 1;
            Arc::clone(&slot.lock)
        };

        // Built before awaiting so a cancelled wait still gives up its slot.
        let mut guard = AnchorGuard {
            table: Arc::clone(&self.table),
            key: hardware_id.clone(),
            held: None,
        };
        guard.held = Some(lock.lock_owned().await);
        guard
    }

    /// Number of hardware ids currently locked or awaited.
    pub fn len(&self) -> usize {
        lock_table(&self.table).len()
    }

    /// Whether no hardware id is locked or awaited.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one hardware id; released on drop.
#[derive(Debug)]
pub struct AnchorGuard {
    table: Arc<Table>,
    key: HardwareId,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for AnchorGuard {
    fn drop(&mut self) {
        drop(self.held.take());
        let mut table = lock_table(&self.table);
        if let Some(slot) = table.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                table.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn hid(s: &str) -> HardwareId {
        HardwareId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn entries_are_removed_after_last_release() {
        let locks = AnchorLocks::new();
        {
            let _a = locks.acquire(&hid("A")).await;
            let _b = locks.acquire(&hid("B")).await;
            assert_eq!(locks.len(), 2);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn same_id_is_exclusive() {
        let locks = AnchorLocks::new();
        let first = locks.acquire(&hid("A")).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&hid("A")).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());
        assert_eq!(locks.len(), 1);

        drop(first);
        contender.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn cancelled_wait_releases_entry() {
        let locks = AnchorLocks::new();
        let held = locks.acquire(&hid("A")).await;

        let waiting = tokio::time::timeout(Duration::from_millis(20), locks.acquire(&hid("A"))).await;
        assert!(waiting.is_err());

        drop(held);
        assert!(locks.is_empty());
    }
}
