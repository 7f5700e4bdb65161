//! Per-node mutation locks
//!
//! Serializes load-mutate-save cycles against the same node when the
//! service is configured to do so. Without them concurrent mutations are
//! last-write-wins.
//!
//! An entry lives only while some request holds or waits on it; the last
//! [`NodeLockGuard`] to drop removes it from the table.

use nodeacl_core::NodeId;
use parking_lot::Mutex as TableMutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Table = Arc<TableMutex<HashMap<NodeId, Arc<Mutex<()>>>>>;

/// Async mutexes keyed by node id.
#[derive(Debug, Default)]
pub struct NodeLocks {
    table: Table,
}

/// Exclusive hold on one node. Dropping it releases the node and, if no
/// other request references the entry, removes it from the table.
#[derive(Debug)]
pub struct NodeLockGuard {
    id: NodeId,
    table: Table,
    guard: Option<OwnedMutexGuard<()>>,
}

impl NodeLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `id`, waiting for any holder to release it.
    pub async fn acquire(&self, id: &NodeId) -> NodeLockGuard {
        let lock = self
            .table
            .lock()
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        NodeLockGuard {
            id: id.clone(),
            table: self.table.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of tracked nodes.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Whether no node is currently tracked.
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}

impl Drop for NodeLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Clones are only taken under the table lock, so a count of one
        // means nobody holds or waits on this entry.
        let mut table = self.table.lock();
        if table.get(&self.id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            table.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_node_is_exclusive() {
        let locks = Arc::new(NodeLocks::new());
        let id = NodeId::new("n1");

        let guard = locks.acquire(&id).await;

        let contender = {
            let locks = locks.clone();
            let id = id.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_nodes_do_not_block() {
        let locks = NodeLocks::new();
        let _a = locks.acquire(&NodeId::new("a")).await;
        let _b = locks.acquire(&NodeId::new("b")).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_released_entries_are_removed() {
        let locks = NodeLocks::new();
        let held = locks.acquire(&NodeId::new("held")).await;
        drop(locks.acquire(&NodeId::new("idle")).await);
        assert_eq!(locks.len(), 1);

        drop(held);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_entry_survives_while_contended() {
        let locks = Arc::new(NodeLocks::new());
        let id = NodeId::new("n1");
        let first = locks.acquire(&id).await;

        let waiter = {
            let locks = locks.clone();
            let id = id.clone();
            tokio::spawn(async move { locks.acquire(&id).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        assert_eq!(locks.len(), 1);

        let second = waiter.await.unwrap();
        assert_eq!(locks.len(), 1);
        drop(second);
        assert!(locks.is_empty());
    }
}
