//! Node persistence
//!
//! The document store that loads and saves nodes is external. This module
//! defines the seam the orchestrator talks to and an in-memory store for
//! single-process deployments and tests.

use async_trait::async_trait;
use nodeacl_core::{Node, NodeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};

/// Node store trait for loading and saving nodes with their ACL.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Load a node by id.
    ///
    /// Stores that enforce their own visibility rules return
    /// [`StoreError::Unauthorized`].
    async fn load(&self, id: &NodeId) -> StoreResult<Node>;

    /// Persist a node, replacing the stored copy.
    async fn save(&self, node: &Node) -> StoreResult<()>;
}

/// In-memory node store.
///
/// Saves replace the stored node wholesale, so concurrent load-mutate-save
/// cycles against one node are last-write-wins.
pub struct MemoryNodeStore {
    /// Stored nodes
    nodes: Arc<RwLock<HashMap<NodeId, Node>>>,
    /// Whether saves should fail
    fail_saves: AtomicBool,
    /// Successful saves
    saves: AtomicU64,
}

impl std::fmt::Debug for MemoryNodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryNodeStore")
            .field("saves", &self.saves.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryNodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(RwLock::new(HashMap::new())),
            fail_saves: AtomicBool::new(false),
            saves: AtomicU64::new(0),
        }
    }

    /// Insert a node directly, bypassing the save counter.
    pub async fn insert(&self, node: Node) {
        self.nodes.write().await.insert(node.id.clone(), node);
    }

    /// Get a copy of a stored node.
    pub async fn get(&self, id: &NodeId) -> Option<Node> {
        self.nodes.read().await.get(id).cloned()
    }

    /// Make subsequent saves fail with a backend error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Relaxed);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }
}

impl Default for MemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn load(&self, id: &NodeId) -> StoreResult<Node> {
        self.nodes
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn save(&self, node: &Node) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(StoreError::Backend(format!("write rejected for node {}", node.id)));
        }

        let mut stored = node.clone();
        stored.touch();
        self.nodes.write().await.insert(stored.id.clone(), stored);
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
