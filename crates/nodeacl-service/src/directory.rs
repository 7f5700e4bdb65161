//! Identity directory
//!
//! The directory maps email addresses to canonical identities, creating an
//! entry for an address it has not seen before. Its storage is external; an
//! in-memory implementation is provided for single-process use and tests.

use async_trait::async_trait;
use nodeacl_core::Identity;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{DirectoryError, DirectoryResult};

/// Directory trait for email lookup and provisioning.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Look up the identity registered for `email`, provisioning a new
    /// entry if none exists.
    async fn lookup_or_provision(&self, email: &str) -> DirectoryResult<Identity>;
}

/// In-memory identity directory.
///
/// New entries receive a UUID v7 identity. The directory can be taken
/// offline to simulate an unreachable backend.
pub struct MemoryDirectory {
    /// Email to identity entries
    entries: Arc<RwLock<HashMap<String, Identity>>>,
    /// Whether lookups should fail as unreachable
    offline: AtomicBool,
}

impl std::fmt::Debug for MemoryDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDirectory")
            .field("offline", &self.offline.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            offline: AtomicBool::new(false),
        }
    }

    /// Register a known email with a fixed identity.
    pub async fn insert(&self, email: impl Into<String>, identity: Identity) {
        self.entries.write().await.insert(email.into(), identity);
    }

    /// Get the identity registered for `email` without provisioning.
    pub async fn get(&self, email: &str) -> Option<Identity> {
        self.entries.read().await.get(email).cloned()
    }

    /// Number of registered entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Simulate the directory becoming unreachable (or reachable again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityDirectory for MemoryDirectory {
    async fn lookup_or_provision(&self, email: &str) -> DirectoryResult<Identity> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(DirectoryError::Unavailable("directory is offline".to_string()));
        }

        if let Some(identity) = self.entries.read().await.get(email) {
            return Ok(identity.clone());
        }

        let mut entries = self.entries.write().await;
        // Another task may have provisioned the address between the locks.
        let identity = entries
            .entry(email.to_string())
            .or_insert_with(|| Identity::new(Uuid::now_v7().to_string()))
            .clone();

        tracing::debug!(email = %email, identity = %identity, "Provisioned directory entry");
        Ok(identity)
    }
}
