//! Node domain model
//!
//! Nodes are storage objects whose lifecycle and content are managed
//! elsewhere. This crate only reads and rewrites their ACL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::acl::PermissionSet;
use crate::identity::Identity;

/// Opaque node identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap a raw node id.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the underlying id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A storage node and its ACL.
///
/// # Examples
///
/// ```
/// use nodeacl_core::{Identity, Node};
///
/// let creator = Identity::new("creator-1");
/// let node = Node::new("node-1", creator.clone());
/// assert!(node.acl.is_owner(&creator));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Node ID
    pub id: NodeId,

    /// The node's access control list
    pub acl: PermissionSet,

    /// When the node was created
    pub created_on: DateTime<Utc>,

    /// When the node was last saved
    pub last_modified: DateTime<Utc>,
}

impl Node {
    /// Creates a node owned by `creator` with empty right sets.
    pub fn new(id: impl Into<String>, creator: Identity) -> Self {
        let now = Utc::now();
        Self {
            id: NodeId::new(id),
            acl: PermissionSet::new(creator),
            created_on: now,
            last_modified: now,
        }
    }

    /// Stamp the node as modified now.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}
