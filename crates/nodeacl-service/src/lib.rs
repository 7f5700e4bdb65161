//! # Node ACL Service
//!
//! This crate decides and applies access control list (ACL) requests
//! against shared storage nodes.
//!
//! ## Overview
//!
//! The nodeacl-service crate handles:
//! - **Identity Resolution**: Email addresses resolved (or provisioned) through
//!   an identity directory, opaque identifiers validated and used verbatim
//! - **Request Parsing**: Target identities per right from query or form fields,
//!   including expansion of the `all` pseudo right-type
//! - **Orchestration**: Authentication, node loading, rights evaluation,
//!   mutation, persistence and the read view, for the bulk and single-type
//!   endpoints
//! - **Collaborators**: The `NodeStore` and `IdentityDirectory` seams, with
//!   in-memory implementations
//!
//! ## Request Flow
//!
//! ```text
//! AclRequest ─→ AclService
//!                 ├─ authenticate          (NoAuth for anonymous callers)
//!                 ├─ NodeStore::load       (NotFound / Unauthorized / Internal)
//!                 ├─ PermissionSet::check
//!                 ├─ RequestParser         (IdentityResolver → IdentityDirectory)
//!                 ├─ set / unset / set_owner
//!                 ├─ NodeStore::save
//!                 └─ AclView ─→ ResponseEnvelope
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nodeacl_core::{Identity, Node, NodeId};
//! use nodeacl_service::{AclConfig, AclService, MemoryDirectory, MemoryNodeStore, ResponseEnvelope};
//! use nodeacl_service::request::{AclMethod, AclRequestContext, RequestFields};
//! use std::sync::Arc;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryNodeStore::new());
//!     let owner = Identity::new("0190f5a2-0000-7000-8000-000000000001");
//!     store.insert(Node::new("node-1", owner.clone())).await;
//!
//!     let service = AclService::new(store, Arc::new(MemoryDirectory::new()), AclConfig::from_env()?);
//!
//!     let request = AclRequestContext::authenticated(owner, AclMethod::Add)
//!         .with_fields(RequestFields::new().with_query("all", "ann@example.com"));
//!     let result = service.handle_bulk(&NodeId::new("node-1"), &request).await;
//!
//!     let envelope = ResponseEnvelope::from_result(&result);
//!     println!("{}", serde_json::to_string(&envelope)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Every request loads, mutates and saves its own copy of the ACL. Two
//! concurrent mutations of one node are last-write-wins unless
//! `AclConfig::serialize_mutations` is set, in which case they are
//! serialized per node id.

pub mod config;
pub mod directory;
pub mod error;
pub mod locks;
pub mod orchestrator;
pub mod parser;
pub mod request;
pub mod resolver;
pub mod response;
pub mod store;

// Re-export main types
pub use config::{AclConfig, ConfigError, IdentifierPolicy};
pub use directory::{IdentityDirectory, MemoryDirectory};
pub use error::{
    AclError, AclResult, DirectoryError, DirectoryResult, ErrorKind, IdentityError, StoreError,
    StoreResult,
};
pub use orchestrator::AclService;
pub use parser::{BulkTargets, RequestParser};
pub use request::{AclMethod, AclRequest, AclRequestContext, Authentication, RequestFields};
pub use resolver::IdentityResolver;
pub use response::{AclDocument, AclView, ResponseEnvelope, SingleRightView};
pub use store::{MemoryNodeStore, NodeStore};
