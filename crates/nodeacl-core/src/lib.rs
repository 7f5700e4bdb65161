//! # Node ACL Core
//!
//! This crate provides the access control list (ACL) value types attached to
//! shared storage nodes, and the pure decision and mutation operations on them.
//!
//! ## Overview
//!
//! The nodeacl-core crate handles:
//! - **Identities**: Opaque principal references, including the `anonymous` sentinel
//! - **Rights**: The grantable rights (read, write, delete) and the right types
//!   addressable on the single-type endpoint (read, write, delete, owner)
//! - **Permission Sets**: An exclusive owner plus three membership sets
//! - **Nodes**: Storage objects that own exactly one permission set
//! - **Anonymous Access**: Global defaults used for node-level visibility
//!
//! ## Architecture
//!
//! ```text
//! Node
//!   └─ PermissionSet
//!        ├─ owner   (implicitly holds every right)
//!        ├─ read    {Identity}
//!        ├─ write   {Identity}
//!        └─ delete  {Identity}
//! ```
//!
//! The `all` pseudo right-type never persists; it is a request-time macro
//! expanded by the service layer into read, write and delete.
//!
//! ## Usage
//!
//! ```rust
//! use nodeacl_core::{Identity, PermissionSet, Right};
//!
//! let owner = Identity::new("a5b3c1d2-0000-4000-8000-000000000001");
//! let reader = Identity::new("a5b3c1d2-0000-4000-8000-000000000002");
//!
//! let mut acl = PermissionSet::new(owner.clone());
//! acl.set(&reader, [Right::Read]);
//!
//! assert!(acl.check(&reader).read);
//! assert!(!acl.check(&reader).write);
//! assert!(acl.check(&owner).delete);
//! ```

pub mod access;
pub mod acl;
pub mod identity;
pub mod node;
pub mod rights;

// Re-export main types for convenience
pub use access::AnonymousAccess;
pub use acl::PermissionSet;
pub use identity::Identity;
pub use node::{Node, NodeId};
pub use rights::{Right, RightType, Rights};
