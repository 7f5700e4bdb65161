//! # Permission Sets
//!
//! The ACL attached to every node: an exclusive owner plus three
//! membership sets. All operations here are pure and infallible; request
//! validation happens upstream in the service layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::access::AnonymousAccess;
use crate::identity::Identity;
use crate::rights::{Right, Rights};

/// Access control list of a single node.
///
/// The owner implicitly holds every right and is checked independently of
/// the membership sets; it need not appear in any of them. Membership uses
/// set semantics, so an identity appears at most once per right.
///
/// # Example
///
/// ```
/// use nodeacl_core::{Identity, PermissionSet, Right};
///
/// let owner = Identity::new("owner-1");
/// let writer = Identity::new("writer-1");
///
/// let mut acl = PermissionSet::new(owner.clone());
/// acl.set(&writer, [Right::Write]);
/// acl.set(&writer, [Right::Write]);
///
/// assert_eq!(acl.members(Right::Write).len(), 1);
/// assert!(acl.check(&owner).read);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionSet {
    /// The exclusive owner.
    owner: Identity,
    /// Identities granted read.
    #[serde(default)]
    read: BTreeSet<Identity>,
    /// Identities granted write.
    #[serde(default)]
    write: BTreeSet<Identity>,
    /// Identities granted delete.
    #[serde(default)]
    delete: BTreeSet<Identity>,
}

impl PermissionSet {
    /// Create the ACL of a freshly created node: the creator as owner and
    /// empty membership sets.
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            read: BTreeSet::new(),
            write: BTreeSet::new(),
            delete: BTreeSet::new(),
        }
    }

    /// The current owner.
    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    /// Whether `identity` is the owner.
    pub fn is_owner(&self, identity: &Identity) -> bool {
        &self.owner == identity
    }

    /// The membership set for a right.
    pub fn members(&self, right: Right) -> &BTreeSet<Identity> {
        match right {
            Right::Read => &self.read,
            Right::Write => &self.write,
            Right::Delete => &self.delete,
        }
    }

    fn members_mut(&mut self, right: Right) -> &mut BTreeSet<Identity> {
        match right {
            Right::Read => &mut self.read,
            Right::Write => &mut self.write,
            Right::Delete => &mut self.delete,
        }
    }

    /// Compute the rights held by `identity`.
    ///
    /// A right is granted iff `identity` is the owner or a member of that
    /// right's set. This is the only authorization primitive.
    pub fn check(&self, identity: &Identity) -> Rights {
        if self.is_owner(identity) {
            return Rights::full();
        }

        Rights {
            read: self.read.contains(identity),
            write: self.write.contains(identity),
            delete: self.delete.contains(identity),
        }
    }

    /// Grant `identity` each of `rights`. Already-present memberships are
    /// left as they are.
    pub fn set<I>(&mut self, identity: &Identity, rights: I)
    where
        I: IntoIterator<Item = Right>,
    {
        for right in rights {
            let members = self.members_mut(right);
            if !members.contains(identity) {
                members.insert(identity.clone());
            }
        }
    }

    /// Revoke each of `rights` from `identity`. Absent memberships are a no-op.
    pub fn unset<I>(&mut self, identity: &Identity, rights: I)
    where
        I: IntoIterator<Item = Right>,
    {
        for right in rights {
            self.members_mut(right).remove(identity);
        }
    }

    /// Replace the owner unconditionally. The new owner is not added to
    /// any membership set.
    pub fn set_owner(&mut self, identity: Identity) {
        self.owner = identity;
    }

    /// Node-level read visibility.
    ///
    /// Visible to the owner and read members. A node whose read set is
    /// empty is public when anonymous read is enabled.
    pub fn is_visible_to(&self, identity: &Identity, anonymous: &AnonymousAccess) -> bool {
        self.check(identity).read || (self.read.is_empty() && anonymous.read)
    }
}
