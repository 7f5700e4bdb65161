//! Anonymous access defaults
//!
//! Process-wide policy for callers without a credential. The values are
//! never stored inside an ACL. Only `read` takes part in ACL decisions
//! (node visibility); `write` and `delete` are carried for the node content
//! endpoints that share this configuration.

use serde::{Deserialize, Serialize};

/// Rights granted to anonymous callers on nodes that do not restrict them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnonymousAccess {
    /// Anonymous read of unrestricted nodes.
    pub read: bool,
    /// Anonymous write of unrestricted nodes.
    pub write: bool,
    /// Anonymous delete of unrestricted nodes.
    pub delete: bool,
}

impl Default for AnonymousAccess {
    fn default() -> Self {
        Self {
            read: true,
            write: true,
            delete: true,
        }
    }
}

impl AnonymousAccess {
    /// No anonymous access at all.
    pub fn none() -> Self {
        Self {
            read: false,
            write: false,
            delete: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_open() {
        assert_eq!(
            AnonymousAccess::default(),
            AnonymousAccess {
                read: true,
                write: true,
                delete: true
            }
        );
    }

    #[test]
    fn test_none_grants_nothing() {
        let access = AnonymousAccess::none();
        assert!(!access.read && !access.write && !access.delete);
    }
}
