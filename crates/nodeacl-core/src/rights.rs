//! # Rights
//!
//! Defines the rights a permission set grants and the right types that
//! ACL requests may address.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A grantable right held through set membership.
///
/// - **Read**: View node content and its ACL
/// - **Write**: Modify node content and add ACL entries
/// - **Delete**: Remove the node and remove ACL entries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Right {
    /// Read access.
    Read,
    /// Write access.
    Write,
    /// Delete access.
    Delete,
}

impl Right {
    /// Get the string representation of the right.
    pub fn as_str(&self) -> &'static str {
        match self {
            Right::Read => "read",
            Right::Write => "write",
            Right::Delete => "delete",
        }
    }

    /// Parse a right from its exact lowercase name.
    ///
    /// # Example
    ///
    /// ```
    /// use nodeacl_core::Right;
    ///
    /// assert_eq!(Right::parse("write"), Some(Right::Write));
    /// assert_eq!(Right::parse("owner"), None);
    /// assert_eq!(Right::parse("all"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Right::Read),
            "write" => Some(Right::Write),
            "delete" => Some(Right::Delete),
            _ => None,
        }
    }

    /// Get all rights, in read, write, delete order.
    pub fn all() -> [Right; 3] {
        [Right::Read, Right::Write, Right::Delete]
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right types addressable through the single-type ACL endpoint.
///
/// `Owner` is not a membership set: it names the exclusive owner slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RightType {
    /// The read membership set.
    Read,
    /// The write membership set.
    Write,
    /// The delete membership set.
    Delete,
    /// The owner slot.
    Owner,
}

impl RightType {
    /// Get the string representation of the right type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RightType::Read => "read",
            RightType::Write => "write",
            RightType::Delete => "delete",
            RightType::Owner => "owner",
        }
    }

    /// Parse a right type from a path segment.
    ///
    /// Only the four exact names are accepted; `all` is a bulk-only key.
    ///
    /// # Example
    ///
    /// ```
    /// use nodeacl_core::RightType;
    ///
    /// assert_eq!(RightType::parse("owner"), Some(RightType::Owner));
    /// assert_eq!(RightType::parse("all"), None);
    /// assert_eq!(RightType::parse("Read"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(RightType::Read),
            "write" => Some(RightType::Write),
            "delete" => Some(RightType::Delete),
            "owner" => Some(RightType::Owner),
            _ => None,
        }
    }

    /// The membership right this type names, or `None` for `Owner`.
    pub fn as_right(&self) -> Option<Right> {
        match self {
            RightType::Read => Some(Right::Read),
            RightType::Write => Some(Right::Write),
            RightType::Delete => Some(Right::Delete),
            RightType::Owner => None,
        }
    }
}

impl From<Right> for RightType {
    fn from(right: Right) -> Self {
        match right {
            Right::Read => RightType::Read,
            Right::Write => RightType::Write,
            Right::Delete => RightType::Delete,
        }
    }
}

impl fmt::Display for RightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking an identity against a permission set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rights {
    /// Read granted.
    pub read: bool,
    /// Write granted.
    pub write: bool,
    /// Delete granted.
    pub delete: bool,
}

impl Rights {
    /// Every right granted.
    pub fn full() -> Self {
        Self {
            read: true,
            write: true,
            delete: true,
        }
    }

    /// Whether a specific right is granted.
    pub fn has(&self, right: Right) -> bool {
        match right {
            Right::Read => self.read,
            Right::Write => self.write,
            Right::Delete => self.delete,
        }
    }
}
