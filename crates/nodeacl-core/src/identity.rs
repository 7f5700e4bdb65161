//! Principal identities
//!
//! An identity is an opaque string token naming a principal. Two identities
//! are equal only when their bytes are identical.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical principal reference.
///
/// Identities are produced either verbatim from an opaque identifier or by
/// resolving an email address through an identity directory. The literal
/// `anonymous` identity stands for an unauthenticated caller.
///
/// # Example
///
/// ```
/// use nodeacl_core::Identity;
///
/// let id = Identity::new("b0a1c2d3-e4f5-4a6b-8c7d-9e0f1a2b3c4d");
/// assert_eq!(id.as_str(), "b0a1c2d3-e4f5-4a6b-8c7d-9e0f1a2b3c4d");
/// assert!(!id.is_anonymous());
/// assert!(Identity::anonymous().is_anonymous());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Token used for callers that supplied no credential.
    pub const ANONYMOUS: &'static str = "anonymous";

    /// Wrap a raw token as an identity.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The anonymous sentinel identity.
    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    /// Whether this is the anonymous sentinel.
    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }

    /// Borrow the underlying token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identity, returning the token.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}
