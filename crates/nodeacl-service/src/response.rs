//! ACL read models and the response envelope.

use nodeacl_core::{Identity, PermissionSet, Right, RightType};
use serde::{Deserialize, Serialize};

use crate::error::AclError;

/// Full ACL as returned by the bulk endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AclDocument {
    /// Owner identity
    pub owner: Identity,
    /// Read members, sorted
    pub read: Vec<Identity>,
    /// Write members, sorted
    pub write: Vec<Identity>,
    /// Delete members, sorted
    pub delete: Vec<Identity>,
}

impl From<&PermissionSet> for AclDocument {
    fn from(acl: &PermissionSet) -> Self {
        let list = |right: Right| -> Vec<Identity> { acl.members(right).iter().cloned().collect() };
        Self {
            owner: acl.owner().clone(),
            read: list(Right::Read),
            write: list(Right::Write),
            delete: list(Right::Delete),
        }
    }
}

/// One right type as returned by the single-type endpoint.
///
/// Serializes as `{"<type>": [...]}` for membership types and
/// `{"owner": "..."}` for the owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SingleRightView {
    /// Read members
    Read(Vec<Identity>),
    /// Write members
    Write(Vec<Identity>),
    /// Delete members
    Delete(Vec<Identity>),
    /// Owner
    Owner(Identity),
}

impl SingleRightView {
    /// Project `acl` onto `right_type`.
    pub fn project(acl: &PermissionSet, right_type: RightType) -> Self {
        let list = |right: Right| -> Vec<Identity> { acl.members(right).iter().cloned().collect() };
        match right_type {
            RightType::Read => SingleRightView::Read(list(Right::Read)),
            RightType::Write => SingleRightView::Write(list(Right::Write)),
            RightType::Delete => SingleRightView::Delete(list(Right::Delete)),
            RightType::Owner => SingleRightView::Owner(acl.owner().clone()),
        }
    }
}

/// Read view produced by a successful ACL request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AclView {
    /// Bulk endpoint view.
    Full(AclDocument),
    /// Single-type endpoint view.
    Single(SingleRightView),
}

/// JSON envelope wrapping every reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope {
    /// HTTP-class status
    pub status: u16,
    /// Read view on success
    pub data: Option<serde_json::Value>,
    /// Client-safe error messages on failure
    pub error: Option<Vec<String>>,
}

impl ResponseEnvelope {
    /// Envelope for a successful request.
    pub fn ok(view: &AclView) -> Self {
        Self::with_data(view)
    }

    /// Envelope carrying `data`. Data that fails to serialize produces an
    /// internal error envelope rather than an empty success.
    pub fn with_data<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                status: 200,
                data: Some(value),
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response data");
                Self::from_error(&AclError::Internal(e.to_string()))
            }
        }
    }

    /// Envelope for a failed request. Internal detail is not included.
    pub fn from_error(err: &AclError) -> Self {
        Self {
            status: err.status_code(),
            data: None,
            error: Some(vec![err.client_message()]),
        }
    }

    /// Envelope for either outcome.
    pub fn from_result(result: &Result<AclView, AclError>) -> Self {
        match result {
            Ok(view) => Self::ok(view),
            Err(err) => Self::from_error(err),
        }
    }
}
