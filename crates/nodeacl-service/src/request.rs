//! Request context
//!
//! Transport-neutral view of an inbound ACL request: who is calling, what
//! they want to do, and the query and form fields they supplied. Any HTTP
//! framework can implement [`AclRequest`]; [`AclRequestContext`] is a plain
//! owned implementation.

use nodeacl_core::Identity;
use std::collections::HashMap;

use crate::error::{AclError, AclResult};

/// Operation requested against an ACL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclMethod {
    /// View the ACL.
    Read,
    /// Add identities to a right, or transfer ownership.
    Add,
    /// Remove identities from a right.
    Remove,
}

impl AclMethod {
    /// Map an HTTP method onto an ACL operation.
    ///
    /// # Example
    ///
    /// ```
    /// use nodeacl_service::request::AclMethod;
    ///
    /// assert_eq!(AclMethod::from_http_method("GET").unwrap(), AclMethod::Read);
    /// assert_eq!(AclMethod::from_http_method("put").unwrap(), AclMethod::Add);
    /// assert!(AclMethod::from_http_method("PATCH").is_err());
    /// ```
    pub fn from_http_method(method: &str) -> AclResult<Self> {
        match method.to_uppercase().as_str() {
            "GET" => Ok(AclMethod::Read),
            "POST" | "PUT" => Ok(AclMethod::Add),
            "DELETE" => Ok(AclMethod::Remove),
            other => Err(AclError::validation(format!("Unsupported method: {other}"))),
        }
    }

    /// Get the string representation of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AclMethod::Read => "read",
            AclMethod::Add => "add",
            AclMethod::Remove => "remove",
        }
    }

    /// Whether the operation changes the ACL.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, AclMethod::Read)
    }
}

/// Outcome of authenticating the caller, produced by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// A verified credential.
    Authenticated(Identity),
    /// No credential supplied.
    NoCredential,
    /// A credential was supplied and rejected.
    Failed(String),
}

/// Query parameters and form fields of a request.
///
/// `form` is `None` when the body is not a recognized multi-part form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFields {
    /// URL query parameters
    pub query: HashMap<String, String>,
    /// Multi-part form fields, if the body is a form
    pub form: Option<HashMap<String, String>>,
}

impl RequestFields {
    /// Fields with no query and no form body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a form field, marking the body as a multi-part form.
    pub fn with_form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Whether the body is a multi-part form.
    pub fn is_form(&self) -> bool {
        self.form.is_some()
    }

    /// Non-empty query value for `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Non-empty form value for `key`.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .as_ref()
            .and_then(|form| form.get(key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Request context consumed by the orchestrator.
pub trait AclRequest: Send + Sync {
    /// Authentication outcome for the caller.
    fn authentication(&self) -> Authentication;

    /// Requested operation.
    fn method(&self) -> AclMethod;

    /// Query and form fields.
    fn fields(&self) -> &RequestFields;
}

/// Owned request context.
///
/// # Example
///
/// ```
/// use nodeacl_core::Identity;
/// use nodeacl_service::request::{AclMethod, AclRequestContext, RequestFields};
///
/// let request = AclRequestContext::authenticated(Identity::new("caller"), AclMethod::Add)
///     .with_fields(RequestFields::new().with_query("read", "ann@example.com"));
/// ```
#[derive(Debug, Clone)]
pub struct AclRequestContext {
    /// Authentication outcome
    pub authentication: Authentication,
    /// Requested operation
    pub method: AclMethod,
    /// Supplied fields
    pub fields: RequestFields,
}

impl AclRequestContext {
    /// Context for an authenticated caller with no fields.
    pub fn authenticated(identity: Identity, method: AclMethod) -> Self {
        Self {
            authentication: Authentication::Authenticated(identity),
            method,
            fields: RequestFields::new(),
        }
    }

    /// Context for a caller without a credential.
    pub fn anonymous(method: AclMethod) -> Self {
        Self {
            authentication: Authentication::NoCredential,
            method,
            fields: RequestFields::new(),
        }
    }

    /// Replace the request fields.
    pub fn with_fields(mut self, fields: RequestFields) -> Self {
        self.fields = fields;
        self
    }
}

impl AclRequest for AclRequestContext {
    fn authentication(&self) -> Authentication {
        self.authentication.clone()
    }

    fn method(&self) -> AclMethod {
        self.method
    }

    fn fields(&self) -> &RequestFields {
        &self.fields
    }
}
