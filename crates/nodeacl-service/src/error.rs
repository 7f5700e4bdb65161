//! Error types for ACL operations
//!
//! This module defines the errors raised while resolving identities, talking
//! to the identity directory and node store, and deciding ACL requests.
//! Callers branch on [`ErrorKind`], never on message text.

use thiserror::Error;

/// Classification of an ACL failure, independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No credential on an endpoint that mandates one.
    NoAuth,
    /// A credential was supplied but could not be verified.
    Unauthenticated,
    /// Credential present but insufficient rights.
    Unauthorized,
    /// Node absent.
    NotFound,
    /// Bad right type, malformed identifier, wrong owner cardinality, or
    /// missing required field.
    Validation,
    /// Directory or store unreachable, unexpected persistence failure.
    Internal,
}

/// Identity resolution errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Token is neither an email address nor a well-formed identifier
    #[error("Unknown user id. Must be uuid or email address: {0}")]
    InvalidIdentifier(String),

    /// Identity directory could not resolve or provision an email
    #[error("Identity lookup failed: {0}")]
    LookupFailure(String),
}

/// Identity directory errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// Directory is unreachable
    #[error("Identity directory unavailable: {0}")]
    Unavailable(String),

    /// Creating a new directory entry failed
    #[error("Failed to provision identity: {0}")]
    Provisioning(String),
}

/// Result type for identity directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Node store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Requester may not see the node
    #[error("Unauthorized")]
    Unauthorized,

    /// Node does not exist
    #[error("Node not found: {0}")]
    NotFound(String),

    /// Backend failure (connection lost, write rejected, ...)
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for node store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// ACL request error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AclError {
    /// No credential supplied; ACL endpoints always require one
    #[error("No Authorization")]
    NoAuth,

    /// Credential supplied but rejected by the authenticator
    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    /// Caller lacks the rights for this operation
    #[error("Unauthorized")]
    Unauthorized,

    /// Node does not exist
    #[error("Node not found")]
    NotFound,

    /// Request failed validation
    #[error("{0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for ACL operations.
pub type AclResult<T> = Result<T, AclError>;

impl AclError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        AclError::Validation(message.into())
    }

    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AclError::NoAuth => ErrorKind::NoAuth,
            AclError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            AclError::Unauthorized => ErrorKind::Unauthorized,
            AclError::NotFound => ErrorKind::NotFound,
            AclError::Validation(_) => ErrorKind::Validation,
            AclError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error should be logged at error level.
    ///
    /// Validation and authorization failures are expected and are not.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AclError::Internal(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NoAuth | ErrorKind::Unauthenticated | ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Validation => 400,
            ErrorKind::Internal => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NoAuth => "NO_AUTH",
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Internal diagnostics are replaced by a generic message.
    pub fn client_message(&self) -> String {
        match self {
            AclError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<IdentityError> for AclError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidIdentifier(_) => AclError::Validation(err.to_string()),
            IdentityError::LookupFailure(detail) => AclError::Internal(detail),
        }
    }
}

impl From<StoreError> for AclError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized => AclError::Unauthorized,
            StoreError::NotFound(_) => AclError::NotFound,
            StoreError::Backend(detail) => AclError::Internal(detail),
        }
    }
}

impl From<DirectoryError> for IdentityError {
    fn from(err: DirectoryError) -> Self {
        IdentityError::LookupFailure(err.to_string())
    }
}
