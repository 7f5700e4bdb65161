//! Service configuration.
//!
//! Anonymous access defaults, identifier validation policy and mutation
//! serialization. Configuration is loaded from environment variables with
//! the defaults of a stock deployment, then handed to the orchestrator at
//! construction.

use nodeacl_core::AnonymousAccess;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// How opaque identifiers are recognized.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierPolicy {
    /// Hyphenated RFC 4122 UUID (`8-4-4-4-12` hex digits).
    #[default]
    Strict,
    /// Any token containing exactly four `-` characters.
    Legacy,
}

impl IdentifierPolicy {
    /// Parse a policy name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Some(IdentifierPolicy::Strict),
            "legacy" => Some(IdentifierPolicy::Legacy),
            _ => None,
        }
    }
}

/// Configuration for the ACL service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AclConfig {
    /// Rights of callers without a credential on unrestricted nodes.
    pub anonymous: AnonymousAccess,

    /// Identifier recognition policy.
    pub identifier_policy: IdentifierPolicy,

    /// Serialize load-mutate-save per node instead of last-write-wins.
    pub serialize_mutations: bool,
}

impl AclConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ANON_READ`: Anonymous read (default: true)
    /// - `ANON_WRITE`: Anonymous write (default: true)
    /// - `ANON_DELETE`: Anonymous delete (default: true)
    /// - `ACL_IDENTIFIER_POLICY`: `strict` or `legacy` (default: strict)
    /// - `ACL_SERIALIZE_MUTATIONS`: Per-node mutation lock (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let flag = |key: &str, fallback: bool| {
            lookup(key)
                .map(|s| s != "false" && s != "0")
                .unwrap_or(fallback)
        };

        let identifier_policy = match lookup("ACL_IDENTIFIER_POLICY") {
            Some(raw) => IdentifierPolicy::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "ACL_IDENTIFIER_POLICY".to_string(),
                message: format!("expected 'strict' or 'legacy', got '{raw}'"),
            })?,
            None => default.identifier_policy,
        };

        Ok(Self {
            anonymous: AnonymousAccess {
                read: flag("ANON_READ", default.anonymous.read),
                write: flag("ANON_WRITE", default.anonymous.write),
                delete: flag("ANON_DELETE", default.anonymous.delete),
            },
            identifier_policy,
            serialize_mutations: flag("ACL_SERIALIZE_MUTATIONS", default.serialize_mutations),
        })
    }
}
