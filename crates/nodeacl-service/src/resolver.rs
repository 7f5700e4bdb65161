//! Identity resolution
//!
//! Turns a raw user token from an ACL request into a canonical identity.
//! Tokens containing both `@` and `.` are treated as email addresses and
//! resolved through the identity directory; anything else must be an opaque
//! identifier accepted by the configured [`IdentifierPolicy`].

use nodeacl_core::Identity;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::IdentifierPolicy;
use crate::directory::IdentityDirectory;
use crate::error::IdentityError;

/// Classification of a raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Email address, resolved through the directory.
    Email,
    /// Opaque identifier, used verbatim.
    Identifier,
    /// Neither.
    Invalid,
}

/// Whether `token` looks like an email address.
pub fn is_email(token: &str) -> bool {
    token.contains('@') && token.contains('.')
}

/// Legacy identifier heuristic: exactly four `-` characters.
pub fn has_identifier_shape(token: &str) -> bool {
    token.matches('-').count() == 4
}

/// Hyphenated UUID check.
pub fn is_strict_identifier(token: &str) -> bool {
    token.len() == 36 && has_identifier_shape(token) && Uuid::try_parse(token).is_ok()
}

/// Log-safe form of `token`: the first character of each `@`-separated
/// part, the rest masked.
///
/// ```
/// use nodeacl_service::resolver::redact;
///
/// assert_eq!(redact("ann@example.com"), "a**@e**********");
/// ```
pub fn redact(token: &str) -> String {
    token
        .split('@')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => std::iter::once(first).chain(chars.map(|_| '*')).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("@")
}

/// Classify `token` under `policy`.
///
/// # Example
///
/// ```
/// use nodeacl_service::config::IdentifierPolicy;
/// use nodeacl_service::resolver::{classify, TokenKind};
///
/// assert_eq!(classify("ann@example.com", IdentifierPolicy::Strict), TokenKind::Email);
/// assert_eq!(
///     classify("0190f5a2-7c1e-7d3a-9b4f-2e6c8a1d0b3f", IdentifierPolicy::Strict),
///     TokenKind::Identifier
/// );
/// assert_eq!(classify("a-b-c-d-e", IdentifierPolicy::Strict), TokenKind::Invalid);
/// assert_eq!(classify("a-b-c-d-e", IdentifierPolicy::Legacy), TokenKind::Identifier);
/// ```
pub fn classify(token: &str, policy: IdentifierPolicy) -> TokenKind {
    if is_email(token) {
        return TokenKind::Email;
    }

    let accepted = match policy {
        IdentifierPolicy::Strict => is_strict_identifier(token),
        IdentifierPolicy::Legacy => has_identifier_shape(token),
    };

    if accepted {
        TokenKind::Identifier
    } else {
        TokenKind::Invalid
    }
}

/// Resolves raw tokens into identities.
#[derive(Clone)]
pub struct IdentityResolver {
    directory: Arc<dyn IdentityDirectory>,
    policy: IdentifierPolicy,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("policy", &self.policy)
            .finish()
    }
}

impl IdentityResolver {
    /// Create a resolver backed by `directory`.
    pub fn new(directory: Arc<dyn IdentityDirectory>, policy: IdentifierPolicy) -> Self {
        Self { directory, policy }
    }

    /// The identifier policy in force.
    pub fn policy(&self) -> IdentifierPolicy {
        self.policy
    }

    /// Resolve `token` into an identity.
    ///
    /// Email resolution may provision a new directory entry; that side effect
    /// is not undone if the surrounding request later fails.
    pub async fn resolve(&self, token: &str) -> Result<Identity, IdentityError> {
        match classify(token, self.policy) {
            TokenKind::Email => {
                let identity = self.directory.lookup_or_provision(token).await.map_err(|e| {
                    tracing::error!(token = %redact(token), error = %e, "Identity directory lookup failed");
                    IdentityError::from(e)
                })?;
                Ok(identity)
            }
            TokenKind::Identifier => Ok(Identity::new(token)),
            TokenKind::Invalid => {
                if self.policy == IdentifierPolicy::Strict && has_identifier_shape(token) {
                    tracing::warn!(
                        token = %redact(token),
                        "Identifier rejected by strict format check but accepted by legacy hyphen heuristic"
                    );
                }
                Err(IdentityError::InvalidIdentifier(token.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;

    const ID: &str = "0190f5a2-7c1e-7d3a-9b4f-2e6c8a1d0b3f";

    fn resolver(policy: IdentifierPolicy) -> (Arc<MemoryDirectory>, IdentityResolver) {
        let directory = Arc::new(MemoryDirectory::new());
        let resolver = IdentityResolver::new(directory.clone(), policy);
        (directory, resolver)
    }

    #[test]
    fn test_email_classification_wins() {
        // '@' and '.' make it an email even with four hyphens.
        assert_eq!(classify("a-b-c-d-e@x.org", IdentifierPolicy::Legacy), TokenKind::Email);
        assert_eq!(classify("user@localhost", IdentifierPolicy::Legacy), TokenKind::Invalid);
    }

    #[test]
    fn test_strict_identifier() {
        assert!(is_strict_identifier(ID));
        assert!(is_strict_identifier(&ID.to_uppercase()));
        assert!(!is_strict_identifier("0190f5a27c1e7d3a9b4f2e6c8a1d0b3f"));
        assert!(!is_strict_identifier("{0190f5a2-7c1e-7d3a-9b4f-2e6c8a1d0b3f}"));
        assert!(!is_strict_identifier("zzzzzzzz-7c1e-7d3a-9b4f-2e6c8a1d0b3f"));
        assert!(!is_strict_identifier("----"));
    }

    #[test]
    fn test_legacy_identifier() {
        assert!(has_identifier_shape("----"));
        assert!(has_identifier_shape(ID));
        assert!(!has_identifier_shape("a-b-c-d"));
        assert!(!has_identifier_shape("a-b-c-d-e-f"));
    }

    #[test]
    fn test_redact_masks_all_but_leading_characters() {
        assert_eq!(redact("bob.smith@corp.example"), "b********@c***********");
        assert_eq!(redact("a-b-c-d-e"), "a********");
        assert_eq!(redact("@x"), "@x");
        assert_eq!(redact(""), "");
        assert!(!redact("ann@example.com").contains("example"));
    }

    #[tokio::test]
    async fn test_resolve_identifier_verbatim() {
        let (directory, resolver) = resolver(IdentifierPolicy::Strict);
        assert_eq!(resolver.resolve(ID).await.unwrap(), Identity::new(ID));
        assert_eq!(directory.len().await, 0);
    }

    #[tokio::test]
    async fn test_resolve_email_provisions() {
        let (directory, resolver) = resolver(IdentifierPolicy::Strict);
        let identity = resolver.resolve("ann@example.com").await.unwrap();

        assert_eq!(directory.get("ann@example.com").await, Some(identity));
    }

    #[tokio::test]
    async fn test_resolve_invalid_token() {
        let (_, resolver) = resolver(IdentifierPolicy::Strict);
        let err = resolver.resolve("bob").await.unwrap_err();
        assert_eq!(err, IdentityError::InvalidIdentifier("bob".to_string()));

        let err = resolver.resolve("a-b-c-d-e").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_legacy_policy_accepts_hyphen_shape() {
        let (_, resolver) = resolver(IdentifierPolicy::Legacy);
        assert_eq!(resolver.resolve("a-b-c-d-e").await.unwrap(), Identity::new("a-b-c-d-e"));
    }

    #[tokio::test]
    async fn test_unreachable_directory_is_lookup_failure() {
        let (directory, resolver) = resolver(IdentifierPolicy::Strict);
        directory.set_offline(true);

        let err = resolver.resolve("ann@example.com").await.unwrap_err();
        assert!(matches!(err, IdentityError::LookupFailure(_)));
    }
}
