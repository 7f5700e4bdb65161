//! ACL request parsing
//!
//! Extracts the target identities of a mutation from the request fields.
//! Values come either from the query string or from a multi-part form,
//! never a mix of both: the query is used when the body is not a form and
//! carries at least one recognized field, otherwise the form is used.
//! Each value is a comma-separated list of tokens resolved through the
//! [`IdentityResolver`].

use nodeacl_core::{Identity, Right};
use std::collections::BTreeMap;

use crate::error::{AclError, AclResult};
use crate::request::RequestFields;
use crate::resolver::IdentityResolver;

/// Bulk-endpoint field expanding into read, write and delete.
pub const ALL_FIELD: &str = "all";

/// Single-type endpoint field.
pub const USERS_FIELD: &str = "users";

const BULK_MISSING: &str = "Action requires list of comma separated email address in 'all', 'read', 'write', and/or 'delete' parameter";
const USERS_MISSING: &str = "Action requires list of comma separated email address in 'users' parameter";

/// Where field values are taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// URL query parameters.
    Query,
    /// Multi-part form fields.
    Form,
}

impl FieldSource {
    /// Pick the source for `keys`, or `None` if neither carries any of them.
    pub fn select(fields: &RequestFields, keys: &[&str]) -> Option<Self> {
        if !fields.is_form() && keys.iter().any(|k| fields.query_value(k).is_some()) {
            Some(FieldSource::Query)
        } else if keys.iter().any(|k| fields.form_value(k).is_some()) {
            Some(FieldSource::Form)
        } else {
            None
        }
    }

    /// Non-empty value of `key` in this source.
    pub fn value<'a>(&self, fields: &'a RequestFields, key: &str) -> Option<&'a str> {
        match self {
            FieldSource::Query => fields.query_value(key),
            FieldSource::Form => fields.form_value(key),
        }
    }
}

/// Split a comma-separated token list, dropping empty tokens.
pub fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Resolved targets of a bulk mutation, keyed by right.
///
/// The `all` field has already been expanded; an identity may be listed
/// more than once for a right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkTargets {
    targets: BTreeMap<Right, Vec<Identity>>,
}

impl BulkTargets {
    /// Identities targeted for `right`.
    pub fn get(&self, right: Right) -> &[Identity] {
        self.targets.get(&right).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over every (right, identity) pair.
    pub fn pairs(&self) -> impl Iterator<Item = (Right, &Identity)> {
        self.targets
            .iter()
            .flat_map(|(right, ids)| ids.iter().map(move |id| (*right, id)))
    }

    /// Whether no identity is targeted at all.
    pub fn is_empty(&self) -> bool {
        self.targets.values().all(Vec::is_empty)
    }

    fn extend(&mut self, right: Right, ids: &[Identity]) {
        self.targets.entry(right).or_default().extend_from_slice(ids);
    }
}

/// Parses ACL mutation requests.
#[derive(Debug, Clone)]
pub struct RequestParser {
    resolver: IdentityResolver,
}

impl RequestParser {
    /// Create a parser resolving tokens with `resolver`.
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    async fn resolve_list(&self, raw: Option<&str>) -> AclResult<Vec<Identity>> {
        let mut ids = Vec::new();
        if let Some(raw) = raw {
            for token in split_tokens(raw) {
                ids.push(self.resolver.resolve(token).await?);
            }
        }
        Ok(ids)
    }

    /// Parse the bulk endpoint fields `all`, `read`, `write` and `delete`.
    ///
    /// Any unresolvable token aborts the whole parse. Identities listed
    /// under `all` are appended to each of read, write and delete.
    pub async fn parse_bulk(&self, fields: &RequestFields) -> AclResult<BulkTargets> {
        let keys = [ALL_FIELD, "read", "write", "delete"];
        let source = FieldSource::select(fields, &keys)
            .ok_or_else(|| AclError::validation(BULK_MISSING))?;

        let all = self.resolve_list(source.value(fields, ALL_FIELD)).await?;

        let mut targets = BulkTargets::default();
        for right in Right::all() {
            let ids = self.resolve_list(source.value(fields, right.as_str())).await?;
            targets.extend(right, &ids);
        }

        if !all.is_empty() {
            for right in Right::all() {
                targets.extend(right, &all);
            }
        }

        if targets.is_empty() {
            return Err(AclError::validation(BULK_MISSING));
        }
        Ok(targets)
    }

    /// Parse the single-type endpoint field `users`.
    pub async fn parse_users(&self, fields: &RequestFields) -> AclResult<Vec<Identity>> {
        let source = FieldSource::select(fields, &[USERS_FIELD])
            .ok_or_else(|| AclError::validation(USERS_MISSING))?;

        let ids = self.resolve_list(source.value(fields, USERS_FIELD)).await?;
        if ids.is_empty() {
            return Err(AclError::validation(USERS_MISSING));
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdentifierPolicy;
    use crate::directory::MemoryDirectory;
    use crate::error::ErrorKind;
    use std::sync::Arc;

    const A: &str = "0190f5a2-7c1e-7d3a-9b4f-2e6c8a1d0b3f";
    const B: &str = "0190f5a2-7c1e-7d3a-9b4f-2e6c8a1d0b40";

    fn parser() -> (Arc<MemoryDirectory>, RequestParser) {
        let directory = Arc::new(MemoryDirectory::new());
        let resolver = IdentityResolver::new(directory.clone(), IdentifierPolicy::Strict);
        (directory, RequestParser::new(resolver))
    }

    #[test]
    fn test_split_tokens() {
        let tokens: Vec<&str> = split_tokens(" a, b,,c ,").collect();
        assert_eq!(tokens, vec!["a", "b", "c"]);
        assert_eq!(split_tokens("").count(), 0);
    }

    #[test]
    fn test_source_selection() {
        let query = RequestFields::new().with_query("read", A);
        assert_eq!(FieldSource::select(&query, &["read"]), Some(FieldSource::Query));

        // A form body wins even when the query carries the field.
        let both = RequestFields::new().with_query("read", A).with_form("read", B);
        assert_eq!(FieldSource::select(&both, &["read"]), Some(FieldSource::Form));

        // A form body with no usable field leaves nothing to parse.
        let empty_form = RequestFields::new().with_query("read", A).with_form("other", "x");
        assert_eq!(FieldSource::select(&empty_form, &["read"]), None);
    }

    #[tokio::test]
    async fn test_bulk_from_query() {
        let (_, parser) = parser();
        let fields = RequestFields::new()
            .with_query("read", format!("{A},{B}"))
            .with_query("delete", B);

        let targets = parser.parse_bulk(&fields).await.unwrap();
        assert_eq!(targets.get(Right::Read), &[Identity::new(A), Identity::new(B)]);
        assert!(targets.get(Right::Write).is_empty());
        assert_eq!(targets.get(Right::Delete), &[Identity::new(B)]);
        assert_eq!(targets.pairs().count(), 3);
    }

    #[tokio::test]
    async fn test_bulk_all_expands() {
        let (_, parser) = parser();
        let fields = RequestFields::new().with_form("all", A).with_form("read", A);

        let targets = parser.parse_bulk(&fields).await.unwrap();
        // Duplicates are kept here; the permission set dedupes.
        assert_eq!(targets.get(Right::Read), &[Identity::new(A), Identity::new(A)]);
        assert_eq!(targets.get(Right::Write), &[Identity::new(A)]);
        assert_eq!(targets.get(Right::Delete), &[Identity::new(A)]);
    }

    #[tokio::test]
    async fn test_bulk_resolves_emails() {
        let (directory, parser) = parser();
        let fields = RequestFields::new().with_query("write", "ann@example.com");

        let targets = parser.parse_bulk(&fields).await.unwrap();
        let ann = directory.get("ann@example.com").await.unwrap();
        assert_eq!(targets.get(Right::Write), &[ann]);
    }

    #[tokio::test]
    async fn test_bulk_missing_parameter() {
        let (_, parser) = parser();
        let err = parser.parse_bulk(&RequestFields::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let fields = RequestFields::new().with_query("owner", A).with_query("read", "");
        let err = parser.parse_bulk(&fields).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let only_commas = RequestFields::new().with_query("read", ",");
        let err = parser.parse_bulk(&only_commas).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_bulk_invalid_token_aborts() {
        let (directory, parser) = parser();
        let fields = RequestFields::new()
            .with_query("read", "ann@example.com")
            .with_query("write", "not-an-id");

        let err = parser.parse_bulk(&fields).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        // Resolution already performed is not rolled back.
        assert!(directory.get("ann@example.com").await.is_some());
    }

    #[tokio::test]
    async fn test_bulk_directory_down_is_internal() {
        let (directory, parser) = parser();
        directory.set_offline(true);
        let fields = RequestFields::new().with_query("read", "ann@example.com");

        let err = parser.parse_bulk(&fields).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_users_field() {
        let (_, parser) = parser();
        let fields = RequestFields::new().with_query("users", format!("{A}, {B}"));
        let ids = parser.parse_users(&fields).await.unwrap();
        assert_eq!(ids, vec![Identity::new(A), Identity::new(B)]);

        let err = parser.parse_users(&RequestFields::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let only_commas = RequestFields::new().with_query("users", ",,");
        let err = parser.parse_users(&only_commas).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
