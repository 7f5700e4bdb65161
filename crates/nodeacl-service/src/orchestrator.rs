//! ACL request orchestration
//!
//! Sequences every ACL request through the same steps:
//!
//! ```text
//! authenticate → load node → check rights → [parse → authorize → mutate → save] → authorize read → view
//! ```
//!
//! Any step may end the request with an [`AclError`]. Two entry points are
//! provided: the bulk endpoint (`/node/{id}/acl`) viewing and updating every
//! right at once, and the single-type endpoint (`/node/{id}/acl/{type}`).

use nodeacl_core::{Identity, Node, NodeId, Right, RightType, Rights};
use std::sync::Arc;

use crate::config::AclConfig;
use crate::directory::IdentityDirectory;
use crate::error::{AclError, AclResult, StoreError};
use crate::locks::{NodeLockGuard, NodeLocks};
use crate::parser::RequestParser;
use crate::request::{AclMethod, AclRequest, Authentication};
use crate::resolver::IdentityResolver;
use crate::response::{AclDocument, AclView, SingleRightView};
use crate::store::NodeStore;

const INVALID_ACL_TYPE: &str = "Invalid acl type";
const TOO_MANY_OWNERS: &str = "Too many users. Nodes may have only one owner.";
const OWNER_REQUIRED: &str = "Nodes must have an owner. Transfer ownership instead of removing it.";

/// Authorization orchestrator for node ACL endpoints.
///
/// # Example
///
/// ```rust,no_run
/// use nodeacl_core::{Identity, NodeId};
/// use nodeacl_service::{AclConfig, AclService, MemoryDirectory, MemoryNodeStore};
/// use nodeacl_service::request::{AclMethod, AclRequestContext, RequestFields};
/// use std::sync::Arc;
///
/// async fn example() {
///     let service = AclService::new(
///         Arc::new(MemoryNodeStore::new()),
///         Arc::new(MemoryDirectory::new()),
///         AclConfig::default(),
///     );
///
///     let request = AclRequestContext::authenticated(Identity::new("caller"), AclMethod::Add)
///         .with_fields(RequestFields::new().with_query("read", "ann@example.com"));
///
///     let view = service.handle_bulk(&NodeId::new("node-1"), &request).await;
/// }
/// ```
pub struct AclService {
    store: Arc<dyn NodeStore>,
    parser: RequestParser,
    config: AclConfig,
    locks: NodeLocks,
}

impl std::fmt::Debug for AclService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclService")
            .field("config", &self.config)
            .finish()
    }
}

impl AclService {
    /// Create a service over the given store and directory.
    pub fn new(
        store: Arc<dyn NodeStore>,
        directory: Arc<dyn IdentityDirectory>,
        config: AclConfig,
    ) -> Self {
        let resolver = IdentityResolver::new(directory, config.identifier_policy);
        Self {
            store,
            parser: RequestParser::new(resolver),
            config,
            locks: NodeLocks::new(),
        }
    }

    /// The configuration the service was built with.
    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    /// Handle a bulk ACL request (`/node/{id}/acl`).
    ///
    /// Add grants every listed (right, identity) pair and requires owner or
    /// write; granting delete also requires holding delete. Remove revokes
    /// them and requires owner or delete. The reply is the full ACL.
    pub async fn handle_bulk(&self, node_id: &NodeId, request: &dyn AclRequest) -> AclResult<AclView> {
        let caller = authenticate(request)?;
        let method = request.method();

        let (mut node, _guard) = self.load_for(node_id, &caller, method).await?;
        let rights = node.acl.check(&caller);
        let was_owner = node.acl.is_owner(&caller);

        if method.is_mutation() {
            let targets = self.parser.parse_bulk(request.fields()).await?;
            authorize(&caller, node_id, method, was_owner, rights)?;
            if method == AclMethod::Add && !targets.get(Right::Delete).is_empty() {
                authorize_delete_grant(&caller, node_id, was_owner, rights)?;
            }

            for (right, identity) in targets.pairs() {
                match method {
                    AclMethod::Add => node.acl.set(identity, [right]),
                    _ => node.acl.unset(identity, [right]),
                }
            }
            self.persist(&node, &caller, method, None).await?;
        }

        authorize_read(&caller, node_id, was_owner, rights)?;
        Ok(AclView::Full(AclDocument::from(&node.acl)))
    }

    /// Handle a single right-type ACL request (`/node/{id}/acl/{type}`).
    ///
    /// `right_type` must be one of read, write, delete or owner. Adding to
    /// `owner` transfers ownership and takes exactly one identity. Adding to
    /// `delete` also requires the caller to hold delete.
    pub async fn handle_typed(
        &self,
        node_id: &NodeId,
        right_type: &str,
        request: &dyn AclRequest,
    ) -> AclResult<AclView> {
        let caller = authenticate(request)?;
        let right_type = RightType::parse(right_type).ok_or_else(|| AclError::validation(INVALID_ACL_TYPE))?;
        let method = request.method();

        let (mut node, _guard) = self.load_for(node_id, &caller, method).await?;
        let rights = node.acl.check(&caller);
        let was_owner = node.acl.is_owner(&caller);

        if method.is_mutation() {
            let ids = self.parser.parse_users(request.fields()).await?;
            authorize(&caller, node_id, method, was_owner, rights)?;
            if method == AclMethod::Add && right_type == RightType::Delete {
                authorize_delete_grant(&caller, node_id, was_owner, rights)?;
            }

            match (method, right_type.as_right()) {
                (AclMethod::Add, None) => match ids.as_slice() {
                    [new_owner] => node.acl.set_owner(new_owner.clone()),
                    _ => return Err(AclError::validation(TOO_MANY_OWNERS)),
                },
                (AclMethod::Add, Some(right)) => {
                    for identity in &ids {
                        node.acl.set(identity, [right]);
                    }
                }
                (_, None) => return Err(AclError::validation(OWNER_REQUIRED)),
                (_, Some(right)) => {
                    for identity in &ids {
                        node.acl.unset(identity, [right]);
                    }
                }
            }
            self.persist(&node, &caller, method, Some(right_type)).await?;
        }

        authorize_read(&caller, node_id, was_owner, rights)?;
        Ok(AclView::Single(SingleRightView::project(&node.acl, right_type)))
    }

    /// Load the node, holding its mutation lock when mutations are
    /// serialized. The lock is only taken for a node that exists and is
    /// visible; the node is then reloaded under it.
    async fn load_for(
        &self,
        node_id: &NodeId,
        caller: &Identity,
        method: AclMethod,
    ) -> AclResult<(Node, Option<NodeLockGuard>)> {
        let node = self.load_node(node_id, caller).await?;
        if !(self.config.serialize_mutations && method.is_mutation()) {
            return Ok((node, None));
        }

        let guard = self.locks.acquire(node_id).await;
        let node = self.load_node(node_id, caller).await?;
        Ok((node, Some(guard)))
    }

    async fn load_node(&self, node_id: &NodeId, caller: &Identity) -> AclResult<Node> {
        let node = self.store.load(node_id).await.map_err(|e| {
            if let StoreError::Backend(detail) = &e {
                tracing::error!(node_id = %node_id, error = %detail, "Failed to load node");
            }
            AclError::from(e)
        })?;

        if !node.acl.is_visible_to(caller, &self.config.anonymous) {
            tracing::debug!(node_id = %node_id, caller = %caller, "Node not visible to caller");
            return Err(AclError::Unauthorized);
        }
        Ok(node)
    }

    async fn persist(
        &self,
        node: &Node,
        caller: &Identity,
        method: AclMethod,
        right_type: Option<RightType>,
    ) -> AclResult<()> {
        let right_type = right_type.map(|t| t.as_str()).unwrap_or("all");

        self.store.save(node).await.map_err(|e| {
            tracing::error!(node_id = %node.id, error = %e, "Failed to save node ACL");
            AclError::Internal(e.to_string())
        })?;

        tracing::info!(
            node_id = %node.id,
            caller = %caller,
            operation = method.as_str(),
            right_type = right_type,
            "ACL updated"
        );
        Ok(())
    }
}

/// Resolve the caller. ACL endpoints always require a real credential,
/// even on nodes whose content is anonymously readable.
fn authenticate(request: &dyn AclRequest) -> AclResult<Identity> {
    match request.authentication() {
        Authentication::Authenticated(identity) if !identity.is_anonymous() => Ok(identity),
        Authentication::Authenticated(_) | Authentication::NoCredential => Err(AclError::NoAuth),
        Authentication::Failed(reason) => Err(AclError::Unauthenticated(reason)),
    }
}

/// The right required to perform a mutation.
fn mutation_right(method: AclMethod) -> Right {
    match method {
        AclMethod::Remove => Right::Delete,
        _ => Right::Write,
    }
}

fn authorize(
    caller: &Identity,
    node_id: &NodeId,
    method: AclMethod,
    is_owner: bool,
    rights: Rights,
) -> AclResult<()> {
    let required = mutation_right(method);
    if is_owner || rights.has(required) {
        return Ok(());
    }

    tracing::debug!(
        node_id = %node_id,
        caller = %caller,
        operation = method.as_str(),
        required = required.as_str(),
        "ACL mutation denied"
    );
    Err(AclError::Unauthorized)
}

/// Write lets a caller grant read and write, but only a caller holding
/// delete may hand it out.
fn authorize_delete_grant(caller: &Identity, node_id: &NodeId, is_owner: bool, rights: Rights) -> AclResult<()> {
    if is_owner || rights.delete {
        return Ok(());
    }

    tracing::debug!(node_id = %node_id, caller = %caller, "Delete grant denied");
    Err(AclError::Unauthorized)
}

fn authorize_read(caller: &Identity, node_id: &NodeId, is_owner: bool, rights: Rights) -> AclResult<()> {
    if is_owner || rights.read {
        return Ok(());
    }

    tracing::debug!(node_id = %node_id, caller = %caller, "ACL read denied");
    Err(AclError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;
    use crate::error::ErrorKind;
    use crate::request::{AclRequestContext, RequestFields};
    use crate::store::MemoryNodeStore;

    const OWNER: &str = "0190f5a2-0000-7000-8000-000000000001";
    const OTHER: &str = "0190f5a2-0000-7000-8000-000000000002";

    async fn service() -> (Arc<MemoryNodeStore>, AclService) {
        let store = Arc::new(MemoryNodeStore::new());
        store.insert(Node::new("n1", Identity::new(OWNER))).await;
        let service = AclService::new(store.clone(), Arc::new(MemoryDirectory::new()), AclConfig::default());
        (store, service)
    }

    #[test]
    fn test_authenticate_outcomes() {
        let ok = AclRequestContext::authenticated(Identity::new(OWNER), AclMethod::Read);
        assert_eq!(authenticate(&ok).unwrap(), Identity::new(OWNER));

        let anon = AclRequestContext::anonymous(AclMethod::Read);
        assert_eq!(authenticate(&anon).unwrap_err(), AclError::NoAuth);

        let sentinel = AclRequestContext::authenticated(Identity::anonymous(), AclMethod::Read);
        assert_eq!(authenticate(&sentinel).unwrap_err(), AclError::NoAuth);

        let mut failed = AclRequestContext::anonymous(AclMethod::Read);
        failed.authentication = Authentication::Failed("expired token".into());
        assert_eq!(authenticate(&failed).unwrap_err().kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn test_mutation_right() {
        assert_eq!(mutation_right(AclMethod::Add), Right::Write);
        assert_eq!(mutation_right(AclMethod::Remove), Right::Delete);
    }

    #[test]
    fn test_delete_grant_requires_delete() {
        let caller = Identity::new(OTHER);
        let node_id = NodeId::new("n1");
        let writer = Rights { read: false, write: true, delete: false };

        assert_eq!(
            authorize_delete_grant(&caller, &node_id, false, writer).unwrap_err(),
            AclError::Unauthorized
        );
        assert!(authorize_delete_grant(&caller, &node_id, true, Rights::default()).is_ok());
        assert!(authorize_delete_grant(&caller, &node_id, false, Rights::full()).is_ok());
    }

    #[tokio::test]
    async fn test_owner_reads_full_acl() {
        let (_, service) = service().await;
        let request = AclRequestContext::authenticated(Identity::new(OWNER), AclMethod::Read);

        let view = service.handle_bulk(&NodeId::new("n1"), &request).await.unwrap();
        match view {
            AclView::Full(doc) => assert_eq!(doc.owner, Identity::new(OWNER)),
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_type_is_rejected_before_load() {
        let (_, service) = service().await;
        let request = AclRequestContext::authenticated(Identity::new(OWNER), AclMethod::Read);

        let err = service
            .handle_typed(&NodeId::new("missing"), "all", &request)
            .await
            .unwrap_err();
        assert_eq!(err, AclError::validation(INVALID_ACL_TYPE));
    }

    #[tokio::test]
    async fn test_remove_owner_is_rejected() {
        let (store, service) = service().await;
        let request = AclRequestContext::authenticated(Identity::new(OWNER), AclMethod::Remove)
            .with_fields(RequestFields::new().with_query("users", OWNER));

        let err = service
            .handle_typed(&NodeId::new("n1"), "owner", &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_save_failure_is_internal() {
        let (store, service) = service().await;
        store.set_fail_saves(true);
        let request = AclRequestContext::authenticated(Identity::new(OWNER), AclMethod::Add)
            .with_fields(RequestFields::new().with_query("read", OTHER));

        let err = service.handle_bulk(&NodeId::new("n1"), &request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[tokio::test]
    async fn test_lock_table_drains_after_mutations() {
        let store = Arc::new(MemoryNodeStore::new());
        store.insert(Node::new("n1", Identity::new(OWNER))).await;
        let config = AclConfig {
            serialize_mutations: true,
            ..AclConfig::default()
        };
        let service = AclService::new(store.clone(), Arc::new(MemoryDirectory::new()), config);

        for n in 0..50 {
            let request = AclRequestContext::authenticated(Identity::new(OWNER), AclMethod::Add)
                .with_fields(RequestFields::new().with_query("read", OTHER));
            let err = service
                .handle_bulk(&NodeId::new(format!("missing-{n}")), &request)
                .await
                .unwrap_err();
            assert_eq!(err, AclError::NotFound);
        }
        assert!(service.locks.is_empty());

        let request = AclRequestContext::authenticated(Identity::new(OWNER), AclMethod::Add)
            .with_fields(RequestFields::new().with_query("users", OTHER));
        service.handle_typed(&NodeId::new("n1"), "write", &request).await.unwrap();
        assert_eq!(store.save_count(), 1);
        assert!(service.locks.is_empty());
    }
}
