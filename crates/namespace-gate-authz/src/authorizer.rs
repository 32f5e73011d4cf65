// crates/namespace-gate-authz/src/authorizer.rs
// ============================================================================
// Module: Namespace Membership Authorizer
// Description: Role resolution over the namespace hierarchy for one subject.
// Purpose: Answer role, visibility, and root-namespace questions with caching.
// Dependencies: async-trait, namespace-gate-core, crate::cache
// ============================================================================

//! ## Overview
//! A [`NamespaceMembershipAuthorizer`] is bound to one subject (a user or a
//! service account) and lives for one request. Roles granted at a namespace
//! cascade to every descendant, so a check against `org/team/ws` queries the
//! memberships at `org/team/ws`, `org/team`, and `org` together. Every row a
//! query returns is merged into the [`RoleCache`] under its path, workspace
//! id, and group id, so later checks in the same request avoid the store.
//!
//! Denials distinguish visibility: a subject with no membership anywhere in
//! the target's ancestry gets `NotFound`; one with a membership whose role is
//! too low gets `Forbidden`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::EntityStore;
use namespace_gate_core::GroupId;
use namespace_gate_core::MembershipQuery;
use namespace_gate_core::MembershipSort;
use namespace_gate_core::MembershipStore;
use namespace_gate_core::MembershipSubject;
use namespace_gate_core::NamespaceMembership;
use namespace_gate_core::ResourceType;
use namespace_gate_core::Role;
use namespace_gate_core::ServiceAccountId;
use namespace_gate_core::UserId;
use namespace_gate_core::WorkspaceId;
use namespace_gate_core::expand_path;
use namespace_gate_core::is_ancestor_or_self;
use namespace_gate_core::root_segment;

use crate::cache::CacheKey;
use crate::cache::RoleCache;

// ============================================================================
// SECTION: Authorizer Trait
// ============================================================================

/// Membership-backed access checks consumed by user and service account callers.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Returns the top-level namespaces the subject is a member of, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Upstream`] when the membership query fails.
    async fn get_root_namespaces(&self) -> Result<Vec<String>, AuthzError>;

    /// Requires `role` on every namespace, group, and workspace named in
    /// `constraints`.
    ///
    /// # Errors
    ///
    /// Returns a denial when any scope lacks the role, and
    /// [`AuthzError::InvalidConstraints`] when no scope was supplied.
    async fn require_access(
        &self,
        role: Role,
        constraints: &Constraints,
    ) -> Result<(), AuthzError>;

    /// Requires viewer-level access to a resource that inherits visibility
    /// from the namespaces named in `constraints`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::NotFound`] when no membership is related to a
    /// requested namespace.
    async fn require_access_to_inheritable_resource(
        &self,
        resource_type: ResourceType,
        constraints: &Constraints,
    ) -> Result<(), AuthzError>;
}

// ============================================================================
// SECTION: Namespace Membership Authorizer
// ============================================================================

/// Authorizer resolving roles from namespace memberships.
pub struct NamespaceMembershipAuthorizer {
    /// Subject whose memberships are consulted.
    subject: MembershipSubject,
    /// Membership query backend.
    memberships: Arc<dyn MembershipStore>,
    /// Entity lookup backend.
    entities: Arc<dyn EntityStore>,
    /// Request-scoped role cache.
    cache: RoleCache,
}

impl NamespaceMembershipAuthorizer {
    /// Creates an authorizer for an arbitrary membership subject.
    #[must_use]
    pub fn new(
        subject: MembershipSubject,
        memberships: Arc<dyn MembershipStore>,
        entities: Arc<dyn EntityStore>,
    ) -> Self {
        Self {
            subject,
            memberships,
            entities,
            cache: RoleCache::new(),
        }
    }

    /// Creates an authorizer for a user.
    #[must_use]
    pub fn for_user(
        user_id: UserId,
        memberships: Arc<dyn MembershipStore>,
        entities: Arc<dyn EntityStore>,
    ) -> Self {
        Self::new(MembershipSubject::User(user_id), memberships, entities)
    }

    /// Creates an authorizer for a service account.
    #[must_use]
    pub fn for_service_account(
        service_account_id: ServiceAccountId,
        memberships: Arc<dyn MembershipStore>,
        entities: Arc<dyn EntityStore>,
    ) -> Self {
        Self::new(MembershipSubject::ServiceAccount(service_account_id), memberships, entities)
    }

    /// Returns the subject this authorizer resolves roles for.
    #[must_use]
    pub const fn subject(&self) -> &MembershipSubject {
        &self.subject
    }

    /// Returns the request-scoped role cache.
    #[must_use]
    pub const fn cache(&self) -> &RoleCache {
        &self.cache
    }

    /// Requires `role` at `path` or any of its ancestors.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::NotFound`] when the subject has no membership in
    /// the ancestry, [`AuthzError::Forbidden`] when every membership role is
    /// too low, or [`AuthzError::Upstream`] when the query fails.
    pub async fn require_access_to_namespace(
        &self,
        path: &str,
        role: Role,
    ) -> Result<(), AuthzError> {
        if self.cache.get(&CacheKey::Namespace(path.to_string()), role) {
            return Ok(());
        }
        let query = MembershipQuery::for_subject(self.subject.clone())
            .with_namespace_paths(expand_path(path))
            .sorted(MembershipSort::PathDesc);
        let rows = self.query(&query).await?;
        if rows.is_empty() {
            return Err(AuthzError::NotFound(format!("namespace {path} not found")));
        }
        if rows.iter().any(|row| row.role.gte(role)) {
            return Ok(());
        }
        Err(AuthzError::Forbidden(format!("{role} role required in namespace {path}")))
    }

    /// Requires `role` on a group, resolving its path on a cache miss.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::NotFound`] when the group does not exist, plus
    /// the errors of [`Self::require_access_to_namespace`].
    pub async fn require_access_to_group(
        &self,
        group_id: &GroupId,
        role: Role,
    ) -> Result<(), AuthzError> {
        if self.cache.get(&CacheKey::Group(group_id.clone()), role) {
            return Ok(());
        }
        let group = self
            .entities
            .get_group_by_id(group_id)
            .await?
            .ok_or_else(|| AuthzError::NotFound(format!("group {group_id} not found")))?;
        self.require_access_to_namespace(group.full_path.as_str(), role).await
    }

    /// Requires `role` on a workspace, resolving its path on a cache miss.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::NotFound`] when the workspace does not exist,
    /// plus the errors of [`Self::require_access_to_namespace`].
    pub async fn require_access_to_workspace(
        &self,
        workspace_id: &WorkspaceId,
        role: Role,
    ) -> Result<(), AuthzError> {
        if self.cache.get(&CacheKey::Workspace(workspace_id.clone()), role) {
            return Ok(());
        }
        let workspace =
            self.entities.get_workspace_by_id(workspace_id).await?.ok_or_else(|| {
                AuthzError::NotFound(format!("workspace {workspace_id} not found"))
            })?;
        self.require_access_to_namespace(workspace.full_path.as_str(), role).await
    }

    /// Requires viewer access to every path in `paths`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::NotFound`] for the first path outside every
    /// root namespace of the subject.
    pub async fn require_viewer_access_to_namespaces(
        &self,
        paths: &[String],
    ) -> Result<(), AuthzError> {
        if paths
            .iter()
            .all(|path| self.cache.get(&CacheKey::Namespace(path.clone()), Role::Viewer))
        {
            return Ok(());
        }
        let roots: BTreeSet<String> = self.get_root_namespaces().await?.into_iter().collect();
        for path in paths {
            if !expand_path(path).iter().any(|ancestor| roots.contains(ancestor)) {
                return Err(AuthzError::NotFound(format!("namespace {path} not found")));
            }
        }
        Ok(())
    }

    /// Requires viewer-level access to a resource inherited from `path`.
    ///
    /// Access holds when any membership sits at `path`, above it, or below it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::NotFound`] when no membership is related to `path`.
    pub async fn require_access_to_inherited_namespace_resource(
        &self,
        path: &str,
    ) -> Result<(), AuthzError> {
        if self.cache.get(&CacheKey::Namespace(path.to_string()), Role::Viewer) {
            return Ok(());
        }
        let query = MembershipQuery::for_subject(self.subject.clone())
            .with_namespace_path_prefix(root_segment(path));
        let rows = self.query(&query).await?;
        let related = rows.iter().any(|row| {
            let member_path = row.namespace.path.as_str();
            is_ancestor_or_self(member_path, path) || is_ancestor_or_self(path, member_path)
        });
        if related {
            Ok(())
        } else {
            Err(AuthzError::NotFound(format!("namespace {path} not found")))
        }
    }

    /// Requires viewer-level access to a resource inherited from a group.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::NotFound`] when the group does not exist or no
    /// membership is related to it.
    pub async fn require_access_to_inherited_group_resource(
        &self,
        group_id: &GroupId,
    ) -> Result<(), AuthzError> {
        let group = self
            .entities
            .get_group_by_id(group_id)
            .await?
            .ok_or_else(|| AuthzError::NotFound(format!("group {group_id} not found")))?;
        self.require_access_to_inherited_namespace_resource(group.full_path.as_str()).await
    }

    /// Runs a membership query and merges every row into the cache.
    async fn query(
        &self,
        query: &MembershipQuery,
    ) -> Result<Vec<NamespaceMembership>, AuthzError> {
        let rows = self.memberships.get_namespace_memberships(query).await?;
        for row in &rows {
            self.remember(row);
        }
        Ok(rows)
    }

    /// Merges one membership row under each of its keys.
    fn remember(&self, row: &NamespaceMembership) {
        self.cache.merge(CacheKey::Namespace(row.namespace.path.as_str().to_string()), row.role);
        if let Some(workspace_id) = &row.namespace.workspace_id {
            self.cache.merge(CacheKey::Workspace(workspace_id.clone()), row.role);
        }
        if let Some(group_id) = &row.namespace.group_id {
            self.cache.merge(CacheKey::Group(group_id.clone()), row.role);
        }
    }
}

#[async_trait]
impl Authorizer for NamespaceMembershipAuthorizer {
    async fn get_root_namespaces(&self) -> Result<Vec<String>, AuthzError> {
        let query =
            MembershipQuery::for_subject(self.subject.clone()).sorted(MembershipSort::PathAsc);
        let rows = self.query(&query).await?;
        let mut seen = BTreeSet::new();
        let mut roots = Vec::new();
        for row in rows {
            let path = row.namespace.path.as_str();
            if expand_path(path).iter().any(|ancestor| seen.contains(ancestor)) {
                continue;
            }
            seen.insert(path.to_string());
            roots.push(path.to_string());
        }
        Ok(roots)
    }

    async fn require_access(
        &self,
        role: Role,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        if constraints.lacks_namespace_scope() {
            return Err(AuthzError::InvalidConstraints(
                "missing required constraint: namespace_paths, group_id, or workspace_id"
                    .to_string(),
            ));
        }
        for path in &constraints.namespace_paths {
            self.require_access_to_namespace(path, role).await?;
        }
        if let Some(group_id) = &constraints.group_id {
            self.require_access_to_group(group_id, role).await?;
        }
        if let Some(workspace_id) = &constraints.workspace_id {
            self.require_access_to_workspace(workspace_id, role).await?;
        }
        Ok(())
    }

    async fn require_access_to_inheritable_resource(
        &self,
        _resource_type: ResourceType,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        if constraints.group_id.is_none() && constraints.namespace_paths.is_empty() {
            return Err(AuthzError::InvalidConstraints(
                "missing required constraint: namespace_paths or group_id".to_string(),
            ));
        }
        if let Some(group_id) = &constraints.group_id {
            self.require_access_to_inherited_group_resource(group_id).await?;
        }
        for path in &constraints.namespace_paths {
            self.require_access_to_inherited_namespace_resource(path).await?;
        }
        Ok(())
    }
}
