// crates/namespace-gate-authz/src/caller/vcs.rs
// ============================================================================
// Module: VCS Workspace Link Caller
// Description: Caller for a VCS integration linked to one workspace.
// Purpose: Let webhook-driven runs start in the linked workspace only.
// Dependencies: async-trait, namespace-gate-core
// ============================================================================

//! VCS workspace link caller: a fixed whitelist bound to one workspace.

use std::sync::Arc;

use async_trait::async_trait;
use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::MaintenanceMonitor;
use namespace_gate_core::NamespacePath;
use namespace_gate_core::Permission;
use namespace_gate_core::ResourceType;
use namespace_gate_core::VcsProviderId;
use namespace_gate_core::WorkspaceId;
use namespace_gate_core::WorkspaceVcsLinkId;
use namespace_gate_core::require_constraint;

use crate::caller::Caller;
use crate::caller::CallerKind;
use crate::caller::NamespaceAccessPolicy;
use crate::dispatch::check_maintenance;

/// Returns true when the link may perform `permission` in its workspace.
const fn is_link_permission(permission: Permission) -> bool {
    matches!(
        permission,
        Permission::VIEW_WORKSPACE
            | Permission::CREATE_WORKSPACE
            | Permission::VIEW_RUN
            | Permission::CREATE_RUN
            | Permission::VIEW_CONFIGURATION_VERSION
            | Permission::CREATE_CONFIGURATION_VERSION
            | Permission::UPDATE_CONFIGURATION_VERSION
    )
}

/// Caller representing a workspace's VCS provider link.
pub struct VcsWorkspaceLinkCaller {
    /// VCS provider the link belongs to.
    provider_id: VcsProviderId,
    /// Link identifier.
    link_id: WorkspaceVcsLinkId,
    /// Linked workspace.
    workspace_id: WorkspaceId,
    /// Full path of the linked workspace.
    workspace_path: NamespacePath,
    /// Maintenance mode monitor.
    maintenance: Arc<dyn MaintenanceMonitor>,
}

impl VcsWorkspaceLinkCaller {
    /// Creates a VCS workspace link caller.
    #[must_use]
    pub const fn new(
        provider_id: VcsProviderId,
        link_id: WorkspaceVcsLinkId,
        workspace_id: WorkspaceId,
        workspace_path: NamespacePath,
        maintenance: Arc<dyn MaintenanceMonitor>,
    ) -> Self {
        Self {
            provider_id,
            link_id,
            workspace_id,
            workspace_path,
            maintenance,
        }
    }

    /// Returns the VCS provider identifier.
    #[must_use]
    pub const fn provider_id(&self) -> &VcsProviderId {
        &self.provider_id
    }

    /// Returns the link identifier.
    #[must_use]
    pub const fn link_id(&self) -> &WorkspaceVcsLinkId {
        &self.link_id
    }

    /// Returns the linked workspace identifier.
    #[must_use]
    pub const fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }
}

#[async_trait]
impl Caller for VcsWorkspaceLinkCaller {
    fn kind(&self) -> CallerKind {
        CallerKind::VcsWorkspaceLink
    }

    fn subject(&self) -> String {
        format!("vcs provider {} workspace link {}", self.provider_id, self.link_id)
    }

    async fn namespace_access_policy(&self) -> Result<NamespaceAccessPolicy, AuthzError> {
        Ok(NamespaceAccessPolicy::roots(vec![self.workspace_path.root().to_string()]))
    }

    async fn require_permission(
        &self,
        permission: Permission,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        check_maintenance(self.maintenance.as_ref(), permission).await?;
        if !is_link_permission(permission) {
            return Err(self.unauthorized_error(false));
        }
        let workspace_id = require_constraint(constraints.workspace_id.as_ref(), "workspace_id")?;
        if workspace_id == &self.workspace_id {
            Ok(())
        } else {
            Err(self.unauthorized_error(false))
        }
    }

    async fn require_access_to_inheritable_resource(
        &self,
        _resource_type: ResourceType,
        _constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        Err(self.unauthorized_error(false))
    }
}
