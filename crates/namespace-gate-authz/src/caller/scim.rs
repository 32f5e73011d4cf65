// crates/namespace-gate-authz/src/caller/scim.rs
// ============================================================================
// Module: SCIM Caller
// Description: Caller for an identity provider's SCIM provisioning client.
// Purpose: Allow user and team provisioning without namespace access.
// Dependencies: async-trait, namespace-gate-core
// ============================================================================

//! ## Overview
//! SCIM clients create and update users and teams. They may delete only the
//! users and teams they provisioned, recognized by a non-empty SCIM external
//! id on the record. Every other check is denied as `NotFound`.

use std::sync::Arc;

use async_trait::async_trait;
use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::EntityStore;
use namespace_gate_core::Permission;
use namespace_gate_core::ResourceType;
use namespace_gate_core::require_constraint;

use crate::caller::Caller;
use crate::caller::CallerKind;
use crate::caller::NamespaceAccessPolicy;

/// Permission handlers available to SCIM clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScimHandler {
    /// Always allowed.
    Allow,
    /// Allowed for SCIM-provisioned teams.
    DeleteProvisionedTeam,
    /// Allowed for SCIM-provisioned users.
    DeleteProvisionedUser,
}

/// Returns the SCIM handler for `permission`, if any.
const fn scim_handler(permission: Permission) -> Option<ScimHandler> {
    match permission {
        Permission::CREATE_TEAM
        | Permission::UPDATE_TEAM
        | Permission::CREATE_USER
        | Permission::UPDATE_USER => Some(ScimHandler::Allow),
        Permission::DELETE_TEAM => Some(ScimHandler::DeleteProvisionedTeam),
        Permission::DELETE_USER => Some(ScimHandler::DeleteProvisionedUser),
        _ => None,
    }
}

/// Caller representing a SCIM provisioning client.
pub struct ScimCaller {
    /// Entity lookup backend.
    entities: Arc<dyn EntityStore>,
}

impl ScimCaller {
    /// Creates a SCIM caller.
    #[must_use]
    pub const fn new(entities: Arc<dyn EntityStore>) -> Self {
        Self {
            entities,
        }
    }
}

#[async_trait]
impl Caller for ScimCaller {
    fn kind(&self) -> CallerKind {
        CallerKind::Scim
    }

    fn subject(&self) -> String {
        "scim".to_string()
    }

    async fn namespace_access_policy(&self) -> Result<NamespaceAccessPolicy, AuthzError> {
        Ok(NamespaceAccessPolicy::none())
    }

    async fn require_permission(
        &self,
        permission: Permission,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        let provisioned = match scim_handler(permission) {
            Some(ScimHandler::Allow) => return Ok(()),
            Some(ScimHandler::DeleteProvisionedTeam) => {
                let team_id = require_constraint(constraints.team_id.as_ref(), "team_id")?;
                let team = self.entities.get_team_by_id(team_id).await?;
                team.is_some_and(|team| team.is_scim_provisioned())
            }
            Some(ScimHandler::DeleteProvisionedUser) => {
                let user_id = require_constraint(constraints.user_id.as_ref(), "user_id")?;
                let user = self.entities.get_user_by_id(user_id).await?;
                user.is_some_and(|user| user.is_scim_provisioned())
            }
            None => false,
        };
        if provisioned { Ok(()) } else { Err(self.unauthorized_error(false)) }
    }

    async fn require_access_to_inheritable_resource(
        &self,
        _resource_type: ResourceType,
        _constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        Err(self.unauthorized_error(false))
    }
}
