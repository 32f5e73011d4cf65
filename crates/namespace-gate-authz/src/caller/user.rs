// crates/namespace-gate-authz/src/caller/user.rs
// ============================================================================
// Module: User Caller
// Description: Caller for human users.
// Purpose: Apply admin bypass, team rules, and namespace membership roles.
// Dependencies: async-trait, namespace-gate-core, crate::authorizer
// ============================================================================

//! ## Overview
//! Users are checked in this order: the maintenance gate, the admin bypass,
//! the user handler table (team and user administration), then the
//! namespace membership authorizer with the permission model's minimum role.
//! Team and user administration is never granted through namespace roles.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::Permission;
use namespace_gate_core::ResourceType;
use namespace_gate_core::TeamId;
use namespace_gate_core::User;
use namespace_gate_core::require_constraint;

use crate::authorizer::Authorizer;
use crate::caller::Caller;
use crate::caller::CallerKind;
use crate::caller::CallerServices;
use crate::caller::NamespaceAccessPolicy;
use crate::caller::SubjectCaller;
use crate::dispatch::check_maintenance;
use crate::dispatch::require_role_for_permission;

// ============================================================================
// SECTION: Handler Table
// ============================================================================

/// Permission handlers specific to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserHandler {
    /// Only administrators may perform the permission.
    AdminOnly,
    /// Team maintainers may update their team.
    TeamMaintainer,
}

/// Returns the user handler for `permission`, if any.
const fn user_handler(permission: Permission) -> Option<UserHandler> {
    match permission {
        Permission::CREATE_TEAM
        | Permission::DELETE_TEAM
        | Permission::CREATE_USER
        | Permission::UPDATE_USER
        | Permission::DELETE_USER => Some(UserHandler::AdminOnly),
        Permission::UPDATE_TEAM => Some(UserHandler::TeamMaintainer),
        _ => None,
    }
}

// ============================================================================
// SECTION: User Caller
// ============================================================================

/// Caller representing an authenticated human user.
pub struct UserCaller {
    /// User record.
    user: User,
    /// Request-scoped membership authorizer.
    authorizer: Arc<dyn Authorizer>,
    /// Shared backends.
    services: CallerServices,
}

impl UserCaller {
    /// Creates a user caller.
    #[must_use]
    pub fn new(user: User, authorizer: Arc<dyn Authorizer>, services: CallerServices) -> Self {
        Self {
            user,
            authorizer,
            services,
        }
    }

    /// Returns the user record.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// Returns the membership authorizer for this request.
    #[must_use]
    pub fn authorizer(&self) -> &dyn Authorizer {
        self.authorizer.as_ref()
    }

    /// Requires the user to maintain the team named in `constraints`.
    async fn require_team_maintainer(&self, constraints: &Constraints) -> Result<(), AuthzError> {
        let team_id: &TeamId = require_constraint(constraints.team_id.as_ref(), "team_id")?;
        let member = self.services.entities.get_team_member(&self.user.id, team_id).await;
        match member {
            Ok(Some(member)) if member.is_maintainer => Ok(()),
            Ok(_) | Err(_) => Err(self.unauthorized_error(true)),
        }
    }
}

#[async_trait]
impl Caller for UserCaller {
    fn kind(&self) -> CallerKind {
        CallerKind::User
    }

    fn subject(&self) -> String {
        self.user.username.clone()
    }

    fn is_admin(&self) -> bool {
        self.user.admin
    }

    async fn namespace_access_policy(&self) -> Result<NamespaceAccessPolicy, AuthzError> {
        if self.user.admin {
            return Ok(NamespaceAccessPolicy::allow_all());
        }
        Ok(NamespaceAccessPolicy::roots(self.authorizer.get_root_namespaces().await?))
    }

    async fn require_permission(
        &self,
        permission: Permission,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        check_maintenance(self.services.maintenance.as_ref(), permission).await?;
        if self.user.admin {
            return Ok(());
        }
        match user_handler(permission) {
            Some(UserHandler::AdminOnly) => Err(self.unauthorized_error(true)),
            Some(UserHandler::TeamMaintainer) => self.require_team_maintainer(constraints).await,
            None => {
                require_role_for_permission(
                    self.authorizer.as_ref(),
                    &self.services.permissions,
                    permission,
                    constraints,
                )
                .await
            }
        }
    }

    async fn require_access_to_inheritable_resource(
        &self,
        resource_type: ResourceType,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        if self.user.admin {
            return Ok(());
        }
        self.authorizer.require_access_to_inheritable_resource(resource_type, constraints).await
    }

    fn subject_caller(&self) -> Option<SubjectCaller<'_>> {
        Some(SubjectCaller::User(self))
    }
}
