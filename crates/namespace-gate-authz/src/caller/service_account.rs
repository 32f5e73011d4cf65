// crates/namespace-gate-authz/src/caller/service_account.rs
// ============================================================================
// Module: Service Account Caller
// Description: Caller for machine identities holding namespace memberships.
// Purpose: Apply runner assignment rules and namespace membership roles.
// Dependencies: async-trait, namespace-gate-core, crate::authorizer
// ============================================================================

//! ## Overview
//! Service accounts are membership-backed like users but never admins.
//! Claiming jobs and managing runner sessions require the service account
//! to be assigned to the runner named in the constraints; everything else
//! goes through the namespace membership authorizer.

use std::sync::Arc;

use async_trait::async_trait;
use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::NamespacePath;
use namespace_gate_core::Permission;
use namespace_gate_core::ResourceType;
use namespace_gate_core::ServiceAccountId;
use namespace_gate_core::require_constraint;

use crate::authorizer::Authorizer;
use crate::caller::Caller;
use crate::caller::CallerKind;
use crate::caller::CallerServices;
use crate::caller::NamespaceAccessPolicy;
use crate::caller::SubjectCaller;
use crate::dispatch::check_maintenance;
use crate::dispatch::require_role_for_permission;

/// Permission handlers specific to service accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServiceAccountHandler {
    /// The service account must be assigned to the constrained runner.
    RunnerAssignment,
}

/// Returns the service account handler for `permission`, if any.
const fn service_account_handler(permission: Permission) -> Option<ServiceAccountHandler> {
    match permission {
        Permission::CLAIM_JOB
        | Permission::CREATE_RUNNER_SESSION
        | Permission::UPDATE_RUNNER_SESSION => Some(ServiceAccountHandler::RunnerAssignment),
        _ => None,
    }
}

/// Caller representing an authenticated service account.
pub struct ServiceAccountCaller {
    /// Service account identifier.
    id: ServiceAccountId,
    /// Resource path of the service account (`<namespace>/<name>`).
    resource_path: NamespacePath,
    /// Request-scoped membership authorizer.
    authorizer: Arc<dyn Authorizer>,
    /// Shared backends.
    services: CallerServices,
}

impl ServiceAccountCaller {
    /// Creates a service account caller.
    #[must_use]
    pub fn new(
        id: ServiceAccountId,
        resource_path: NamespacePath,
        authorizer: Arc<dyn Authorizer>,
        services: CallerServices,
    ) -> Self {
        Self {
            id,
            resource_path,
            authorizer,
            services,
        }
    }

    /// Returns the service account identifier.
    #[must_use]
    pub const fn id(&self) -> &ServiceAccountId {
        &self.id
    }

    /// Returns the service account resource path.
    #[must_use]
    pub const fn resource_path(&self) -> &NamespacePath {
        &self.resource_path
    }

    /// Returns the membership authorizer for this request.
    #[must_use]
    pub fn authorizer(&self) -> &dyn Authorizer {
        self.authorizer.as_ref()
    }

    /// Requires the service account to be assigned to the constrained runner.
    async fn require_runner_assignment(&self, constraints: &Constraints) -> Result<(), AuthzError> {
        let runner_id = require_constraint(constraints.runner_id.as_ref(), "runner_id")?;
        let assigned = self.services.entities.get_service_accounts_for_runner(runner_id).await?;
        if assigned.contains(&self.id) {
            Ok(())
        } else {
            Err(self.unauthorized_error(false))
        }
    }
}

#[async_trait]
impl Caller for ServiceAccountCaller {
    fn kind(&self) -> CallerKind {
        CallerKind::ServiceAccount
    }

    fn subject(&self) -> String {
        self.resource_path.to_string()
    }

    async fn namespace_access_policy(&self) -> Result<NamespaceAccessPolicy, AuthzError> {
        Ok(NamespaceAccessPolicy::roots(self.authorizer.get_root_namespaces().await?))
    }

    async fn require_permission(
        &self,
        permission: Permission,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        check_maintenance(self.services.maintenance.as_ref(), permission).await?;
        match service_account_handler(permission) {
            Some(ServiceAccountHandler::RunnerAssignment) => {
                self.require_runner_assignment(constraints).await
            }
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
        self.authorizer.require_access_to_inheritable_resource(resource_type, constraints).await
    }

    fn subject_caller(&self) -> Option<SubjectCaller<'_>> {
        Some(SubjectCaller::ServiceAccount(self))
    }
}
