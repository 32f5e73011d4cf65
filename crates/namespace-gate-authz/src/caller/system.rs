// crates/namespace-gate-authz/src/caller/system.rs
// ============================================================================
// Module: System Caller
// Description: Caller for internal system operations.
// Purpose: Authorize background work that runs outside any user request.
// Dependencies: async-trait, namespace-gate-core
// ============================================================================

//! System caller: every check succeeds.

use async_trait::async_trait;
use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::Permission;
use namespace_gate_core::ResourceType;

use crate::caller::Caller;
use crate::caller::CallerKind;
use crate::caller::NamespaceAccessPolicy;

/// Caller representing the platform itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCaller;

impl SystemCaller {
    /// Creates the system caller.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Caller for SystemCaller {
    fn kind(&self) -> CallerKind {
        CallerKind::System
    }

    fn subject(&self) -> String {
        "system".to_string()
    }

    fn is_admin(&self) -> bool {
        true
    }

    async fn namespace_access_policy(&self) -> Result<NamespaceAccessPolicy, AuthzError> {
        Ok(NamespaceAccessPolicy::allow_all())
    }

    async fn require_permission(
        &self,
        _permission: Permission,
        _constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        Ok(())
    }

    async fn require_access_to_inheritable_resource(
        &self,
        _resource_type: ResourceType,
        _constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        Ok(())
    }
}
