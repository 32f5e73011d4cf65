// crates/namespace-gate-authz/src/dispatch.rs
// ============================================================================
// Module: Permission Dispatch Helpers
// Description: Steps shared by every caller's permission dispatch.
// Purpose: Keep the maintenance gate, fallback, and denial shape in one place.
// Dependencies: namespace-gate-core, crate::authorizer
// ============================================================================

//! ## Overview
//! A caller resolves `require_permission` in a fixed order:
//!
//! 1. [`check_maintenance`] rejects mutating permissions while the platform
//!    is read-only (user, service account, and VCS link callers only).
//! 2. The caller's own handler table is consulted.
//! 3. Membership-backed callers fall back to [`require_role_for_permission`].
//! 4. Everything else is denied through [`unauthorized`].

use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::MaintenanceMonitor;
use namespace_gate_core::Permission;
use namespace_gate_core::PermissionModel;

use crate::authorizer::Authorizer;

/// Rejects mutating permissions while maintenance mode is active.
///
/// # Errors
///
/// Returns [`AuthzError::ServiceUnavailable`] for a mutating permission in
/// maintenance mode, or [`AuthzError::Upstream`] when the monitor fails.
pub async fn check_maintenance(
    monitor: &dyn MaintenanceMonitor,
    permission: Permission,
) -> Result<(), AuthzError> {
    if !permission.is_mutating() {
        return Ok(());
    }
    if monitor.in_maintenance_mode().await? {
        return Err(AuthzError::ServiceUnavailable(format!(
            "{permission} is unavailable while the system is in maintenance mode"
        )));
    }
    Ok(())
}

/// Requires the permission model's minimum role for `permission`.
///
/// # Errors
///
/// Returns the authorizer's denial or failure unchanged.
pub async fn require_role_for_permission(
    authorizer: &dyn Authorizer,
    permissions: &PermissionModel,
    permission: Permission,
    constraints: &Constraints,
) -> Result<(), AuthzError> {
    authorizer.require_access(permissions.required_role(permission), constraints).await
}

/// Builds a denial: `Forbidden` with viewer visibility, `NotFound` without.
#[must_use]
pub fn unauthorized(subject: &str, has_viewer_access: bool) -> AuthzError {
    if has_viewer_access {
        AuthzError::Forbidden(format!(
            "{subject} is not authorized to perform the requested operation"
        ))
    } else {
        AuthzError::NotFound(format!("resource not found or not visible to {subject}"))
    }
}
