// crates/namespace-gate-authz/src/guard.rs
// ============================================================================
// Module: Permission Guard
// Description: Request-level entry point for permission checks.
// Purpose: Resolve the caller from context, decide, and audit the decision.
// Dependencies: namespace-gate-core, crate::audit, crate::caller
// ============================================================================

//! ## Overview
//! Business logic calls the guard instead of the caller directly. The guard
//! pulls the caller out of the [`CallerContext`] (failing `Unauthenticated`
//! when there is none), runs the check, and records exactly one audit event
//! for the outcome before returning it unchanged.

use std::sync::Arc;

use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::Permission;
use namespace_gate_core::ResourceType;

use crate::audit::AuthzAuditEvent;
use crate::audit::AuthzAuditEventParams;
use crate::audit::AuthzAuditSink;
use crate::audit::AuthzDecision;
use crate::audit::NoopAuditSink;
use crate::caller::Caller;
use crate::caller::CallerContext;

/// Audited permission checks against the caller in a request context.
#[derive(Clone)]
pub struct PermissionGuard {
    /// Sink receiving one event per decision.
    audit: Arc<dyn AuthzAuditSink>,
}

impl Default for PermissionGuard {
    fn default() -> Self {
        Self::new(Arc::new(NoopAuditSink))
    }
}

impl PermissionGuard {
    /// Creates a guard recording decisions to `audit`.
    #[must_use]
    pub fn new(audit: Arc<dyn AuthzAuditSink>) -> Self {
        Self {
            audit,
        }
    }

    /// Requires `permission` for the caller in `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Unauthenticated`] when `ctx` has no caller, or
    /// the caller's error unchanged.
    pub async fn require_permission(
        &self,
        ctx: &CallerContext,
        permission: Permission,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        let check = format!("permission:{permission}");
        let result = match ctx.caller() {
            Ok(caller) => caller.require_permission(permission, constraints).await,
            Err(err) => Err(err),
        };
        self.record(ctx, check, &result);
        result
    }

    /// Requires access to an inheritable resource for the caller in `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Unauthenticated`] when `ctx` has no caller, or
    /// the caller's error unchanged.
    pub async fn require_access_to_inheritable_resource(
        &self,
        ctx: &CallerContext,
        resource_type: ResourceType,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        let check = format!("inheritable:{resource_type}");
        let result = match ctx.caller() {
            Ok(caller) => {
                caller.require_access_to_inheritable_resource(resource_type, constraints).await
            }
            Err(err) => Err(err),
        };
        self.record(ctx, check, &result);
        result
    }

    /// Records the outcome of one check.
    fn record(&self, ctx: &CallerContext, check: String, result: &Result<(), AuthzError>) {
        let caller: Option<&dyn Caller> = ctx.caller().ok();
        let (decision, error_kind, reason) = match result {
            Ok(()) => (AuthzDecision::Allow, None, None),
            Err(err) => (AuthzDecision::Deny, Some(err.kind().as_str()), Some(err.to_string())),
        };
        self.audit.record(&AuthzAuditEvent::new(AuthzAuditEventParams {
            event: "authz_decision",
            request_id: ctx.request_id().map(ToString::to_string),
            caller_kind: caller.map(Caller::kind),
            subject: caller.map(Caller::subject),
            check,
            decision,
            error_kind,
            reason,
        }));
    }
}
