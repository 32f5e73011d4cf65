//! Permission guard, audit sink, and configured wiring tests for namespace-gate-authz.
// crates/namespace-gate-authz/tests/guard.rs
// =============================================================================
// Module: Permission Guard Tests
// Description: Context resolution, audit events, and config-driven services.
// Purpose: Ensure every guarded check is decided once and audited once.
// =============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;
use std::sync::Arc;

use namespace_gate_authz::AuthzDecision;
use namespace_gate_authz::CallerContext;
use namespace_gate_authz::CallerKind;
use namespace_gate_authz::CallerServices;
use namespace_gate_authz::PermissionGuard;
use namespace_gate_authz::SystemCaller;
use namespace_gate_authz::audit_sink_from_config;
use namespace_gate_config::AuditConfig;
use namespace_gate_config::AuditSinkKind;
use namespace_gate_config::NamespaceGateConfig;
use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::Permission;
use namespace_gate_core::ResourceType;
use namespace_gate_core::Role;
use serde_json::Value;

mod common;

// ============================================================================
// SECTION: Guard Decisions
// ============================================================================

#[tokio::test]
async fn guard_records_allow_and_deny_decisions() {
    let store = common::seeded_store();
    common::grant_user(&store, "alice", "org/team", Role::Viewer);
    let (services, _monitor) = common::services(&store);
    let audit = Arc::new(common::RecordingAuditSink::default());
    let guard = PermissionGuard::new(audit.clone());
    let ctx = CallerContext::new(Arc::new(common::user_caller(&services, "alice", false)))
        .with_request_id("req-1");

    let ws1 = Constraints::new().with_workspace_id("ws-1");
    guard.require_permission(&ctx, Permission::VIEW_RUN, &ws1).await.unwrap();
    let err = guard.require_permission(&ctx, Permission::CREATE_RUN, &ws1).await.unwrap_err();
    assert!(matches!(err, AuthzError::Forbidden(_)), "{err}");

    let events = audit.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event, "authz_decision");
    assert_eq!(events[0].check, "permission:run:view");
    assert_eq!(events[0].decision, AuthzDecision::Allow);
    assert_eq!(events[0].request_id.as_deref(), Some("req-1"));
    assert_eq!(events[0].caller_kind, Some(CallerKind::User));
    assert_eq!(events[0].subject.as_deref(), Some("alice@example.com"));
    assert_eq!(events[0].error_kind, None);
    assert_eq!(events[1].check, "permission:run:create");
    assert_eq!(events[1].decision, AuthzDecision::Deny);
    assert_eq!(events[1].error_kind, Some("forbidden"));
    assert_eq!(events[1].reason.as_deref(), Some(err.to_string().as_str()));
}

#[tokio::test]
async fn guard_audits_inheritable_checks() {
    let audit = Arc::new(common::RecordingAuditSink::default());
    let guard = PermissionGuard::new(audit.clone());
    let ctx = CallerContext::new(Arc::new(SystemCaller::new()));
    let module = Constraints::new().with_namespace_paths(["org"]);
    guard
        .require_access_to_inheritable_resource(&ctx, ResourceType::TerraformModule, &module)
        .await
        .unwrap();
    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].check, "inheritable:terraform_module");
    assert_eq!(events[0].caller_kind, Some(CallerKind::System));
    assert_eq!(events[0].decision, AuthzDecision::Allow);
}

#[tokio::test]
async fn anonymous_context_is_unauthenticated() {
    let audit = Arc::new(common::RecordingAuditSink::default());
    let guard = PermissionGuard::new(audit.clone());
    let ctx = CallerContext::anonymous();
    let err = guard
        .require_permission(&ctx, Permission::VIEW_WORKSPACE, &Constraints::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::Unauthenticated(_)), "{err}");
    assert_eq!(err.kind().http_status(), 401);
    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].caller_kind, None);
    assert_eq!(events[0].subject, None);
    assert_eq!(events[0].error_kind, Some("unauthenticated"));
}

#[tokio::test]
async fn default_guard_discards_events() {
    let guard = PermissionGuard::default();
    let ctx = CallerContext::new(Arc::new(SystemCaller::new()));
    let unscoped = Constraints::new();
    guard.require_permission(&ctx, Permission::DELETE_WORKSPACE, &unscoped).await.unwrap();
}

// ============================================================================
// SECTION: Audit Sinks
// ============================================================================

#[tokio::test]
async fn file_sink_appends_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("authz.log");
    let config = AuditConfig {
        sink: AuditSinkKind::File,
        path: Some(path.to_string_lossy().into_owned()),
    };
    let guard = PermissionGuard::new(audit_sink_from_config(&config).unwrap());
    let ctx = CallerContext::anonymous().with_request_id("req-9");
    let _ = guard.require_permission(&ctx, Permission::VIEW_RUN, &Constraints::new()).await;
    let _ = guard.require_permission(&ctx, Permission::CREATE_RUN, &Constraints::new()).await;

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["event"], "authz_decision");
    assert_eq!(first["request_id"], "req-9");
    assert_eq!(first["check"], "permission:run:view");
    assert_eq!(first["decision"], "deny");
    assert_eq!(first["error_kind"], "unauthenticated");
    assert!(first["timestamp_ms"].is_number());
}

#[test]
fn file_sink_requires_a_path() {
    let config = AuditConfig {
        sink: AuditSinkKind::File,
        path: None,
    };
    assert!(audit_sink_from_config(&config).is_err());
}

#[test]
fn stderr_and_none_sinks_build_without_a_path() {
    for sink in [AuditSinkKind::Stderr, AuditSinkKind::None] {
        let config = AuditConfig {
            sink,
            path: None,
        };
        assert!(audit_sink_from_config(&config).is_ok());
    }
}

// ============================================================================
// SECTION: Configured Services
// ============================================================================

#[tokio::test]
async fn services_from_config_apply_maintenance_and_overrides() {
    let store = common::seeded_store();
    common::grant_user(&store, "alice", "org", Role::Maintainer);
    let config = NamespaceGateConfig::from_toml_str(
        r#"
[maintenance]
enabled = true

[permissions]
overrides = [{ permission = "workspace:view", role = "owner" }]
"#,
    )
    .unwrap();
    let services =
        CallerServices::from_config(&config, Arc::new(store.clone()), Arc::new(store.clone()))
            .unwrap();
    let caller = services.user_caller(common::user("alice", false));
    let ctx = CallerContext::new(Arc::new(caller));
    let guard = PermissionGuard::default();
    let ws1 = Constraints::new().with_workspace_id("ws-1");

    let err = guard.require_permission(&ctx, Permission::CREATE_RUN, &ws1).await.unwrap_err();
    assert!(matches!(err, AuthzError::ServiceUnavailable(_)), "{err}");
    assert_eq!(err.kind().http_status(), 503);
    let err = guard.require_permission(&ctx, Permission::VIEW_WORKSPACE, &ws1).await.unwrap_err();
    assert!(matches!(err, AuthzError::Forbidden(_)), "{err}");
    guard.require_permission(&ctx, Permission::VIEW_RUN, &ws1).await.unwrap();
}
