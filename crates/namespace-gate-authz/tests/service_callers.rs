//! Service account, VCS link, SCIM, and system caller tests for namespace-gate-authz.
// crates/namespace-gate-authz/tests/service_callers.rs
// =============================================================================
// Module: Service Caller Tests
// Description: Runner assignment, whitelists, and provisioning checks.
// Purpose: Ensure platform integrations stay inside their narrow grants.
// =============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;

use namespace_gate_authz::Caller;
use namespace_gate_authz::CallerKind;
use namespace_gate_authz::NamespaceAccessPolicy;
use namespace_gate_authz::ScimCaller;
use namespace_gate_authz::SubjectCaller;
use namespace_gate_authz::SystemCaller;
use namespace_gate_authz::VcsWorkspaceLinkCaller;
use namespace_gate_core::Action;
use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::Permission;
use namespace_gate_core::ResourceType;
use namespace_gate_core::Role;
use namespace_gate_core::RunnerId;
use namespace_gate_core::ServiceAccountId;
use namespace_gate_core::StaticMaintenanceMonitor;
use namespace_gate_core::Team;
use namespace_gate_core::VcsProviderId;
use namespace_gate_core::WorkspaceVcsLinkId;

mod common;

// ============================================================================
// SECTION: Service Account Caller
// ============================================================================

#[tokio::test]
async fn service_account_claims_jobs_only_for_assigned_runners() {
    let store = common::seeded_store();
    store.assign_runner(RunnerId::new("runner-1"), ServiceAccountId::new("sa-1"));
    let (services, _monitor) = common::services(&store);
    let caller =
        services.service_account_caller(ServiceAccountId::new("sa-1"), common::path("org/robot"));
    let assigned = Constraints::new().with_runner_id("runner-1");
    caller.require_permission(Permission::CLAIM_JOB, &assigned).await.unwrap();
    caller.require_permission(Permission::CREATE_RUNNER_SESSION, &assigned).await.unwrap();
    let other = Constraints::new().with_runner_id("runner-2");
    let err = caller.require_permission(Permission::CLAIM_JOB, &other).await.unwrap_err();
    assert!(matches!(err, AuthzError::NotFound(_)), "{err}");
    let missing = Constraints::new();
    let err = caller.require_permission(Permission::UPDATE_RUNNER_SESSION, &missing).await;
    assert!(matches!(err, Err(AuthzError::InvalidConstraints(_))));
}

#[tokio::test]
async fn service_account_falls_back_to_memberships() {
    let store = common::seeded_store();
    common::grant_service_account(&store, "sa-1", "org", Role::Deployer);
    let (services, _monitor) = common::services(&store);
    let caller =
        services.service_account_caller(ServiceAccountId::new("sa-1"), common::path("org/robot"));
    let ws2 = Constraints::new().with_workspace_id("ws-2");
    caller.require_permission(Permission::CREATE_RUN, &ws2).await.unwrap();
    let err = caller.require_permission(Permission::UPDATE_WORKSPACE, &ws2).await.unwrap_err();
    assert!(matches!(err, AuthzError::Forbidden(_)), "{err}");
    let ws3 = Constraints::new().with_workspace_id("ws-3");
    let err = caller.require_permission(Permission::VIEW_RUN, &ws3).await.unwrap_err();
    assert!(matches!(err, AuthzError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn service_account_is_gated_by_maintenance() {
    let store = common::seeded_store();
    store.assign_runner(RunnerId::new("runner-1"), ServiceAccountId::new("sa-1"));
    let (services, monitor) = common::services(&store);
    monitor.set_enabled(true);
    let caller =
        services.service_account_caller(ServiceAccountId::new("sa-1"), common::path("org/robot"));
    let err = caller
        .require_permission(Permission::CLAIM_JOB, &Constraints::new().with_runner_id("runner-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::ServiceUnavailable(_)), "{err}");
}

#[tokio::test]
async fn service_account_identity_and_policy() {
    let store = common::seeded_store();
    common::grant_service_account(&store, "sa-1", "org/team", Role::Viewer);
    let (services, _monitor) = common::services(&store);
    let caller =
        services.service_account_caller(ServiceAccountId::new("sa-1"), common::path("org/robot"));
    assert_eq!(caller.kind(), CallerKind::ServiceAccount);
    assert_eq!(caller.subject(), "org/robot");
    assert!(!caller.is_admin());
    let subject = SubjectCaller::from_caller(&caller).unwrap();
    assert_eq!(subject.service_account_id(), Some(&ServiceAccountId::new("sa-1")));
    let policy = caller.namespace_access_policy().await.unwrap();
    assert_eq!(policy, NamespaceAccessPolicy::roots(vec!["org/team".to_string()]));
}

// ============================================================================
// SECTION: VCS Workspace Link
// ============================================================================

/// Builds a link caller for `ws-1` and its maintenance monitor.
fn vcs_caller() -> (VcsWorkspaceLinkCaller, StaticMaintenanceMonitor) {
    let monitor = StaticMaintenanceMonitor::new(false);
    let caller = VcsWorkspaceLinkCaller::new(
        VcsProviderId::new("github-1"),
        WorkspaceVcsLinkId::new("link-1"),
        "ws-1".into(),
        common::path("org/team/ws1"),
        Arc::new(monitor.clone()),
    );
    (caller, monitor)
}

#[tokio::test]
async fn vcs_link_allows_whitelisted_permissions_in_its_workspace() {
    let (caller, _monitor) = vcs_caller();
    let own = Constraints::new().with_workspace_id("ws-1");
    for permission in [
        Permission::VIEW_WORKSPACE,
        Permission::CREATE_WORKSPACE,
        Permission::VIEW_RUN,
        Permission::CREATE_RUN,
        Permission::VIEW_CONFIGURATION_VERSION,
        Permission::CREATE_CONFIGURATION_VERSION,
        Permission::UPDATE_CONFIGURATION_VERSION,
    ] {
        caller.require_permission(permission, &own).await.unwrap();
    }
}

#[tokio::test]
async fn vcs_link_denies_other_workspaces_and_permissions() {
    let (caller, _monitor) = vcs_caller();
    let other = Constraints::new().with_workspace_id("ws-2");
    let err = caller.require_permission(Permission::CREATE_RUN, &other).await.unwrap_err();
    assert!(matches!(err, AuthzError::NotFound(_)), "{err}");
    let own = Constraints::new().with_workspace_id("ws-1");
    let err = caller.require_permission(Permission::DELETE_WORKSPACE, &own).await.unwrap_err();
    assert!(matches!(err, AuthzError::NotFound(_)), "{err}");
    let err = caller.require_permission(Permission::VIEW_RUN, &Constraints::new()).await;
    assert!(matches!(err, Err(AuthzError::InvalidConstraints(_))));
    let module = Constraints::new().with_namespace_paths(["org"]);
    let err = caller
        .require_access_to_inheritable_resource(ResourceType::TerraformModule, &module)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn vcs_link_is_gated_by_maintenance() {
    let (caller, monitor) = vcs_caller();
    monitor.set_enabled(true);
    let own = Constraints::new().with_workspace_id("ws-1");
    let err = caller.require_permission(Permission::CREATE_RUN, &own).await.unwrap_err();
    assert!(matches!(err, AuthzError::ServiceUnavailable(_)), "{err}");
    caller.require_permission(Permission::VIEW_RUN, &own).await.unwrap();
}

#[tokio::test]
async fn vcs_link_identity_and_policy() {
    let (caller, _monitor) = vcs_caller();
    assert_eq!(caller.kind(), CallerKind::VcsWorkspaceLink);
    assert_eq!(caller.subject(), "vcs provider github-1 workspace link link-1");
    assert_eq!(caller.provider_id().as_str(), "github-1");
    assert_eq!(caller.link_id().as_str(), "link-1");
    assert_eq!(caller.workspace_id().as_str(), "ws-1");
    let policy = caller.namespace_access_policy().await.unwrap();
    assert_eq!(policy, NamespaceAccessPolicy::roots(vec!["org".to_string()]));
}

// ============================================================================
// SECTION: SCIM
// ============================================================================

#[tokio::test]
async fn scim_creates_and_updates_teams_and_users() {
    let store = common::seeded_store();
    let caller = ScimCaller::new(Arc::new(store));
    for permission in [
        Permission::CREATE_TEAM,
        Permission::UPDATE_TEAM,
        Permission::CREATE_USER,
        Permission::UPDATE_USER,
    ] {
        caller.require_permission(permission, &Constraints::new()).await.unwrap();
    }
    let workspace = Constraints::new().with_workspace_id("ws-1");
    let err =
        caller.require_permission(Permission::VIEW_WORKSPACE, &workspace).await.unwrap_err();
    assert!(matches!(err, AuthzError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn scim_deletes_only_provisioned_teams() {
    let store = common::seeded_store();
    store.add_team(Team {
        id: "team-scim".into(),
        name: "provisioned".to_string(),
        scim_external_id: Some("ext-1".to_string()),
    });
    store.add_team(Team {
        id: "team-local".into(),
        name: "local".to_string(),
        scim_external_id: Some(String::new()),
    });
    let caller = ScimCaller::new(Arc::new(store));
    let delete = Permission::DELETE_TEAM;
    caller.require_permission(delete, &Constraints::new().with_team_id("team-scim")).await.unwrap();
    for team_id in ["team-local", "missing"] {
        let constraints = Constraints::new().with_team_id(team_id);
        let err = caller.require_permission(delete, &constraints).await;
        assert!(matches!(err, Err(AuthzError::NotFound(_))), "{team_id}");
    }
    let err = caller.require_permission(delete, &Constraints::new()).await;
    assert!(matches!(err, Err(AuthzError::InvalidConstraints(_))));
}

#[tokio::test]
async fn scim_deletes_only_provisioned_users() {
    let store = common::seeded_store();
    let mut provisioned = common::user("u-scim", false);
    provisioned.scim_external_id = Some("ext-2".to_string());
    store.add_user(provisioned);
    store.add_user(common::user("u-local", false));
    let caller = ScimCaller::new(Arc::new(store));
    let delete = Permission::DELETE_USER;
    caller.require_permission(delete, &Constraints::new().with_user_id("u-scim")).await.unwrap();
    let err = caller.require_permission(delete, &Constraints::new().with_user_id("u-local")).await;
    assert!(matches!(err, Err(AuthzError::NotFound(_))));
    let err = caller.require_permission(delete, &Constraints::new()).await;
    assert!(matches!(err, Err(AuthzError::InvalidConstraints(_))));
}

#[tokio::test]
async fn scim_has_no_namespace_visibility() {
    let store = common::seeded_store();
    let caller = ScimCaller::new(Arc::new(store));
    assert_eq!(caller.kind(), CallerKind::Scim);
    assert_eq!(caller.subject(), "scim");
    let policy = caller.namespace_access_policy().await.unwrap();
    assert_eq!(policy, NamespaceAccessPolicy::none());
    assert!(!policy.allows("org"));
    let paths = Constraints::new().with_namespace_paths(["org"]);
    let err = caller
        .require_access_to_inheritable_resource(ResourceType::TerraformProvider, &paths)
        .await;
    assert!(matches!(err, Err(AuthzError::NotFound(_))));
}

// ============================================================================
// SECTION: System
// ============================================================================

#[tokio::test]
async fn system_caller_is_granted_everything() {
    let caller = SystemCaller::new();
    assert_eq!(caller.kind(), CallerKind::System);
    assert_eq!(caller.subject(), "system");
    assert!(caller.is_admin());
    for resource_type in ResourceType::ALL {
        for action in Action::ALL {
            let permission = Permission::new(resource_type, action);
            caller.require_permission(permission, &Constraints::new()).await.unwrap();
        }
        let unscoped = Constraints::new();
        caller.require_access_to_inheritable_resource(resource_type, &unscoped).await.unwrap();
    }
    let policy = caller.namespace_access_policy().await.unwrap();
    assert!(policy.allow_all);
    assert!(policy.allows("anything/at/all"));
}
