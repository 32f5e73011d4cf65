//! Permission, action, and role model tests.
// crates/namespace-gate-core/tests/permission.rs
// ============================================================================
// Module: Permission Model Tests
// Description: Tests for permission labels, role ordering, and role defaults.
// Purpose: Ensure the closed permission vocabulary is stable and overridable.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use namespace_gate_core::Action;
use namespace_gate_core::AuthzError;
use namespace_gate_core::ErrorKind;
use namespace_gate_core::Permission;
use namespace_gate_core::PermissionModel;
use namespace_gate_core::PermissionParseError;
use namespace_gate_core::ResourceType;
use namespace_gate_core::Role;
use namespace_gate_core::StoreError;

#[test]
fn roles_are_totally_ordered() {
    assert!(Role::Owner.gte(Role::Maintainer));
    assert!(Role::Maintainer.gte(Role::Deployer));
    assert!(Role::Deployer.gte(Role::Viewer));
    assert!(Role::Viewer.gte(Role::Viewer));
    assert!(!Role::Viewer.gte(Role::Deployer));
    assert_eq!("maintainer".parse::<Role>().unwrap(), Role::Maintainer);
    assert!("admin".parse::<Role>().is_err());
}

#[test]
fn only_view_actions_are_read_only() {
    assert!(!Action::View.is_mutating());
    assert!(!Action::ViewValue.is_mutating());
    for action in [Action::Create, Action::Update, Action::Delete, Action::Claim] {
        assert!(action.is_mutating(), "{action} should mutate");
    }
}

#[test]
fn permission_labels_round_trip_through_from_str() {
    for resource in ResourceType::ALL {
        for action in Action::ALL {
            let permission = Permission::new(resource, action);
            let parsed: Permission = permission.to_string().parse().unwrap();
            assert_eq!(parsed, permission);
        }
    }
    assert_eq!(Permission::VIEW_VARIABLE_VALUE.to_string(), "variable:view_value");
}

#[test]
fn permission_parse_rejects_unknown_labels() {
    assert_eq!(
        "workspace".parse::<Permission>(),
        Err(PermissionParseError::Malformed("workspace".to_string()))
    );
    assert_eq!(
        "bucket:view".parse::<Permission>(),
        Err(PermissionParseError::UnknownResourceType("bucket".to_string()))
    );
    assert_eq!(
        "workspace:destroy".parse::<Permission>(),
        Err(PermissionParseError::UnknownAction("destroy".to_string()))
    );
}

#[test]
fn default_model_roles() {
    let model = PermissionModel::new();
    assert_eq!(model.required_role(Permission::VIEW_WORKSPACE), Role::Viewer);
    assert_eq!(model.required_role(Permission::VIEW_VARIABLE_VALUE), Role::Deployer);
    assert_eq!(model.required_role(Permission::CREATE_RUN), Role::Deployer);
    assert_eq!(model.required_role(Permission::CREATE_WORKSPACE), Role::Maintainer);
    assert_eq!(model.required_role(Permission::CREATE_NAMESPACE_MEMBERSHIP), Role::Owner);
}

#[test]
fn overrides_take_precedence() {
    let model =
        PermissionModel::new().with_override(Permission::VIEW_VARIABLE_VALUE, Role::Maintainer);
    assert_eq!(model.required_role(Permission::VIEW_VARIABLE_VALUE), Role::Maintainer);
    assert_eq!(model.required_role(Permission::VIEW_VARIABLE), Role::Viewer);
}

#[test]
fn error_kinds_map_to_http_status() {
    let cases = [
        (AuthzError::Unauthenticated("x".to_string()), 401),
        (AuthzError::Forbidden("x".to_string()), 403),
        (AuthzError::NotFound("x".to_string()), 404),
        (AuthzError::ServiceUnavailable("x".to_string()), 503),
        (AuthzError::InvalidConstraints("x".to_string()), 500),
        (AuthzError::Upstream(StoreError::Store("x".to_string())), 502),
    ];
    for (error, status) in cases {
        assert_eq!(error.kind().http_status(), status);
    }
    assert!(AuthzError::NotFound("x".to_string()).is_denial());
    assert!(!AuthzError::Upstream(StoreError::Store("x".to_string())).is_denial());
}

#[test]
fn upstream_errors_keep_their_message() {
    let error = AuthzError::from(StoreError::Unavailable("db down".to_string()));
    assert_eq!(error.kind(), ErrorKind::Upstream);
    assert_eq!(error.to_string(), "store unavailable: db down");
}
