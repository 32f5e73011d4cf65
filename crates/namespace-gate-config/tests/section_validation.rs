//! Section validation tests for namespace-gate-config.
// crates/namespace-gate-config/tests/section_validation.rs
// =============================================================================
// Module: Config Section Validation Tests
// Description: Validate permissions, trust policy, and audit sections.
// Purpose: Ensure invalid values fail closed with descriptive messages.
// =============================================================================

use namespace_gate_config::AuditSinkKind;
use namespace_gate_config::NamespaceGateConfig;
use namespace_gate_core::Permission;
use namespace_gate_core::Role;

mod common;

use common::assert_invalid;

type TestResult = Result<(), String>;

#[test]
fn default_config_validates() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.maintenance.enabled || config.audit.sink != AuditSinkKind::Stderr {
        return Err("unexpected defaults".to_string());
    }
    Ok(())
}

#[test]
fn permission_overrides_apply_to_model() -> TestResult {
    let config = NamespaceGateConfig::from_toml_str(
        r#"
[permissions]
overrides = [
  { permission = "variable:view_value", role = "maintainer" },
  { permission = "workspace:create", role = "owner" },
]
"#,
    )
    .map_err(|err| err.to_string())?;
    let model = config.permission_model().map_err(|err| err.to_string())?;
    if model.required_role(Permission::VIEW_VARIABLE_VALUE) != Role::Maintainer {
        return Err("variable:view_value override not applied".to_string());
    }
    if model.required_role(Permission::CREATE_WORKSPACE) != Role::Owner {
        return Err("workspace:create override not applied".to_string());
    }
    if model.required_role(Permission::VIEW_WORKSPACE) != Role::Viewer {
        return Err("defaults should remain for other permissions".to_string());
    }
    Ok(())
}

#[test]
fn unknown_permission_is_rejected() -> TestResult {
    assert_invalid(
        NamespaceGateConfig::from_toml_str(
            "[permissions]\noverrides = [{ permission = \"bucket:view\", role = \"viewer\" }]",
        ),
        "unknown resource type: bucket",
    )
}

#[test]
fn unknown_role_is_rejected() -> TestResult {
    assert_invalid(
        NamespaceGateConfig::from_toml_str(
            "[permissions]\noverrides = [{ permission = \"run:create\", role = \"admin\" }]",
        ),
        "permissions.overrides",
    )
}

#[test]
fn duplicate_override_is_rejected() -> TestResult {
    assert_invalid(
        NamespaceGateConfig::from_toml_str(
            r#"
[permissions]
overrides = [
  { permission = "run:create", role = "viewer" },
  { permission = "run:create", role = "owner" },
]
"#,
        ),
        "duplicate permission: run:create",
    )
}

#[test]
fn trust_policy_requires_issuer() -> TestResult {
    assert_invalid(
        NamespaceGateConfig::from_toml_str(
            "[[federated_registry.trust_policies]]\nissuer = \" \"\ngroup_globs = [\"org\"]",
        ),
        "issuer must be non-empty",
    )
}

#[test]
fn trust_policy_rejects_invalid_glob() -> TestResult {
    assert_invalid(
        NamespaceGateConfig::from_toml_str(
            "[[federated_registry.trust_policies]]\nissuer = \"iss\"\ngroup_globs = [\"org/[\"]",
        ),
        "invalid glob",
    )
}

#[test]
fn trust_policy_allows_empty_globs() -> TestResult {
    let config = NamespaceGateConfig::from_toml_str(
        "[[federated_registry.trust_policies]]\nissuer = \"iss\"",
    )
    .map_err(|err| err.to_string())?;
    match config.federated_registry.trust_policies.first() {
        Some(policy) if policy.group_globs.is_empty() => Ok(()),
        _ => Err("expected one policy with no globs".to_string()),
    }
}

#[test]
fn file_sink_requires_path() -> TestResult {
    assert_invalid(
        NamespaceGateConfig::from_toml_str("[audit]\nsink = \"file\""),
        "audit.path is required",
    )
}

#[test]
fn path_rejected_for_stderr_sink() -> TestResult {
    assert_invalid(
        NamespaceGateConfig::from_toml_str("[audit]\nsink = \"stderr\"\npath = \"audit.jsonl\""),
        "only valid for the file sink",
    )
}

#[test]
fn unknown_sink_is_a_parse_error() -> TestResult {
    assert_invalid(
        NamespaceGateConfig::from_toml_str("[audit]\nsink = \"syslog\""),
        "config parse error",
    )
}
