// crates/namespace-gate-config/src/config.rs
// ============================================================================
// Module: Namespace Gate Configuration
// Description: Configuration loading and validation for the authorization engine.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: namespace-gate-core, globset, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and defaults to a conservative posture: no
//! maintenance lockdown, the built-in permission model, no federated trust
//! policies, and audit events on stderr. Invalid values fail the whole load.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use globset::GlobBuilder;
use namespace_gate_core::Permission;
use namespace_gate_core::PermissionModel;
use namespace_gate_core::Role;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "namespace-gate.toml";
/// Environment variable naming the config file.
pub(crate) const CONFIG_ENV_VAR: &str = "NAMESPACE_GATE_CONFIG";
/// Maximum config file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of permission overrides.
pub(crate) const MAX_PERMISSION_OVERRIDES: usize = 512;
/// Maximum number of federated trust policies.
pub(crate) const MAX_TRUST_POLICIES: usize = 256;
/// Maximum number of group globs per trust policy.
pub(crate) const MAX_GROUP_GLOBS: usize = 64;
/// Maximum length of an issuer, subject, audience, or glob string.
pub(crate) const MAX_TRUST_FIELD_LENGTH: usize = 1024;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Authorization engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamespaceGateConfig {
    /// Maintenance mode seeding.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    /// Permission-model role overrides.
    #[serde(default)]
    pub permissions: PermissionsConfig,
    /// Federated registry trust policies.
    #[serde(default)]
    pub federated_registry: FederatedRegistryConfig,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl NamespaceGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then the `NAMESPACE_GATE_CONFIG`
    /// environment variable, then `namespace-gate.toml` in the working
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.permissions.validate()?;
        self.federated_registry.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Builds the permission model with configured overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an override names an unknown permission or role.
    pub fn permission_model(&self) -> Result<PermissionModel, ConfigError> {
        self.permissions.permission_model()
    }
}

// ============================================================================
// SECTION: Maintenance
// ============================================================================

/// Maintenance mode seeding for the static monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MaintenanceConfig {
    /// Start with the read-only lockdown active.
    #[serde(default)]
    pub enabled: bool,
}

// ============================================================================
// SECTION: Permissions
// ============================================================================

/// Permission-model overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionsConfig {
    /// Minimum-role overrides applied on top of the built-in defaults.
    #[serde(default)]
    pub overrides: Vec<PermissionOverrideConfig>,
}

/// Single minimum-role override.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PermissionOverrideConfig {
    /// Permission label (`resource:action`).
    pub permission: String,
    /// Role label (`viewer`, `deployer`, `maintainer`, `owner`).
    pub role: String,
}

impl PermissionOverrideConfig {
    /// Parses the override into a typed permission and role.
    fn parse(&self) -> Result<(Permission, Role), ConfigError> {
        let permission: Permission = self.permission.parse().map_err(|err| {
            ConfigError::Invalid(format!("permissions.overrides: {err}"))
        })?;
        let role: Role = self
            .role
            .parse()
            .map_err(|err| ConfigError::Invalid(format!("permissions.overrides: {err}")))?;
        Ok((permission, role))
    }
}

impl PermissionsConfig {
    /// Validates override labels and count.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.overrides.len() > MAX_PERMISSION_OVERRIDES {
            return Err(ConfigError::Invalid(
                "permissions.overrides exceeds max entries".to_string(),
            ));
        }
        let mut seen = Vec::with_capacity(self.overrides.len());
        for entry in &self.overrides {
            let (permission, _) = entry.parse()?;
            if seen.contains(&permission) {
                return Err(ConfigError::Invalid(format!(
                    "permissions.overrides contains duplicate permission: {permission}"
                )));
            }
            seen.push(permission);
        }
        Ok(())
    }

    /// Builds the permission model with overrides applied.
    fn permission_model(&self) -> Result<PermissionModel, ConfigError> {
        self.overrides.iter().try_fold(PermissionModel::new(), |model, entry| {
            let (permission, role) = entry.parse()?;
            Ok(model.with_override(permission, role))
        })
    }
}

// ============================================================================
// SECTION: Federated Registry
// ============================================================================

/// Federated registry trust configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FederatedRegistryConfig {
    /// Trust policies evaluated against federated tokens.
    #[serde(default)]
    pub trust_policies: Vec<TrustPolicyConfig>,
}

impl FederatedRegistryConfig {
    /// Validates every trust policy.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.trust_policies.len() > MAX_TRUST_POLICIES {
            return Err(ConfigError::Invalid(
                "federated_registry.trust_policies exceeds max entries".to_string(),
            ));
        }
        for policy in &self.trust_policies {
            policy.validate()?;
        }
        Ok(())
    }
}

/// Trust policy for one federated token issuer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrustPolicyConfig {
    /// Token issuer the policy applies to.
    pub issuer: String,
    /// Required token subject, when set.
    #[serde(default)]
    pub subject: Option<String>,
    /// Required token audience, when set.
    #[serde(default)]
    pub audience: Option<String>,
    /// Group path globs the issuer may read from. `*` never crosses `/`.
    #[serde(default)]
    pub group_globs: Vec<String>,
}

impl TrustPolicyConfig {
    /// Validates issuer, optional claims, and glob syntax.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_trust_field("federated_registry.trust_policies.issuer", &self.issuer)?;
        if let Some(subject) = &self.subject {
            validate_trust_field("federated_registry.trust_policies.subject", subject)?;
        }
        if let Some(audience) = &self.audience {
            validate_trust_field("federated_registry.trust_policies.audience", audience)?;
        }
        if self.group_globs.len() > MAX_GROUP_GLOBS {
            return Err(ConfigError::Invalid(
                "federated_registry.trust_policies.group_globs exceeds max entries".to_string(),
            ));
        }
        for glob in &self.group_globs {
            validate_trust_field("federated_registry.trust_policies.group_globs", glob)?;
            GlobBuilder::new(glob).literal_separator(true).build().map_err(|err| {
                ConfigError::Invalid(format!(
                    "federated_registry.trust_policies.group_globs invalid glob {glob}: {err}"
                ))
            })?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard audit events.
    None,
}

/// Audit configuration for authorization decisions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Sink receiving audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (JSON lines); required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates sink and path pairing.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (_, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid for the file sink".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from explicit input, environment, or default.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a trust policy string field.
fn validate_trust_field(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_TRUST_FIELD_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn validate_path_string_rejects_whitespace_only() {
        let result = validate_path_string("audit.path", "   ");
        assert!(result.unwrap_err().to_string().contains("non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_long_component() {
        let long = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let result = validate_path_string("audit.path", &long);
        assert!(result.unwrap_err().to_string().contains("path component too long"));
    }

    #[test]
    fn validate_trust_field_rejects_oversized_values() {
        let long = "x".repeat(MAX_TRUST_FIELD_LENGTH + 1);
        assert!(validate_trust_field("issuer", &long).is_err());
        assert!(validate_trust_field("issuer", "https://issuer").is_ok());
    }

    #[test]
    fn resolve_path_prefers_explicit_path() {
        let resolved = resolve_path(Some(Path::new("custom.toml"))).unwrap();
        assert_eq!(resolved, PathBuf::from("custom.toml"));
    }
}
