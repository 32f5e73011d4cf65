// crates/namespace-gate-core/src/core/permission.rs
// ============================================================================
// Module: Permissions
// Description: Resource types, actions, permissions, and the role model.
// Purpose: Provide the closed permission vocabulary and its required roles.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Permission`] pairs a [`ResourceType`] with an [`Action`]. The set is
//! closed and known at compile time so callers can build static dispatch
//! tables over it. [`PermissionModel`] maps each permission to the minimum
//! namespace [`Role`] that grants it; deployments may override entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::role::Role;

// ============================================================================
// SECTION: Resource Types
// ============================================================================

/// Resource type targeted by a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Workspace.
    Workspace,
    /// Group.
    Group,
    /// Run.
    Run,
    /// Job (plan or apply execution).
    Job,
    /// Plan stage of a run.
    Plan,
    /// Apply stage of a run.
    Apply,
    /// Uploaded configuration version.
    ConfigurationVersion,
    /// Workspace state version.
    StateVersion,
    /// Namespace variable.
    Variable,
    /// Managed identity.
    ManagedIdentity,
    /// Service account.
    ServiceAccount,
    /// Namespace membership.
    NamespaceMembership,
    /// Team.
    Team,
    /// User.
    User,
    /// Terraform module in the registry.
    TerraformModule,
    /// Terraform provider in the registry.
    TerraformProvider,
    /// Runner agent.
    Runner,
    /// Runner session.
    RunnerSession,
    /// VCS provider.
    VcsProvider,
    /// GPG key.
    GpgKey,
    /// Federated registry.
    FederatedRegistry,
}

impl ResourceType {
    /// Every resource type, in declaration order.
    pub const ALL: [Self; 21] = [
        Self::Workspace,
        Self::Group,
        Self::Run,
        Self::Job,
        Self::Plan,
        Self::Apply,
        Self::ConfigurationVersion,
        Self::StateVersion,
        Self::Variable,
        Self::ManagedIdentity,
        Self::ServiceAccount,
        Self::NamespaceMembership,
        Self::Team,
        Self::User,
        Self::TerraformModule,
        Self::TerraformProvider,
        Self::Runner,
        Self::RunnerSession,
        Self::VcsProvider,
        Self::GpgKey,
        Self::FederatedRegistry,
    ];

    /// Returns a stable label for the resource type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Group => "group",
            Self::Run => "run",
            Self::Job => "job",
            Self::Plan => "plan",
            Self::Apply => "apply",
            Self::ConfigurationVersion => "configuration_version",
            Self::StateVersion => "state_version",
            Self::Variable => "variable",
            Self::ManagedIdentity => "managed_identity",
            Self::ServiceAccount => "service_account",
            Self::NamespaceMembership => "namespace_membership",
            Self::Team => "team",
            Self::User => "user",
            Self::TerraformModule => "terraform_module",
            Self::TerraformProvider => "terraform_provider",
            Self::Runner => "runner",
            Self::RunnerSession => "runner_session",
            Self::VcsProvider => "vcs_provider",
            Self::GpgKey => "gpg_key",
            Self::FederatedRegistry => "federated_registry",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = PermissionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.as_str() == value)
            .ok_or_else(|| PermissionParseError::UnknownResourceType(value.to_string()))
    }
}

// ============================================================================
// SECTION: Actions
// ============================================================================

/// Action performed against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read metadata.
    View,
    /// Read sensitive values (variable values, state contents).
    ViewValue,
    /// Create.
    Create,
    /// Update.
    Update,
    /// Delete.
    Delete,
    /// Claim work (runner job claiming).
    Claim,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Self; 6] =
        [Self::View, Self::ViewValue, Self::Create, Self::Update, Self::Delete, Self::Claim];

    /// Returns true when the action changes state. Only `View` and `ViewValue` are read-only.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        !matches!(self, Self::View | Self::ViewValue)
    }

    /// Returns a stable label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::ViewValue => "view_value",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Claim => "claim",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = PermissionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| PermissionParseError::UnknownAction(value.to_string()))
    }
}

// ============================================================================
// SECTION: Permissions
// ============================================================================

/// Permission to perform an action on a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// Targeted resource type.
    pub resource_type: ResourceType,
    /// Requested action.
    pub action: Action,
}

impl Permission {
    /// View workspaces.
    pub const VIEW_WORKSPACE: Self = Self::new(ResourceType::Workspace, Action::View);
    /// Create workspaces.
    pub const CREATE_WORKSPACE: Self = Self::new(ResourceType::Workspace, Action::Create);
    /// Update workspaces.
    pub const UPDATE_WORKSPACE: Self = Self::new(ResourceType::Workspace, Action::Update);
    /// Delete workspaces.
    pub const DELETE_WORKSPACE: Self = Self::new(ResourceType::Workspace, Action::Delete);
    /// View groups.
    pub const VIEW_GROUP: Self = Self::new(ResourceType::Group, Action::View);
    /// Create groups.
    pub const CREATE_GROUP: Self = Self::new(ResourceType::Group, Action::Create);
    /// View runs.
    pub const VIEW_RUN: Self = Self::new(ResourceType::Run, Action::View);
    /// Create runs.
    pub const CREATE_RUN: Self = Self::new(ResourceType::Run, Action::Create);
    /// View jobs.
    pub const VIEW_JOB: Self = Self::new(ResourceType::Job, Action::View);
    /// Update jobs.
    pub const UPDATE_JOB: Self = Self::new(ResourceType::Job, Action::Update);
    /// Claim jobs on behalf of a runner.
    pub const CLAIM_JOB: Self = Self::new(ResourceType::Job, Action::Claim);
    /// Update plans.
    pub const UPDATE_PLAN: Self = Self::new(ResourceType::Plan, Action::Update);
    /// Update applies.
    pub const UPDATE_APPLY: Self = Self::new(ResourceType::Apply, Action::Update);
    /// View configuration versions.
    pub const VIEW_CONFIGURATION_VERSION: Self =
        Self::new(ResourceType::ConfigurationVersion, Action::View);
    /// Create configuration versions.
    pub const CREATE_CONFIGURATION_VERSION: Self =
        Self::new(ResourceType::ConfigurationVersion, Action::Create);
    /// Update configuration versions.
    pub const UPDATE_CONFIGURATION_VERSION: Self =
        Self::new(ResourceType::ConfigurationVersion, Action::Update);
    /// View state versions.
    pub const VIEW_STATE_VERSION: Self = Self::new(ResourceType::StateVersion, Action::View);
    /// Create state versions.
    pub const CREATE_STATE_VERSION: Self = Self::new(ResourceType::StateVersion, Action::Create);
    /// View variables.
    pub const VIEW_VARIABLE: Self = Self::new(ResourceType::Variable, Action::View);
    /// View variable values.
    pub const VIEW_VARIABLE_VALUE: Self = Self::new(ResourceType::Variable, Action::ViewValue);
    /// Create variables.
    pub const CREATE_VARIABLE: Self = Self::new(ResourceType::Variable, Action::Create);
    /// View managed identities.
    pub const VIEW_MANAGED_IDENTITY: Self = Self::new(ResourceType::ManagedIdentity, Action::View);
    /// Create namespace memberships.
    pub const CREATE_NAMESPACE_MEMBERSHIP: Self =
        Self::new(ResourceType::NamespaceMembership, Action::Create);
    /// Create teams.
    pub const CREATE_TEAM: Self = Self::new(ResourceType::Team, Action::Create);
    /// Update teams.
    pub const UPDATE_TEAM: Self = Self::new(ResourceType::Team, Action::Update);
    /// Delete teams.
    pub const DELETE_TEAM: Self = Self::new(ResourceType::Team, Action::Delete);
    /// Create users.
    pub const CREATE_USER: Self = Self::new(ResourceType::User, Action::Create);
    /// Update users.
    pub const UPDATE_USER: Self = Self::new(ResourceType::User, Action::Update);
    /// Delete users.
    pub const DELETE_USER: Self = Self::new(ResourceType::User, Action::Delete);
    /// Create runner sessions.
    pub const CREATE_RUNNER_SESSION: Self = Self::new(ResourceType::RunnerSession, Action::Create);
    /// Update runner sessions.
    pub const UPDATE_RUNNER_SESSION: Self = Self::new(ResourceType::RunnerSession, Action::Update);

    /// Builds a permission.
    #[must_use]
    pub const fn new(resource_type: ResourceType, action: Action) -> Self {
        Self {
            resource_type,
            action,
        }
    }

    /// Returns true when the permission's action changes state.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        self.action.is_mutating()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.action)
    }
}

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (resource, action) = value
            .split_once(':')
            .ok_or_else(|| PermissionParseError::Malformed(value.to_string()))?;
        Ok(Self::new(resource.parse()?, action.parse()?))
    }
}

/// Permission label parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionParseError {
    /// Label was not of the form `resource:action`.
    #[error("permission must be formatted as resource:action: {0}")]
    Malformed(String),
    /// Unknown resource type label.
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),
    /// Unknown action label.
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

// ============================================================================
// SECTION: Permission Model
// ============================================================================

/// Maps permissions to the minimum namespace role that grants them.
///
/// # Invariants
/// - Overrides take precedence over the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionModel {
    /// Explicit per-permission role overrides.
    overrides: BTreeMap<Permission, Role>,
}

impl PermissionModel {
    /// Creates a model using only the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with an override for one permission.
    #[must_use]
    pub fn with_override(mut self, permission: Permission, role: Role) -> Self {
        self.overrides.insert(permission, role);
        self
    }

    /// Returns the minimum role required for `permission`.
    #[must_use]
    pub fn required_role(&self, permission: Permission) -> Role {
        self.overrides.get(&permission).copied().unwrap_or_else(|| default_role(permission))
    }
}

/// Built-in minimum role for a permission.
const fn default_role(permission: Permission) -> Role {
    match permission.action {
        Action::View => Role::Viewer,
        Action::ViewValue | Action::Claim => Role::Deployer,
        Action::Create | Action::Update | Action::Delete => match permission.resource_type {
            ResourceType::Run
            | ResourceType::Job
            | ResourceType::Plan
            | ResourceType::Apply
            | ResourceType::ConfigurationVersion
            | ResourceType::StateVersion => Role::Deployer,
            ResourceType::NamespaceMembership => Role::Owner,
            _ => Role::Maintainer,
        },
    }
}
