// crates/namespace-gate-core/src/core/models.rs
// ============================================================================
// Module: Entity Models
// Description: Entity records read by the authorizer from external stores.
// Purpose: Provide the minimal projections needed for access decisions.
// Dependencies: serde, crate::core
// ============================================================================

//! ## Overview
//! These records are projections of the platform's persistent entities,
//! carrying only the fields access decisions depend on.

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ApplyId;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::JobId;
use crate::core::identifiers::PlanId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::ServiceAccountId;
use crate::core::identifiers::TeamId;
use crate::core::identifiers::UserId;
use crate::core::identifiers::WorkspaceId;
use crate::core::namespace::NamespacePath;
use crate::core::role::Role;

// ============================================================================
// SECTION: Namespaces
// ============================================================================

/// Namespace owned by exactly one group or one workspace.
///
/// # Invariants
/// - At most one of `group_id` and `workspace_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Full namespace path.
    pub path: NamespacePath,
    /// Owning group, when the namespace is a group.
    pub group_id: Option<GroupId>,
    /// Owning workspace, when the namespace is a workspace.
    pub workspace_id: Option<WorkspaceId>,
}

impl Namespace {
    /// Builds a group namespace.
    #[must_use]
    pub fn group(path: NamespacePath, group_id: impl Into<GroupId>) -> Self {
        Self {
            path,
            group_id: Some(group_id.into()),
            workspace_id: None,
        }
    }

    /// Builds a workspace namespace.
    #[must_use]
    pub fn workspace(path: NamespacePath, workspace_id: impl Into<WorkspaceId>) -> Self {
        Self {
            path,
            group_id: None,
            workspace_id: Some(workspace_id.into()),
        }
    }
}

/// Subject of a namespace membership.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum MembershipSubject {
    /// Human user.
    User(UserId),
    /// Service account.
    ServiceAccount(ServiceAccountId),
}

/// Role granted to a subject at a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceMembership {
    /// Member subject.
    pub subject: MembershipSubject,
    /// Namespace the role applies to (and to every descendant).
    pub namespace: Namespace,
    /// Granted role.
    pub role: Role,
}

// ============================================================================
// SECTION: Groups and Workspaces
// ============================================================================

/// Group record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier.
    pub id: GroupId,
    /// Full namespace path of the group.
    pub full_path: NamespacePath,
}

/// Workspace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace identifier.
    pub id: WorkspaceId,
    /// Full namespace path of the workspace.
    pub full_path: NamespacePath,
}

// ============================================================================
// SECTION: Runs and Jobs
// ============================================================================

/// Run record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Run identifier.
    pub id: RunId,
    /// Workspace the run belongs to.
    pub workspace_id: WorkspaceId,
    /// Current plan for the run.
    pub plan_id: Option<PlanId>,
    /// Current apply for the run.
    pub apply_id: Option<ApplyId>,
}

/// Job stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Plan job.
    Plan,
    /// Apply job.
    Apply,
}

/// Job record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job identifier.
    pub id: JobId,
    /// Run the job executes.
    pub run_id: RunId,
    /// Workspace of the run.
    pub workspace_id: WorkspaceId,
    /// Job stage.
    pub job_type: JobType,
}

// ============================================================================
// SECTION: Teams and Users
// ============================================================================

/// Team record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team identifier.
    pub id: TeamId,
    /// Team name.
    pub name: String,
    /// External id assigned when the team was provisioned through SCIM.
    pub scim_external_id: Option<String>,
}

impl Team {
    /// Returns true when the team was provisioned through SCIM.
    #[must_use]
    pub fn is_scim_provisioned(&self) -> bool {
        is_provisioned(self.scim_external_id.as_deref())
    }
}

/// User record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// System administrator flag.
    pub admin: bool,
    /// External id assigned when the user was provisioned through SCIM.
    pub scim_external_id: Option<String>,
}

impl User {
    /// Returns true when the user was provisioned through SCIM.
    #[must_use]
    pub fn is_scim_provisioned(&self) -> bool {
        is_provisioned(self.scim_external_id.as_deref())
    }
}

/// Team membership record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Member user.
    pub user_id: UserId,
    /// Team.
    pub team_id: TeamId,
    /// Whether the member maintains the team.
    pub is_maintainer: bool,
}

/// Returns true when an external provisioning id is present and non-empty.
fn is_provisioned(external_id: Option<&str>) -> bool {
    external_id.is_some_and(|id| !id.is_empty())
}
