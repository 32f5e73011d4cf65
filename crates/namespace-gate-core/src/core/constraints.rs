// crates/namespace-gate-core/src/core/constraints.rs
// ============================================================================
// Module: Permission Constraints
// Description: Optional scoping values supplied with a permission check.
// Purpose: Carry the entity ids and namespace paths a handler needs.
// Dependencies: crate::core::identifiers
// ============================================================================

//! ## Overview
//! Each permission check carries a bag of optional scoping values. A given
//! handler requires a specific subset; a missing value is a programmer error
//! reported as [`crate::AuthzError::InvalidConstraints`], not a denial.

use crate::core::error::AuthzError;
use crate::core::identifiers::ApplyId;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::JobId;
use crate::core::identifiers::PlanId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::RunnerId;
use crate::core::identifiers::TeamId;
use crate::core::identifiers::UserId;
use crate::core::identifiers::WorkspaceId;

/// Scoping values for a single permission check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    /// Target workspace.
    pub workspace_id: Option<WorkspaceId>,
    /// Target group.
    pub group_id: Option<GroupId>,
    /// Target plan.
    pub plan_id: Option<PlanId>,
    /// Target apply.
    pub apply_id: Option<ApplyId>,
    /// Target job.
    pub job_id: Option<JobId>,
    /// Target run.
    pub run_id: Option<RunId>,
    /// Target team.
    pub team_id: Option<TeamId>,
    /// Target user.
    pub user_id: Option<UserId>,
    /// Target runner.
    pub runner_id: Option<RunnerId>,
    /// Target namespace paths.
    pub namespace_paths: Vec<String>,
}

impl Constraints {
    /// Creates an empty constraint set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the workspace constraint.
    #[must_use]
    pub fn with_workspace_id(mut self, id: impl Into<WorkspaceId>) -> Self {
        self.workspace_id = Some(id.into());
        self
    }

    /// Sets the group constraint.
    #[must_use]
    pub fn with_group_id(mut self, id: impl Into<GroupId>) -> Self {
        self.group_id = Some(id.into());
        self
    }

    /// Sets the plan constraint.
    #[must_use]
    pub fn with_plan_id(mut self, id: impl Into<PlanId>) -> Self {
        self.plan_id = Some(id.into());
        self
    }

    /// Sets the apply constraint.
    #[must_use]
    pub fn with_apply_id(mut self, id: impl Into<ApplyId>) -> Self {
        self.apply_id = Some(id.into());
        self
    }

    /// Sets the job constraint.
    #[must_use]
    pub fn with_job_id(mut self, id: impl Into<JobId>) -> Self {
        self.job_id = Some(id.into());
        self
    }

    /// Sets the run constraint.
    #[must_use]
    pub fn with_run_id(mut self, id: impl Into<RunId>) -> Self {
        self.run_id = Some(id.into());
        self
    }

    /// Sets the team constraint.
    #[must_use]
    pub fn with_team_id(mut self, id: impl Into<TeamId>) -> Self {
        self.team_id = Some(id.into());
        self
    }

    /// Sets the user constraint.
    #[must_use]
    pub fn with_user_id(mut self, id: impl Into<UserId>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    /// Sets the runner constraint.
    #[must_use]
    pub fn with_runner_id(mut self, id: impl Into<RunnerId>) -> Self {
        self.runner_id = Some(id.into());
        self
    }

    /// Sets the namespace path constraint.
    #[must_use]
    pub fn with_namespace_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespace_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true when no workspace, group, or namespace path scope was supplied.
    #[must_use]
    pub fn lacks_namespace_scope(&self) -> bool {
        self.workspace_id.is_none() && self.group_id.is_none() && self.namespace_paths.is_empty()
    }
}

/// Returns the value of a required constraint or an invalid-constraints error.
///
/// # Errors
///
/// Returns [`AuthzError::InvalidConstraints`] when `value` is `None`.
pub fn require_constraint<'a, T>(value: Option<&'a T>, name: &str) -> Result<&'a T, AuthzError> {
    value.ok_or_else(|| {
        AuthzError::InvalidConstraints(format!("missing required constraint: {name}"))
    })
}
