// crates/namespace-gate-authz/src/caller/job.rs
// ============================================================================
// Module: Job Caller
// Description: Caller for a running plan or apply job.
// Purpose: Confine a job token to its own run and its workspace's hierarchy.
// Dependencies: async-trait, namespace-gate-core
// ============================================================================

//! ## Overview
//! A job token is scoped to one workspace, one run, and one job. Jobs read
//! freely within the root namespace of their workspace (modules, variables,
//! and state of sibling workspaces are commonly consumed), but they write
//! only to their own job, plan, apply, and workspace state.
//!
//! A plan or apply update is allowed only while the job is the latest job of
//! that type for its run and the run still points at the plan or apply named
//! in the constraints. Both facts are re-read from the store on every check.
//!
//! Job callers are not subject to the maintenance gate: a job already
//! running when maintenance begins is allowed to finish reporting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::EntityStore;
use namespace_gate_core::GroupId;
use namespace_gate_core::Job;
use namespace_gate_core::JobId;
use namespace_gate_core::JobType;
use namespace_gate_core::NamespacePath;
use namespace_gate_core::Permission;
use namespace_gate_core::ResourceType;
use namespace_gate_core::Run;
use namespace_gate_core::RunId;
use namespace_gate_core::WorkspaceId;
use namespace_gate_core::is_ancestor_or_self;
use namespace_gate_core::require_constraint;
use namespace_gate_core::root_segment;

use crate::caller::Caller;
use crate::caller::CallerKind;
use crate::caller::NamespaceAccessPolicy;

// ============================================================================
// SECTION: Handler Table
// ============================================================================

/// Permission handlers available to jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobHandler {
    /// Every scoped resource must live in the job's root namespace.
    SameRootNamespace,
    /// The constrained workspace must be the job's own workspace.
    SameWorkspace,
    /// The run must be the job's own run, with a root namespace fallback.
    ViewRun,
    /// The constrained job must be the job itself.
    CurrentJob,
    /// The constrained plan must be the current plan of the job's run.
    CurrentPlan,
    /// The constrained apply must be the current apply of the job's run.
    CurrentApply,
}

/// Returns the job handler for `permission`, if any.
const fn job_handler(permission: Permission) -> Option<JobHandler> {
    match permission {
        Permission::VIEW_WORKSPACE
        | Permission::VIEW_CONFIGURATION_VERSION
        | Permission::VIEW_STATE_VERSION
        | Permission::VIEW_MANAGED_IDENTITY
        | Permission::VIEW_VARIABLE => Some(JobHandler::SameRootNamespace),
        Permission::CREATE_STATE_VERSION | Permission::VIEW_VARIABLE_VALUE => {
            Some(JobHandler::SameWorkspace)
        }
        Permission::VIEW_RUN => Some(JobHandler::ViewRun),
        Permission::UPDATE_JOB => Some(JobHandler::CurrentJob),
        Permission::UPDATE_PLAN => Some(JobHandler::CurrentPlan),
        Permission::UPDATE_APPLY => Some(JobHandler::CurrentApply),
        _ => None,
    }
}

// ============================================================================
// SECTION: Job Caller
// ============================================================================

/// Caller representing a running job.
pub struct JobCaller {
    /// Job identifier.
    job_id: JobId,
    /// Run the job executes.
    run_id: RunId,
    /// Workspace of the run.
    workspace_id: WorkspaceId,
    /// Full path of the workspace.
    workspace_path: NamespacePath,
    /// Entity lookup backend.
    entities: Arc<dyn EntityStore>,
}

impl JobCaller {
    /// Creates a job caller from the claims of a job token.
    #[must_use]
    pub const fn new(
        job_id: JobId,
        run_id: RunId,
        workspace_id: WorkspaceId,
        workspace_path: NamespacePath,
        entities: Arc<dyn EntityStore>,
    ) -> Self {
        Self {
            job_id,
            run_id,
            workspace_id,
            workspace_path,
            entities,
        }
    }

    /// Creates a job caller for a job record.
    #[must_use]
    pub fn for_job(
        job: &Job,
        workspace_path: NamespacePath,
        entities: Arc<dyn EntityStore>,
    ) -> Self {
        Self::new(
            job.id.clone(),
            job.run_id.clone(),
            job.workspace_id.clone(),
            workspace_path,
            entities,
        )
    }

    /// Returns the job identifier.
    #[must_use]
    pub const fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Returns the root namespace of the job's workspace.
    #[must_use]
    pub fn root_namespace(&self) -> &str {
        self.workspace_path.root()
    }

    /// Resolves a workspace path, answering for the job's own workspace
    /// without a lookup.
    async fn workspace_path_of(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Option<NamespacePath>, AuthzError> {
        if workspace_id == &self.workspace_id {
            return Ok(Some(self.workspace_path.clone()));
        }
        let workspace = self.entities.get_workspace_by_id(workspace_id).await?;
        Ok(workspace.map(|workspace| workspace.full_path))
    }

    /// Resolves a group path.
    async fn group_path_of(&self, group_id: &GroupId) -> Result<Option<NamespacePath>, AuthzError> {
        let group = self.entities.get_group_by_id(group_id).await?;
        Ok(group.map(|group| group.full_path))
    }

    /// Returns true when `path` shares the job's root namespace.
    fn in_root_namespace(&self, path: &str) -> bool {
        root_segment(path) == self.root_namespace()
    }

    /// Returns whether every workspace, group, and namespace path in
    /// `constraints` lies within the job's root namespace, or `None` when no
    /// such scope was supplied. Unknown workspaces and groups are outside.
    async fn scope_within_root(
        &self,
        constraints: &Constraints,
    ) -> Result<Option<bool>, AuthzError> {
        if constraints.lacks_namespace_scope() {
            return Ok(None);
        }
        if let Some(workspace_id) = &constraints.workspace_id {
            let path = self.workspace_path_of(workspace_id).await?;
            if !path.is_some_and(|path| self.in_root_namespace(path.as_str())) {
                return Ok(Some(false));
            }
        }
        if let Some(group_id) = &constraints.group_id {
            let path = self.group_path_of(group_id).await?;
            if !path.is_some_and(|path| self.in_root_namespace(path.as_str())) {
                return Ok(Some(false));
            }
        }
        Ok(Some(constraints.namespace_paths.iter().all(|path| self.in_root_namespace(path))))
    }

    /// Viewer heuristic used to shape denials.
    async fn has_viewer_access(&self, constraints: &Constraints) -> Result<bool, AuthzError> {
        Ok(self.scope_within_root(constraints).await?.unwrap_or(false))
    }

    /// Requires every scoped resource to be in the job's root namespace.
    async fn require_same_root_namespace(
        &self,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        match self.scope_within_root(constraints).await? {
            Some(true) => Ok(()),
            Some(false) => Err(self.unauthorized_error(false)),
            None => Err(AuthzError::InvalidConstraints(
                "missing required constraint: workspace_id, group_id, or namespace_paths"
                    .to_string(),
            )),
        }
    }

    /// Requires the constrained workspace to be the job's workspace.
    async fn require_same_workspace(&self, constraints: &Constraints) -> Result<(), AuthzError> {
        let workspace_id = require_constraint(constraints.workspace_id.as_ref(), "workspace_id")?;
        if workspace_id == &self.workspace_id {
            return Ok(());
        }
        Err(self.unauthorized_error(self.has_viewer_access(constraints).await?))
    }

    /// Allows viewing the job's own run, or any run in the job's root
    /// namespace for older agents that scope run reads by workspace.
    async fn require_run_view(&self, constraints: &Constraints) -> Result<(), AuthzError> {
        if constraints.run_id.as_ref() == Some(&self.run_id) {
            return Ok(());
        }
        let path = if let Some(workspace_id) = &constraints.workspace_id {
            self.workspace_path_of(workspace_id).await?
        } else if let Some(run_id) = &constraints.run_id {
            match self.entities.get_run_by_id(run_id).await? {
                Some(run) => self.workspace_path_of(&run.workspace_id).await?,
                None => None,
            }
        } else {
            return Err(AuthzError::InvalidConstraints(
                "missing required constraint: run_id or workspace_id".to_string(),
            ));
        };
        if path.is_some_and(|path| self.in_root_namespace(path.as_str())) {
            Ok(())
        } else {
            Err(self.unauthorized_error(false))
        }
    }

    /// Requires the constrained job to be this job.
    fn require_current_job(&self, constraints: &Constraints) -> Result<(), AuthzError> {
        let job_id = require_constraint(constraints.job_id.as_ref(), "job_id")?;
        if job_id == &self.job_id {
            Ok(())
        } else {
            Err(self.unauthorized_error(false))
        }
    }

    /// Requires the constrained plan or apply to be the current one for the
    /// job's run, and this job to be the latest job of `job_type`.
    async fn require_current_stage(
        &self,
        job_type: JobType,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        let run = match job_type {
            JobType::Plan => {
                let plan_id = require_constraint(constraints.plan_id.as_ref(), "plan_id")?;
                self.own_run().await?.filter(|run| run.plan_id.as_ref() == Some(plan_id))
            }
            JobType::Apply => {
                let apply_id = require_constraint(constraints.apply_id.as_ref(), "apply_id")?;
                self.own_run().await?.filter(|run| run.apply_id.as_ref() == Some(apply_id))
            }
        };
        if run.is_none() {
            return Err(self.unauthorized_error(false));
        }
        let latest = self.entities.get_latest_job_by_type(&self.run_id, job_type).await?;
        if latest.is_some_and(|job| job.id == self.job_id) {
            Ok(())
        } else {
            Err(self.unauthorized_error(false))
        }
    }

    /// Fetches the job's run.
    async fn own_run(&self) -> Result<Option<Run>, AuthzError> {
        Ok(self.entities.get_run_by_id(&self.run_id).await?)
    }

    /// Collects the namespace paths an inheritable resource check names.
    async fn requested_paths(&self, constraints: &Constraints) -> Result<Vec<String>, AuthzError> {
        let mut paths = Vec::with_capacity(constraints.namespace_paths.len() + 1);
        if let Some(group_id) = &constraints.group_id {
            let path = self
                .group_path_of(group_id)
                .await?
                .ok_or_else(|| self.unauthorized_error(false))?;
            paths.push(path.as_str().to_string());
        }
        paths.extend(constraints.namespace_paths.iter().cloned());
        Ok(paths)
    }
}

#[async_trait]
impl Caller for JobCaller {
    fn kind(&self) -> CallerKind {
        CallerKind::Job
    }

    fn subject(&self) -> String {
        format!("job {}", self.job_id)
    }

    async fn namespace_access_policy(&self) -> Result<NamespaceAccessPolicy, AuthzError> {
        Ok(NamespaceAccessPolicy::roots(vec![self.root_namespace().to_string()]))
    }

    async fn require_permission(
        &self,
        permission: Permission,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        match job_handler(permission) {
            Some(JobHandler::SameRootNamespace) => {
                self.require_same_root_namespace(constraints).await
            }
            Some(JobHandler::SameWorkspace) => self.require_same_workspace(constraints).await,
            Some(JobHandler::ViewRun) => self.require_run_view(constraints).await,
            Some(JobHandler::CurrentJob) => self.require_current_job(constraints),
            Some(JobHandler::CurrentPlan) => {
                self.require_current_stage(JobType::Plan, constraints).await
            }
            Some(JobHandler::CurrentApply) => {
                self.require_current_stage(JobType::Apply, constraints).await
            }
            None => Err(self.unauthorized_error(self.has_viewer_access(constraints).await?)),
        }
    }

    async fn require_access_to_inheritable_resource(
        &self,
        _resource_type: ResourceType,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        if constraints.group_id.is_none() && constraints.namespace_paths.is_empty() {
            return Err(AuthzError::InvalidConstraints(
                "missing required constraint: namespace_paths or group_id".to_string(),
            ));
        }
        let paths = self.requested_paths(constraints).await?;
        let own_path = self.workspace_path.as_str();
        if paths.iter().all(|path| is_ancestor_or_self(path, own_path)) {
            return Ok(());
        }
        let has_viewer_access = paths.iter().all(|path| self.in_root_namespace(path));
        Err(self.unauthorized_error(has_viewer_access))
    }
}
