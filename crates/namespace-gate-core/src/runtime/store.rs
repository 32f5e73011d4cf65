// crates/namespace-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Namespace Gate In-Memory Store
// Description: In-memory membership and entity store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: async-trait, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`MembershipStore`]
//! and [`EntityStore`] for tests and local demos. It honors the same filter
//! and sort semantics a database-backed store must provide, counts
//! membership queries, and can be switched into a failing mode to exercise
//! upstream error propagation. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;

use crate::core::identifiers::GroupId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::RunnerId;
use crate::core::identifiers::ServiceAccountId;
use crate::core::identifiers::TeamId;
use crate::core::identifiers::UserId;
use crate::core::identifiers::WorkspaceId;
use crate::core::models::Group;
use crate::core::models::Job;
use crate::core::models::JobType;
use crate::core::models::NamespaceMembership;
use crate::core::models::Run;
use crate::core::models::Team;
use crate::core::models::TeamMember;
use crate::core::models::User;
use crate::core::models::Workspace;
use crate::core::namespace::is_ancestor_or_self;
use crate::interfaces::EntityStore;
use crate::interfaces::MembershipQuery;
use crate::interfaces::MembershipSort;
use crate::interfaces::MembershipStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Records held by the in-memory store.
#[derive(Debug, Default)]
struct StoreState {
    /// Membership rows in insertion order.
    memberships: Vec<NamespaceMembership>,
    /// Groups keyed by id.
    groups: BTreeMap<GroupId, Group>,
    /// Workspaces keyed by id.
    workspaces: BTreeMap<WorkspaceId, Workspace>,
    /// Runs keyed by id.
    runs: BTreeMap<RunId, Run>,
    /// Jobs in insertion order; later entries are newer.
    jobs: Vec<Job>,
    /// Teams keyed by id.
    teams: BTreeMap<TeamId, Team>,
    /// Users keyed by id.
    users: BTreeMap<UserId, User>,
    /// Team members keyed by (user, team).
    team_members: BTreeMap<(UserId, TeamId), TeamMember>,
    /// Service accounts assigned to each runner.
    runner_assignments: BTreeMap<RunnerId, Vec<ServiceAccountId>>,
}

/// In-memory membership and entity store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    /// Store records protected by a mutex.
    state: Arc<Mutex<StoreState>>,
    /// Number of membership queries served.
    membership_queries: Arc<AtomicUsize>,
    /// When set, every query fails with [`StoreError::Unavailable`].
    failing: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a membership row.
    pub fn add_membership(&self, membership: NamespaceMembership) {
        self.state().memberships.push(membership);
    }

    /// Adds or replaces a group.
    pub fn add_group(&self, group: Group) {
        self.state().groups.insert(group.id.clone(), group);
    }

    /// Adds or replaces a workspace.
    pub fn add_workspace(&self, workspace: Workspace) {
        self.state().workspaces.insert(workspace.id.clone(), workspace);
    }

    /// Adds or replaces a run.
    pub fn add_run(&self, run: Run) {
        self.state().runs.insert(run.id.clone(), run);
    }

    /// Adds a job; the most recently added job of a type is the latest.
    pub fn add_job(&self, job: Job) {
        self.state().jobs.push(job);
    }

    /// Adds or replaces a team.
    pub fn add_team(&self, team: Team) {
        self.state().teams.insert(team.id.clone(), team);
    }

    /// Adds or replaces a user.
    pub fn add_user(&self, user: User) {
        self.state().users.insert(user.id.clone(), user);
    }

    /// Adds or replaces a team membership.
    pub fn add_team_member(&self, member: TeamMember) {
        self.state()
            .team_members
            .insert((member.user_id.clone(), member.team_id.clone()), member);
    }

    /// Assigns a service account to a runner.
    pub fn assign_runner(&self, runner_id: RunnerId, service_account_id: ServiceAccountId) {
        self.state().runner_assignments.entry(runner_id).or_default().push(service_account_id);
    }

    /// Makes every subsequent query fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the number of membership queries served so far.
    #[must_use]
    pub fn membership_query_count(&self) -> usize {
        self.membership_queries.load(Ordering::SeqCst)
    }

    /// Locks the store records. Seeding and reads never leave the state
    /// half-written, so a poisoned lock is recovered.
    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fails when failure injection is enabled.
    fn check_available(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store set to fail".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn get_namespace_memberships(
        &self,
        query: &MembershipQuery,
    ) -> Result<Vec<NamespaceMembership>, StoreError> {
        self.membership_queries.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut rows: Vec<NamespaceMembership> = self
            .state()
            .memberships
            .iter()
            .filter(|row| row.subject == query.subject)
            .filter(|row| {
                query
                    .namespace_paths
                    .as_ref()
                    .is_none_or(|paths| paths.iter().any(|p| p == row.namespace.path.as_str()))
            })
            .filter(|row| {
                query
                    .namespace_path_prefix
                    .as_deref()
                    .is_none_or(|prefix| is_ancestor_or_self(prefix, row.namespace.path.as_str()))
            })
            .cloned()
            .collect();
        match query.sort {
            Some(MembershipSort::PathAsc) => {
                rows.sort_by(|a, b| a.namespace.path.cmp(&b.namespace.path));
            }
            Some(MembershipSort::PathDesc) => {
                rows.sort_by(|a, b| b.namespace.path.cmp(&a.namespace.path));
            }
            None => {}
        }
        Ok(rows)
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn get_group_by_id(&self, id: &GroupId) -> Result<Option<Group>, StoreError> {
        self.check_available()?;
        Ok(self.state().groups.get(id).cloned())
    }

    async fn get_workspace_by_id(&self, id: &WorkspaceId) -> Result<Option<Workspace>, StoreError> {
        self.check_available()?;
        Ok(self.state().workspaces.get(id).cloned())
    }

    async fn get_run_by_id(&self, id: &RunId) -> Result<Option<Run>, StoreError> {
        self.check_available()?;
        Ok(self.state().runs.get(id).cloned())
    }

    async fn get_latest_job_by_type(
        &self,
        run_id: &RunId,
        job_type: JobType,
    ) -> Result<Option<Job>, StoreError> {
        self.check_available()?;
        Ok(self
            .state()
            .jobs
            .iter()
            .rev()
            .find(|job| &job.run_id == run_id && job.job_type == job_type)
            .cloned())
    }

    async fn get_team_by_id(&self, id: &TeamId) -> Result<Option<Team>, StoreError> {
        self.check_available()?;
        Ok(self.state().teams.get(id).cloned())
    }

    async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        Ok(self.state().users.get(id).cloned())
    }

    async fn get_team_member(
        &self,
        user_id: &UserId,
        team_id: &TeamId,
    ) -> Result<Option<TeamMember>, StoreError> {
        self.check_available()?;
        Ok(self.state().team_members.get(&(user_id.clone(), team_id.clone())).cloned())
    }

    async fn get_service_accounts_for_runner(
        &self,
        runner_id: &RunnerId,
    ) -> Result<Vec<ServiceAccountId>, StoreError> {
        self.check_available()?;
        Ok(self.state().runner_assignments.get(runner_id).cloned().unwrap_or_default())
    }
}
