// crates/namespace-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Namespace Gate Interfaces
// Description: Backend-agnostic interfaces for stores, monitors, and tokens.
// Purpose: Define the contract surfaces consumed by the authorizer and callers.
// Dependencies: async-trait, serde, thiserror, crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the authorization core reads external state without
//! embedding backend-specific details. Lookups return `Ok(None)` for a
//! missing entity so "not found" stays distinct from a query failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

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
use crate::core::models::MembershipSubject;
use crate::core::models::NamespaceMembership;
use crate::core::models::Run;
use crate::core::models::Team;
use crate::core::models::TeamMember;
use crate::core::models::User;
use crate::core::models::Workspace;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// External store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store reported an error.
    #[error("store error: {0}")]
    Store(String),
    /// Store is unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// SECTION: Membership Store
// ============================================================================

/// Sort order for membership queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipSort {
    /// Ascending by namespace path.
    PathAsc,
    /// Descending by namespace path.
    PathDesc,
}

/// Membership query for a single subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipQuery {
    /// Subject whose memberships are requested (user XOR service account).
    pub subject: MembershipSubject,
    /// Restrict to these exact namespace paths.
    pub namespace_paths: Option<Vec<String>>,
    /// Restrict to this path and its descendants.
    pub namespace_path_prefix: Option<String>,
    /// Result ordering.
    pub sort: Option<MembershipSort>,
}

impl MembershipQuery {
    /// Builds an unfiltered, unsorted query for a subject.
    #[must_use]
    pub const fn for_subject(subject: MembershipSubject) -> Self {
        Self {
            subject,
            namespace_paths: None,
            namespace_path_prefix: None,
            sort: None,
        }
    }

    /// Returns a copy restricted to exact namespace paths.
    #[must_use]
    pub fn with_namespace_paths(mut self, paths: Vec<String>) -> Self {
        self.namespace_paths = Some(paths);
        self
    }

    /// Returns a copy restricted to a path prefix.
    #[must_use]
    pub fn with_namespace_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_path_prefix = Some(prefix.into());
        self
    }

    /// Returns a copy with a sort order.
    #[must_use]
    pub fn sorted(mut self, sort: MembershipSort) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Namespace membership query interface.
///
/// Implementations must return every matching row, including several rows
/// for the same namespace (memberships inherited through teams).
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Returns memberships matching the query.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    async fn get_namespace_memberships(
        &self,
        query: &MembershipQuery,
    ) -> Result<Vec<NamespaceMembership>, StoreError>;
}

// ============================================================================
// SECTION: Entity Store
// ============================================================================

/// Entity-by-id lookups used by caller-specific handlers.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Returns a group by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    async fn get_group_by_id(&self, id: &GroupId) -> Result<Option<Group>, StoreError>;

    /// Returns a workspace by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    async fn get_workspace_by_id(&self, id: &WorkspaceId) -> Result<Option<Workspace>, StoreError>;

    /// Returns a run by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    async fn get_run_by_id(&self, id: &RunId) -> Result<Option<Run>, StoreError>;

    /// Returns the most recent job of the given type for a run.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    async fn get_latest_job_by_type(
        &self,
        run_id: &RunId,
        job_type: JobType,
    ) -> Result<Option<Job>, StoreError>;

    /// Returns a team by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    async fn get_team_by_id(&self, id: &TeamId) -> Result<Option<Team>, StoreError>;

    /// Returns a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Returns the membership of a user in a team.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    async fn get_team_member(
        &self,
        user_id: &UserId,
        team_id: &TeamId,
    ) -> Result<Option<TeamMember>, StoreError>;

    /// Returns the service accounts assigned to a runner.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    async fn get_service_accounts_for_runner(
        &self,
        runner_id: &RunnerId,
    ) -> Result<Vec<ServiceAccountId>, StoreError>;
}

// ============================================================================
// SECTION: Maintenance Monitor
// ============================================================================

/// Reports whether the platform is in read-only maintenance mode.
#[async_trait]
pub trait MaintenanceMonitor: Send + Sync {
    /// Returns true while maintenance mode is active.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the mode cannot be determined.
    async fn in_maintenance_mode(&self) -> Result<bool, StoreError>;
}

// ============================================================================
// SECTION: Token Verification
// ============================================================================

/// Claims extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Token issuer.
    pub issuer: String,
    /// Token subject.
    pub subject: String,
    /// Token audiences.
    pub audiences: Vec<String>,
    /// Remaining custom claims.
    #[serde(default)]
    pub custom: BTreeMap<String, Value>,
}

/// Token verification failures.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token issuer is not configured.
    #[error("untrusted token issuer: {0}")]
    UntrustedIssuer(String),
    /// Token failed verification (signature, expiry, clock skew).
    #[error("token verification failed: {0}")]
    Invalid(String),
    /// Issuer keys or configuration could not be fetched.
    #[error("token verifier unavailable: {0}")]
    Unavailable(String),
}

/// Verifies bearer tokens issued by external identity providers.
///
/// Implementations check signatures against the configured issuers and
/// tolerate a bounded clock skew on time-based claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verifies a token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when the token is not valid.
    async fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
