// crates/namespace-gate-authz/src/caller.rs
// ============================================================================
// Module: Callers
// Description: The caller capability trait and its request-scoped context.
// Purpose: Give business logic one entry point for every kind of caller.
// Dependencies: async-trait, namespace-gate-core, namespace-gate-config
// ============================================================================

//! ## Overview
//! Every authenticated request is served on behalf of exactly one [`Caller`].
//! The set of callers is closed: [`SystemCaller`], [`UserCaller`],
//! [`ServiceAccountCaller`], [`JobCaller`], [`VcsWorkspaceLinkCaller`],
//! [`FederatedRegistryCaller`], and [`ScimCaller`]. Each resolves a permission
//! through its own handler table, falling back to namespace memberships only
//! when the caller is membership-backed.
//!
//! The caller for a request travels in an explicit [`CallerContext`] rather
//! than ambient state. Code that must branch on "user or service account"
//! uses [`SubjectCaller`] instead of downcasting.
//!
//! [`SystemCaller`]: system::SystemCaller
//! [`UserCaller`]: user::UserCaller
//! [`ServiceAccountCaller`]: service_account::ServiceAccountCaller
//! [`JobCaller`]: job::JobCaller
//! [`VcsWorkspaceLinkCaller`]: vcs::VcsWorkspaceLinkCaller
//! [`FederatedRegistryCaller`]: federated::FederatedRegistryCaller
//! [`ScimCaller`]: scim::ScimCaller

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod federated;
pub mod job;
pub mod scim;
pub mod service_account;
pub mod system;
pub mod user;
pub mod vcs;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use namespace_gate_config::ConfigError;
use namespace_gate_config::NamespaceGateConfig;
use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::EntityStore;
use namespace_gate_core::MaintenanceMonitor;
use namespace_gate_core::MembershipStore;
use namespace_gate_core::NamespacePath;
use namespace_gate_core::Permission;
use namespace_gate_core::PermissionModel;
use namespace_gate_core::ResourceType;
use namespace_gate_core::ServiceAccountId;
use namespace_gate_core::StaticMaintenanceMonitor;
use namespace_gate_core::User;
use namespace_gate_core::is_ancestor_or_self;
use serde::Serialize;

use crate::authorizer::NamespaceMembershipAuthorizer;
use crate::caller::service_account::ServiceAccountCaller;
use crate::caller::user::UserCaller;
use crate::dispatch::unauthorized;

// ============================================================================
// SECTION: Caller Trait
// ============================================================================

/// Kind of caller behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerKind {
    /// Internal system operations.
    System,
    /// Human user.
    User,
    /// Service account.
    ServiceAccount,
    /// Running job.
    Job,
    /// VCS integration bound to one workspace.
    VcsWorkspaceLink,
    /// External registry authenticated by a federated token.
    FederatedRegistry,
    /// SCIM provisioning client.
    Scim,
}

impl CallerKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::ServiceAccount => "service_account",
            Self::Job => "job",
            Self::VcsWorkspaceLink => "vcs_workspace_link",
            Self::FederatedRegistry => "federated_registry",
            Self::Scim => "scim",
        }
    }
}

impl fmt::Display for CallerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization capability of an authenticated caller.
#[async_trait]
pub trait Caller: Send + Sync {
    /// Returns the kind of caller.
    fn kind(&self) -> CallerKind;

    /// Returns a human-readable subject used in messages and audit events.
    fn subject(&self) -> String;

    /// Returns true when the caller bypasses permission checks.
    fn is_admin(&self) -> bool {
        false
    }

    /// Returns the namespaces whose resources the caller may list.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Upstream`] when membership data cannot be read.
    async fn namespace_access_policy(&self) -> Result<NamespaceAccessPolicy, AuthzError>;

    /// Requires `permission` within the scope described by `constraints`.
    ///
    /// # Errors
    ///
    /// Returns a denial ([`AuthzError::Forbidden`], [`AuthzError::NotFound`],
    /// [`AuthzError::ServiceUnavailable`]),
    /// [`AuthzError::InvalidConstraints`] when a required constraint is
    /// missing, or [`AuthzError::Upstream`] when a lookup fails.
    async fn require_permission(
        &self,
        permission: Permission,
        constraints: &Constraints,
    ) -> Result<(), AuthzError>;

    /// Requires access to a resource of `resource_type` that inherits
    /// visibility from an ancestor namespace.
    ///
    /// # Errors
    ///
    /// Same as [`Caller::require_permission`].
    async fn require_access_to_inheritable_resource(
        &self,
        resource_type: ResourceType,
        constraints: &Constraints,
    ) -> Result<(), AuthzError>;

    /// Builds the denial for this caller: `Forbidden` when the caller can see
    /// the resource, `NotFound` otherwise.
    fn unauthorized_error(&self, has_viewer_access: bool) -> AuthzError {
        unauthorized(&self.subject(), has_viewer_access)
    }

    /// Returns the user or service account behind this caller, if any.
    fn subject_caller(&self) -> Option<SubjectCaller<'_>> {
        None
    }
}

// ============================================================================
// SECTION: Subject Caller
// ============================================================================

/// Membership-backed caller, for logic that only applies to users and
/// service accounts.
#[derive(Clone, Copy)]
pub enum SubjectCaller<'a> {
    /// Human user.
    User(&'a UserCaller),
    /// Service account.
    ServiceAccount(&'a ServiceAccountCaller),
}

impl<'a> SubjectCaller<'a> {
    /// Resolves the subject behind `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Forbidden`] when the caller is neither a user nor
    /// a service account.
    pub fn from_caller(caller: &'a dyn Caller) -> Result<Self, AuthzError> {
        caller.subject_caller().ok_or_else(|| {
            AuthzError::Forbidden(format!(
                "{} caller {} is not a user or service account",
                caller.kind(),
                caller.subject()
            ))
        })
    }

    /// Returns the service account id when the subject is a service account.
    #[must_use]
    pub fn service_account_id(&self) -> Option<&'a ServiceAccountId> {
        match self {
            Self::User(_) => None,
            Self::ServiceAccount(caller) => Some(caller.id()),
        }
    }

    /// Returns the user record when the subject is a user.
    #[must_use]
    pub fn user(&self) -> Option<&'a User> {
        match self {
            Self::User(caller) => Some(caller.user()),
            Self::ServiceAccount(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Namespace Access Policy
// ============================================================================

/// Namespaces whose resources a caller may list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamespaceAccessPolicy {
    /// Every namespace is visible.
    pub allow_all: bool,
    /// Top-level namespaces whose subtrees are visible.
    pub root_namespace_paths: Vec<String>,
}

impl NamespaceAccessPolicy {
    /// Policy granting visibility into every namespace.
    #[must_use]
    pub const fn allow_all() -> Self {
        Self {
            allow_all: true,
            root_namespace_paths: Vec::new(),
        }
    }

    /// Policy granting visibility into the given root namespaces.
    #[must_use]
    pub const fn roots(root_namespace_paths: Vec<String>) -> Self {
        Self {
            allow_all: false,
            root_namespace_paths,
        }
    }

    /// Policy granting no visibility.
    #[must_use]
    pub const fn none() -> Self {
        Self::roots(Vec::new())
    }

    /// Returns true when `path` falls inside the policy.
    #[must_use]
    pub fn allows(&self, path: &str) -> bool {
        self.allow_all
            || self.root_namespace_paths.iter().any(|root| is_ancestor_or_self(root, path))
    }
}

// ============================================================================
// SECTION: Caller Context
// ============================================================================

/// Request-scoped holder of the authenticated caller.
#[derive(Clone, Default)]
pub struct CallerContext {
    /// Authenticated caller, absent for anonymous requests.
    caller: Option<Arc<dyn Caller>>,
    /// Request identifier for audit correlation.
    request_id: Option<String>,
}

impl CallerContext {
    /// Creates a context for an authenticated caller.
    #[must_use]
    pub fn new(caller: Arc<dyn Caller>) -> Self {
        Self {
            caller: Some(caller),
            request_id: None,
        }
    }

    /// Creates a context with no caller.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Returns a copy with the request identifier set.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns the request identifier, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Returns the authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Unauthenticated`] when the context has no caller.
    pub fn caller(&self) -> Result<&dyn Caller, AuthzError> {
        self.caller
            .as_deref()
            .ok_or_else(|| AuthzError::Unauthenticated("authentication is required".to_string()))
    }
}

// ============================================================================
// SECTION: Caller Services
// ============================================================================

/// Shared backends used to construct callers for each request.
#[derive(Clone)]
pub struct CallerServices {
    /// Membership query backend.
    pub memberships: Arc<dyn MembershipStore>,
    /// Entity lookup backend.
    pub entities: Arc<dyn EntityStore>,
    /// Maintenance mode monitor.
    pub maintenance: Arc<dyn MaintenanceMonitor>,
    /// Permission to minimum-role model.
    pub permissions: Arc<PermissionModel>,
}

impl CallerServices {
    /// Bundles backends with the default permission model.
    #[must_use]
    pub fn new(
        memberships: Arc<dyn MembershipStore>,
        entities: Arc<dyn EntityStore>,
        maintenance: Arc<dyn MaintenanceMonitor>,
    ) -> Self {
        Self {
            memberships,
            entities,
            maintenance,
            permissions: Arc::new(PermissionModel::new()),
        }
    }

    /// Bundles backends with the configured permission model and a static
    /// maintenance monitor seeded from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a permission override is invalid.
    pub fn from_config(
        config: &NamespaceGateConfig,
        memberships: Arc<dyn MembershipStore>,
        entities: Arc<dyn EntityStore>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            memberships,
            entities,
            maintenance: Arc::new(StaticMaintenanceMonitor::new(config.maintenance.enabled)),
            permissions: Arc::new(config.permission_model()?),
        })
    }

    /// Returns a copy using `permissions` as the permission model.
    #[must_use]
    pub fn with_permission_model(mut self, permissions: PermissionModel) -> Self {
        self.permissions = Arc::new(permissions);
        self
    }

    /// Builds a user caller with a fresh request-scoped authorizer.
    #[must_use]
    pub fn user_caller(&self, user: User) -> UserCaller {
        let authorizer = NamespaceMembershipAuthorizer::for_user(
            user.id.clone(),
            Arc::clone(&self.memberships),
            Arc::clone(&self.entities),
        );
        UserCaller::new(user, Arc::new(authorizer), self.clone())
    }

    /// Builds a service account caller with a fresh request-scoped authorizer.
    #[must_use]
    pub fn service_account_caller(
        &self,
        id: ServiceAccountId,
        resource_path: NamespacePath,
    ) -> ServiceAccountCaller {
        let authorizer = NamespaceMembershipAuthorizer::for_service_account(
            id.clone(),
            Arc::clone(&self.memberships),
            Arc::clone(&self.entities),
        );
        ServiceAccountCaller::new(id, resource_path, Arc::new(authorizer), self.clone())
    }
}
