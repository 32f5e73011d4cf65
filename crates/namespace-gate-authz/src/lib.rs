// crates/namespace-gate-authz/src/lib.rs
// ============================================================================
// Module: Namespace Gate Authorization
// Description: Namespace-scoped authorization for every caller type.
// Purpose: Decide whether a caller may perform a permission on a resource.
// Dependencies: namespace-gate-core, namespace-gate-config, async-trait, globset
// ============================================================================

//! ## Overview
//! `namespace-gate-authz` answers one question per request: may this caller
//! perform this permission against this resource? Membership-backed callers
//! (users and service accounts) resolve roles through a
//! [`NamespaceMembershipAuthorizer`] that walks the namespace hierarchy and
//! caches what it learns for the lifetime of the request. Other callers
//! (jobs, VCS workspace links, federated registries, SCIM clients, the system)
//! apply their own fixed rules. A [`PermissionGuard`] resolves the caller from
//! an explicit [`CallerContext`] and records one audit event per decision.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod authorizer;
pub mod cache;
pub mod caller;
pub mod dispatch;
pub mod federated_auth;
pub mod guard;
pub mod trust_policy;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuthzAuditEvent;
pub use audit::AuthzAuditEventParams;
pub use audit::AuthzAuditSink;
pub use audit::AuthzDecision;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::audit_sink_from_config;
pub use authorizer::Authorizer;
pub use authorizer::NamespaceMembershipAuthorizer;
pub use cache::CacheKey;
pub use cache::RoleCache;
pub use caller::Caller;
pub use caller::CallerContext;
pub use caller::CallerKind;
pub use caller::CallerServices;
pub use caller::NamespaceAccessPolicy;
pub use caller::SubjectCaller;
pub use caller::federated::FederatedRegistryCaller;
pub use caller::job::JobCaller;
pub use caller::scim::ScimCaller;
pub use caller::service_account::ServiceAccountCaller;
pub use caller::system::SystemCaller;
pub use caller::user::UserCaller;
pub use caller::vcs::VcsWorkspaceLinkCaller;
pub use federated_auth::FederatedRegistryAuthenticator;
pub use guard::PermissionGuard;
pub use trust_policy::TrustPolicy;
pub use trust_policy::TrustPolicyError;
