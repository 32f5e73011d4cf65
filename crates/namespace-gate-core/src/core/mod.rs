// crates/namespace-gate-core/src/core/mod.rs
// ============================================================================
// Module: Namespace Gate Core Types
// Description: Canonical data model for namespace-scoped authorization.
// Purpose: Group identifiers, paths, roles, permissions, and entity records.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types are plain data with no I/O. Authorization decisions are made by
//! the `namespace-gate-authz` crate on top of these types.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod constraints;
pub mod error;
pub mod identifiers;
pub mod models;
pub mod namespace;
pub mod permission;
pub mod role;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use constraints::Constraints;
pub use constraints::require_constraint;
pub use error::AuthzError;
pub use error::ErrorKind;
pub use identifiers::ApplyId;
pub use identifiers::GroupId;
pub use identifiers::JobId;
pub use identifiers::PlanId;
pub use identifiers::RunId;
pub use identifiers::RunnerId;
pub use identifiers::ServiceAccountId;
pub use identifiers::TeamId;
pub use identifiers::UserId;
pub use identifiers::VcsProviderId;
pub use identifiers::WorkspaceId;
pub use identifiers::WorkspaceVcsLinkId;
pub use models::Group;
pub use models::Job;
pub use models::JobType;
pub use models::MembershipSubject;
pub use models::Namespace;
pub use models::NamespaceMembership;
pub use models::Run;
pub use models::Team;
pub use models::TeamMember;
pub use models::User;
pub use models::Workspace;
pub use namespace::NamespacePath;
pub use namespace::NamespacePathError;
pub use namespace::PATH_SEPARATOR;
pub use namespace::expand_path;
pub use namespace::is_ancestor_or_self;
pub use namespace::root_segment;
pub use permission::Action;
pub use permission::Permission;
pub use permission::PermissionModel;
pub use permission::PermissionParseError;
pub use permission::ResourceType;
pub use role::Role;
pub use role::RoleParseError;
