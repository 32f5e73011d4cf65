// crates/namespace-gate-core/src/lib.rs
// ============================================================================
// Module: Namespace Gate Core Library
// Description: Public API surface for the Namespace Gate core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Namespace Gate core defines the vocabulary of namespace-scoped
//! authorization: identifiers, hierarchical namespace paths, roles,
//! permissions, per-check constraints, and the entity records the authorizer
//! reads. External systems (membership storage, entity lookups, maintenance
//! monitoring, token verification) integrate through explicit interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::EntityStore;
pub use interfaces::MaintenanceMonitor;
pub use interfaces::MembershipQuery;
pub use interfaces::MembershipSort;
pub use interfaces::MembershipStore;
pub use interfaces::StoreError;
pub use interfaces::TokenClaims;
pub use interfaces::TokenError;
pub use interfaces::TokenVerifier;
pub use runtime::InMemoryStore;
pub use runtime::StaticMaintenanceMonitor;
