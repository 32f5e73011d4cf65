// crates/namespace-gate-config/src/lib.rs
// ============================================================================
// Module: Namespace Gate Config Library
// Description: Canonical config model and validation for namespace-gate.toml.
// Purpose: Single source of truth for authorization engine settings.
// Dependencies: namespace-gate-core, globset, serde, toml
// ============================================================================

//! ## Overview
//! `namespace-gate-config` defines the configuration model for the
//! authorization engine: maintenance mode seeding, permission-model role
//! overrides, federated registry trust policies, and audit sink selection.
//! Loading is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
