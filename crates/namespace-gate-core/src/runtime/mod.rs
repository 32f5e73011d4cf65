// crates/namespace-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Namespace Gate Runtime Helpers
// Description: In-process implementations of the core interfaces.
// Purpose: Provide deterministic stores and monitors for tests and demos.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime helpers implement the core interfaces entirely in memory. They are
//! intended for tests, examples, and single-process deployments.

pub mod maintenance;
pub mod store;

pub use maintenance::StaticMaintenanceMonitor;
pub use store::InMemoryStore;
