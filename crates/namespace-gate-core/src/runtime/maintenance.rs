// crates/namespace-gate-core/src/runtime/maintenance.rs
// ============================================================================
// Module: Static Maintenance Monitor
// Description: Flag-backed maintenance mode monitor.
// Purpose: Serve maintenance mode from configuration or an operator toggle.
// Dependencies: async-trait, crate::interfaces
// ============================================================================

//! ## Overview
//! [`StaticMaintenanceMonitor`] reports a flag that can be flipped at runtime.
//! Clones share the same flag.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;

use crate::interfaces::MaintenanceMonitor;
use crate::interfaces::StoreError;

/// Maintenance monitor backed by a shared flag.
#[derive(Debug, Clone, Default)]
pub struct StaticMaintenanceMonitor {
    /// Shared maintenance flag.
    enabled: Arc<AtomicBool>,
}

impl StaticMaintenanceMonitor {
    /// Creates a monitor with the given initial state.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// Enables or disables maintenance mode.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

#[async_trait]
impl MaintenanceMonitor for StaticMaintenanceMonitor {
    async fn in_maintenance_mode(&self) -> Result<bool, StoreError> {
        Ok(self.enabled.load(Ordering::SeqCst))
    }
}
