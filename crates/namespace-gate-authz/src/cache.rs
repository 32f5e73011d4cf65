// crates/namespace-gate-authz/src/cache.rs
// ============================================================================
// Module: Role Cache
// Description: Per-authorizer cache of the highest role seen per key.
// Purpose: Avoid repeated membership queries within a single request.
// Dependencies: namespace-gate-core
// ============================================================================

//! ## Overview
//! The cache maps a namespace path, workspace id, or group id to the highest
//! role observed for it. Entries only ever grow: a merge with a lower role is
//! ignored. Path lookups walk the ancestor chain from the most specific path
//! and stop at the first cached entry. There is no eviction; the cache lives
//! and dies with its authorizer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::PoisonError;
use std::sync::RwLock;

use namespace_gate_core::GroupId;
use namespace_gate_core::Role;
use namespace_gate_core::WorkspaceId;
use namespace_gate_core::expand_path;

// ============================================================================
// SECTION: Keys
// ============================================================================

/// Cache key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CacheKey {
    /// Full namespace path.
    Namespace(String),
    /// Workspace identifier.
    Workspace(WorkspaceId),
    /// Group identifier.
    Group(GroupId),
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Monotonic role cache guarded by a reader/writer lock.
///
/// # Invariants
/// - A cached role never decreases.
#[derive(Debug, Default)]
pub struct RoleCache {
    /// Highest role per key.
    entries: RwLock<BTreeMap<CacheKey, Role>>,
}

impl RoleCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the cached role for `key` is at least `required`.
    ///
    /// Namespace keys consult the nearest cached ancestor (or the path
    /// itself); id keys require an exact entry.
    #[must_use]
    pub fn get(&self, key: &CacheKey, required: Role) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match key {
            CacheKey::Namespace(path) => expand_path(path)
                .into_iter()
                .find_map(|ancestor| entries.get(&CacheKey::Namespace(ancestor)))
                .is_some_and(|role| role.gte(required)),
            CacheKey::Workspace(_) | CacheKey::Group(_) => {
                entries.get(key).is_some_and(|role| role.gte(required))
            }
        }
    }

    /// Returns the exact cached role for `key`.
    #[must_use]
    pub fn role(&self, key: &CacheKey) -> Option<Role> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(key).copied()
    }

    /// Stores `role` unless an equal or higher role is already cached.
    pub fn merge(&self, key: CacheKey, role: Role) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&key) {
            Some(existing) if existing.gte(role) => {}
            _ => {
                entries.insert(key, role);
            }
        }
    }

    /// Returns the number of cached keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
