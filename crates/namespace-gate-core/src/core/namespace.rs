// crates/namespace-gate-core/src/core/namespace.rs
// ============================================================================
// Module: Namespace Paths
// Description: Hierarchical namespace path type and ancestor expansion.
// Purpose: Decompose slash-delimited paths into ordered ancestor chains.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A namespace path such as `org/team/project` names a node in the group and
//! workspace tree. Every prefix path (`org`, `org/team`) is an ancestor.
//! Expansion always yields the most specific path first so callers can walk
//! the hierarchy bottom-up and stop at the first hit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between namespace path segments.
pub const PATH_SEPARATOR: char = '/';

// ============================================================================
// SECTION: Namespace Path
// ============================================================================

/// Validated slash-delimited namespace path.
///
/// # Invariants
/// - Non-empty, with no empty segments (no leading, trailing, or doubled `/`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespacePath(String);

impl NamespacePath {
    /// Parses and validates a namespace path.
    ///
    /// # Errors
    ///
    /// Returns [`NamespacePathError`] when the path is empty or has an empty segment.
    pub fn parse(path: impl Into<String>) -> Result<Self, NamespacePathError> {
        let path = path.into();
        if path.is_empty() {
            return Err(NamespacePathError::Empty);
        }
        if path.split(PATH_SEPARATOR).any(str::is_empty) {
            return Err(NamespacePathError::EmptySegment(path));
        }
        Ok(Self(path))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the top-level segment of the path.
    #[must_use]
    pub fn root(&self) -> &str {
        root_segment(&self.0)
    }

    /// Returns the parent path, or `None` for a top-level namespace.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.rsplit_once(PATH_SEPARATOR).map(|(parent, _)| Self(parent.to_string()))
    }

    /// Returns every ancestor path including this one, most specific first.
    #[must_use]
    pub fn expand(&self) -> Vec<String> {
        expand_path(&self.0)
    }

    /// Returns true when `self` equals `other` or is one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self_of(&self, other: &str) -> bool {
        is_ancestor_or_self(&self.0, other)
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for NamespacePath {
    type Error = NamespacePathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for NamespacePath {
    type Error = NamespacePathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<NamespacePath> for String {
    fn from(value: NamespacePath) -> Self {
        value.0
    }
}

/// Namespace path validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespacePathError {
    /// Path was empty.
    #[error("namespace path must not be empty")]
    Empty,
    /// Path contained an empty segment.
    #[error("namespace path contains an empty segment: {0}")]
    EmptySegment(String),
}

// ============================================================================
// SECTION: Path Helpers
// ============================================================================

/// Expands a path into every prefix path, from the full path down to the root.
///
/// `"a/b/c"` expands to `["a/b/c", "a/b", "a"]`. An empty input yields no paths.
#[must_use]
pub fn expand_path(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    (1 ..= segments.len()).rev().map(|len| segments[.. len].join("/")).collect()
}

/// Returns the top-level segment of a path.
#[must_use]
pub fn root_segment(path: &str) -> &str {
    path.split(PATH_SEPARATOR).next().unwrap_or(path)
}

/// Returns true when `ancestor` equals `path` or is a strict prefix path of it.
#[must_use]
pub fn is_ancestor_or_self(ancestor: &str, path: &str) -> bool {
    path == ancestor
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR) && !ancestor.is_empty())
}
