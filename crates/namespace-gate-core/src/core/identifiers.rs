// crates/namespace-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Namespace Gate Identifiers
// Description: Canonical opaque identifiers for platform entities.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical string-based identifiers for the
//! entities the authorizer reasons about. Identifiers are opaque and
//! serialize as strings. Distinct types keep a workspace id from being passed
//! where a group id is expected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Declares an opaque string identifier newtype.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_identifier! {
    /// Human user identifier.
    UserId
}

string_identifier! {
    /// Service account identifier.
    ServiceAccountId
}

string_identifier! {
    /// Group identifier; a group owns exactly one namespace path.
    GroupId
}

string_identifier! {
    /// Workspace identifier; a workspace owns exactly one namespace path.
    WorkspaceId
}

string_identifier! {
    /// Run identifier.
    RunId
}

string_identifier! {
    /// Job identifier.
    JobId
}

string_identifier! {
    /// Plan identifier (one per run).
    PlanId
}

string_identifier! {
    /// Apply identifier (at most one per run).
    ApplyId
}

string_identifier! {
    /// Team identifier.
    TeamId
}

string_identifier! {
    /// Runner agent identifier.
    RunnerId
}

string_identifier! {
    /// VCS provider identifier.
    VcsProviderId
}

string_identifier! {
    /// Workspace VCS link identifier.
    WorkspaceVcsLinkId
}
