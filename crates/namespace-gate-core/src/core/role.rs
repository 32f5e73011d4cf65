// crates/namespace-gate-core/src/core/role.rs
// ============================================================================
// Module: Namespace Roles
// Description: Totally ordered membership roles.
// Purpose: Provide the role lattice used for GTE access comparisons.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Roles form a closed, totally ordered set:
//! `Viewer < Deployer < Maintainer < Owner`. Access checks only ever ask
//! whether a held role is greater than or equal to a required role.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Namespace membership role.
///
/// # Invariants
/// - Declaration order defines rank; derived `Ord` is the GTE relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Read-only access.
    Viewer,
    /// May create runs and apply changes.
    Deployer,
    /// May manage namespace resources.
    Maintainer,
    /// Full control, including memberships.
    Owner,
}

impl Role {
    /// Returns true when this role is greater than or equal to `required`.
    #[must_use]
    pub fn gte(self, required: Self) -> bool {
        self >= required
    }

    /// Returns a stable label for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Deployer => "deployer",
            Self::Maintainer => "maintainer",
            Self::Owner => "owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "viewer" => Ok(Self::Viewer),
            "deployer" => Ok(Self::Deployer),
            "maintainer" => Ok(Self::Maintainer),
            "owner" => Ok(Self::Owner),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// Unknown role label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);
