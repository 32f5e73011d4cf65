// crates/namespace-gate-core/src/core/error.rs
// ============================================================================
// Module: Authorization Errors
// Description: Error taxonomy for authorization decisions.
// Purpose: Separate denials from backend failures with stable kinds.
// Dependencies: thiserror, crate::interfaces
// ============================================================================

//! ## Overview
//! Every denial is one of a small set of kinds. `Forbidden` and `NotFound`
//! are both denials; which one is returned depends on whether the caller has
//! viewer-level visibility, never on whether the resource exists. Store
//! failures are carried unchanged in [`AuthzError::Upstream`].

use serde::Serialize;
use thiserror::Error;

use crate::interfaces::StoreError;

/// Authorization failures.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// No authenticated caller is present.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Caller is known and may see the resource, but the action is denied.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Resource is hidden from a caller without visibility.
    #[error("not found: {0}")]
    NotFound(String),
    /// Mutation rejected while the system is in maintenance mode.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// A handler's required constraint was not supplied.
    #[error("invalid constraints: {0}")]
    InvalidConstraints(String),
    /// External store failure, propagated unchanged.
    #[error(transparent)]
    Upstream(#[from] StoreError),
}

impl AuthzError {
    /// Returns the stable error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::InvalidConstraints(_) => ErrorKind::InvalidConstraints,
            Self::Upstream(_) => ErrorKind::Upstream,
        }
    }

    /// Returns true when the error is an access denial rather than a failure.
    #[must_use]
    pub const fn is_denial(&self) -> bool {
        matches!(self, Self::Forbidden(_) | Self::NotFound(_) | Self::ServiceUnavailable(_))
    }
}

/// Stable classification of [`AuthzError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No caller.
    Unauthenticated,
    /// Denied with visibility.
    Forbidden,
    /// Denied without visibility.
    NotFound,
    /// Maintenance mode.
    ServiceUnavailable,
    /// Programmer error.
    InvalidConstraints,
    /// Backend failure.
    Upstream,
}

impl ErrorKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::ServiceUnavailable => "service_unavailable",
            Self::InvalidConstraints => "invalid_constraints",
            Self::Upstream => "upstream",
        }
    }

    /// Returns the HTTP status code an API layer reports for this kind.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::ServiceUnavailable => 503,
            Self::InvalidConstraints => 500,
            Self::Upstream => 502,
        }
    }
}
