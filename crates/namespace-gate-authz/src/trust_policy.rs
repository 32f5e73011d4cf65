// crates/namespace-gate-authz/src/trust_policy.rs
// ============================================================================
// Module: Federated Trust Policies
// Description: Compiled per-issuer trust policies with group path globs.
// Purpose: Decide which namespaces a federated registry client may read.
// Dependencies: globset, namespace-gate-config, namespace-gate-core, thiserror
// ============================================================================

//! ## Overview
//! A trust policy names a token issuer, optional subject and audience
//! requirements, and the group path globs the issuer may read from. Globs use
//! literal separators: `*` matches within one path segment and never crosses
//! `/`, so `org/*` matches `org/team` but neither `org` nor `org/team/sub`.
//! A policy with no globs matches nothing.

use globset::Glob;
use globset::GlobBuilder;
use globset::GlobSet;
use globset::GlobSetBuilder;
use namespace_gate_config::TrustPolicyConfig;
use namespace_gate_core::TokenClaims;
use thiserror::Error;

/// Trust policy construction failures.
#[derive(Debug, Error)]
pub enum TrustPolicyError {
    /// Issuer was empty.
    #[error("trust policy issuer must be non-empty")]
    EmptyIssuer,
    /// A group glob failed to compile.
    #[error("invalid trust policy glob {glob}: {message}")]
    InvalidGlob {
        /// Offending glob.
        glob: String,
        /// Compiler message.
        message: String,
    },
}

/// Compiled trust policy for one federated token issuer.
#[derive(Debug, Clone)]
pub struct TrustPolicy {
    /// Token issuer.
    issuer: String,
    /// Required token subject.
    subject: Option<String>,
    /// Required token audience.
    audience: Option<String>,
    /// Source globs, kept for display.
    group_globs: Vec<String>,
    /// Compiled globs.
    matcher: GlobSet,
}

impl TrustPolicy {
    /// Compiles a policy for `issuer` with the given group globs.
    ///
    /// # Errors
    ///
    /// Returns [`TrustPolicyError`] when the issuer is empty or a glob is invalid.
    pub fn new<I, S>(issuer: impl Into<String>, group_globs: I) -> Result<Self, TrustPolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let issuer = issuer.into();
        if issuer.trim().is_empty() {
            return Err(TrustPolicyError::EmptyIssuer);
        }
        let group_globs: Vec<String> = group_globs.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        for glob in &group_globs {
            builder.add(compile_glob(glob)?);
        }
        let matcher = builder.build().map_err(|err| TrustPolicyError::InvalidGlob {
            glob: group_globs.join(","),
            message: err.to_string(),
        })?;
        Ok(Self {
            issuer,
            subject: None,
            audience: None,
            group_globs,
            matcher,
        })
    }

    /// Compiles a policy from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrustPolicyError`] when the issuer is empty or a glob is invalid.
    pub fn from_config(config: &TrustPolicyConfig) -> Result<Self, TrustPolicyError> {
        let mut policy = Self::new(config.issuer.clone(), config.group_globs.iter().cloned())?;
        policy.subject.clone_from(&config.subject);
        policy.audience.clone_from(&config.audience);
        Ok(policy)
    }

    /// Returns a copy requiring the token subject to equal `subject`.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Returns a copy requiring the token audiences to include `audience`.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Returns the issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the source globs.
    #[must_use]
    pub fn group_globs(&self) -> &[String] {
        &self.group_globs
    }

    /// Returns true when the token claims satisfy the issuer, subject, and
    /// audience requirements.
    #[must_use]
    pub fn matches_claims(&self, claims: &TokenClaims) -> bool {
        claims.issuer == self.issuer
            && self.subject.as_ref().is_none_or(|subject| &claims.subject == subject)
            && self
                .audience
                .as_ref()
                .is_none_or(|audience| claims.audiences.iter().any(|aud| aud == audience))
    }

    /// Returns true when `path` matches at least one group glob.
    #[must_use]
    pub fn matches_path(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Returns true when every path matches at least one group glob.
    #[must_use]
    pub fn matches_all<S: AsRef<str>>(&self, paths: &[S]) -> bool {
        paths.iter().all(|path| self.matches_path(path.as_ref()))
    }
}

/// Returns the first policy matching every path.
#[must_use]
pub fn first_matching_policy<'a, S: AsRef<str>>(
    policies: &'a [TrustPolicy],
    paths: &[S],
) -> Option<&'a TrustPolicy> {
    policies.iter().find(|policy| policy.matches_all(paths))
}

/// Compiles one group glob with literal separators.
fn compile_glob(glob: &str) -> Result<Glob, TrustPolicyError> {
    GlobBuilder::new(glob).literal_separator(true).build().map_err(|err| {
        TrustPolicyError::InvalidGlob {
            glob: glob.to_string(),
            message: err.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test fixtures use unwraps for clarity.")]

    use super::*;

    #[test]
    fn star_stays_within_one_segment() {
        let policy = TrustPolicy::new("iss", ["group1/*"]).unwrap();
        assert!(policy.matches_path("group1/a"));
        assert!(!policy.matches_path("group1"));
        assert!(!policy.matches_path("group1/a/b"));
        assert!(!policy.matches_path("group2/x"));
    }

    #[test]
    fn empty_globs_match_nothing() {
        let policy = TrustPolicy::new("iss", Vec::<String>::new()).unwrap();
        assert!(!policy.matches_path("group1"));
    }

    #[test]
    fn blank_issuer_is_rejected() {
        assert!(matches!(TrustPolicy::new(" ", ["a"]), Err(TrustPolicyError::EmptyIssuer)));
    }
}
