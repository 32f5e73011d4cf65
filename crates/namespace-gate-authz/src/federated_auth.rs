// crates/namespace-gate-authz/src/federated_auth.rs
// ============================================================================
// Module: Federated Registry Authentication
// Description: Turns a verified federated token into a registry caller.
// Purpose: Bind a token to the trust policies its claims satisfy.
// Dependencies: namespace-gate-config, namespace-gate-core, crate::trust_policy
// ============================================================================

//! ## Overview
//! The authenticator verifies a bearer token with a [`TokenVerifier`], keeps
//! every configured trust policy whose issuer, subject, and audience the
//! claims satisfy, and returns a [`FederatedRegistryCaller`] holding those
//! policies. A token that verifies but satisfies no policy is rejected as
//! unauthenticated. Failures are recorded to the audit sink when one is set.

use std::sync::Arc;

use namespace_gate_config::FederatedRegistryConfig;
use namespace_gate_core::AuthzError;
use namespace_gate_core::EntityStore;
use namespace_gate_core::TokenError;
use namespace_gate_core::TokenVerifier;

use crate::audit::AuthzAuditEvent;
use crate::audit::AuthzAuditEventParams;
use crate::audit::AuthzAuditSink;
use crate::audit::AuthzDecision;
use crate::caller::CallerKind;
use crate::caller::federated::FederatedRegistryCaller;
use crate::trust_policy::TrustPolicy;
use crate::trust_policy::TrustPolicyError;

/// Authenticator for federated registry tokens.
pub struct FederatedRegistryAuthenticator {
    /// Token verifier for trusted issuers.
    verifier: Arc<dyn TokenVerifier>,
    /// Configured trust policies.
    policies: Vec<TrustPolicy>,
    /// Entity lookup backend handed to authenticated callers.
    entities: Arc<dyn EntityStore>,
    /// Optional sink for authentication failures.
    audit: Option<Arc<dyn AuthzAuditSink>>,
}

impl FederatedRegistryAuthenticator {
    /// Creates an authenticator over compiled trust policies.
    #[must_use]
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        policies: Vec<TrustPolicy>,
        entities: Arc<dyn EntityStore>,
    ) -> Self {
        Self {
            verifier,
            policies,
            entities,
            audit: None,
        }
    }

    /// Creates an authenticator from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrustPolicyError`] when a configured policy does not compile.
    pub fn from_config(
        verifier: Arc<dyn TokenVerifier>,
        config: &FederatedRegistryConfig,
        entities: Arc<dyn EntityStore>,
    ) -> Result<Self, TrustPolicyError> {
        let policies = config
            .trust_policies
            .iter()
            .map(TrustPolicy::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(verifier, policies, entities))
    }

    /// Returns a copy recording authentication failures to `audit`.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuthzAuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Verifies `token` and builds a caller bound to the matching policies.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Unauthenticated`] when the token fails
    /// verification or satisfies no trust policy.
    pub async fn authenticate(&self, token: &str) -> Result<FederatedRegistryCaller, AuthzError> {
        let claims = match self.verifier.verify(token).await {
            Ok(claims) => claims,
            Err(err) => return Err(self.reject(None, &err_message(&err))),
        };
        let policies: Vec<TrustPolicy> =
            self.policies.iter().filter(|policy| policy.matches_claims(&claims)).cloned().collect();
        if policies.is_empty() {
            let message = format!("no trust policy matches token issuer {}", claims.issuer);
            return Err(self.reject(Some(claims.subject), &message));
        }
        Ok(FederatedRegistryCaller::new(
            claims.issuer,
            claims.subject,
            policies,
            Arc::clone(&self.entities),
        ))
    }

    /// Records a failed authentication and builds the error.
    fn reject(&self, subject: Option<String>, message: &str) -> AuthzError {
        let err = AuthzError::Unauthenticated(message.to_string());
        if let Some(audit) = &self.audit {
            audit.record(&AuthzAuditEvent::new(AuthzAuditEventParams {
                event: "federated_authentication",
                request_id: None,
                caller_kind: Some(CallerKind::FederatedRegistry),
                subject,
                check: "authenticate".to_string(),
                decision: AuthzDecision::Deny,
                error_kind: Some(err.kind().as_str()),
                reason: Some(err.to_string()),
            }));
        }
        err
    }
}

/// Describes a token failure without echoing the token.
fn err_message(err: &TokenError) -> String {
    format!("federated token rejected: {err}")
}
