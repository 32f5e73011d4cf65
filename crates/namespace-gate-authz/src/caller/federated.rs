// crates/namespace-gate-authz/src/caller/federated.rs
// ============================================================================
// Module: Federated Registry Caller
// Description: Caller for an external registry holding a federated token.
// Purpose: Allow module and provider reads under trusted group globs only.
// Dependencies: async-trait, namespace-gate-core, crate::trust_policy
// ============================================================================

//! ## Overview
//! A federated registry client never receives direct permissions. It may read
//! Terraform modules and providers when every requested namespace path (the
//! constrained group's path first, then any explicit paths) matches one of
//! the globs of a single trust policy the token satisfied at authentication.

use std::sync::Arc;

use async_trait::async_trait;
use namespace_gate_core::AuthzError;
use namespace_gate_core::Constraints;
use namespace_gate_core::EntityStore;
use namespace_gate_core::Permission;
use namespace_gate_core::ResourceType;

use crate::caller::Caller;
use crate::caller::CallerKind;
use crate::caller::NamespaceAccessPolicy;
use crate::trust_policy::TrustPolicy;
use crate::trust_policy::first_matching_policy;

/// Caller representing a federated registry client.
pub struct FederatedRegistryCaller {
    /// Token issuer.
    issuer: String,
    /// Token subject.
    subject: String,
    /// Trust policies the token satisfied.
    policies: Vec<TrustPolicy>,
    /// Entity lookup backend.
    entities: Arc<dyn EntityStore>,
}

impl FederatedRegistryCaller {
    /// Creates a federated registry caller.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        policies: Vec<TrustPolicy>,
        entities: Arc<dyn EntityStore>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            subject: subject.into(),
            policies,
            entities,
        }
    }

    /// Returns the token issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the trust policies the token satisfied.
    #[must_use]
    pub fn policies(&self) -> &[TrustPolicy] {
        &self.policies
    }

    /// Collects the requested paths: the group path, then explicit paths.
    async fn requested_paths(&self, constraints: &Constraints) -> Result<Vec<String>, AuthzError> {
        let mut paths = Vec::with_capacity(constraints.namespace_paths.len() + 1);
        if let Some(group_id) = &constraints.group_id {
            let group = self
                .entities
                .get_group_by_id(group_id)
                .await?
                .ok_or_else(|| self.unauthorized_error(false))?;
            paths.push(group.full_path.as_str().to_string());
        }
        paths.extend(constraints.namespace_paths.iter().cloned());
        Ok(paths)
    }
}

#[async_trait]
impl Caller for FederatedRegistryCaller {
    fn kind(&self) -> CallerKind {
        CallerKind::FederatedRegistry
    }

    fn subject(&self) -> String {
        format!("federated registry {} ({})", self.subject, self.issuer)
    }

    async fn namespace_access_policy(&self) -> Result<NamespaceAccessPolicy, AuthzError> {
        Ok(NamespaceAccessPolicy::none())
    }

    async fn require_permission(
        &self,
        _permission: Permission,
        _constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        Err(self.unauthorized_error(false))
    }

    async fn require_access_to_inheritable_resource(
        &self,
        resource_type: ResourceType,
        constraints: &Constraints,
    ) -> Result<(), AuthzError> {
        if !matches!(resource_type, ResourceType::TerraformModule | ResourceType::TerraformProvider)
        {
            return Err(self.unauthorized_error(false));
        }
        if constraints.group_id.is_none() && constraints.namespace_paths.is_empty() {
            return Err(AuthzError::InvalidConstraints(
                "missing required constraint: namespace_paths or group_id".to_string(),
            ));
        }
        let paths = self.requested_paths(constraints).await?;
        if first_matching_policy(&self.policies, &paths).is_some() {
            Ok(())
        } else {
            Err(self.unauthorized_error(false))
        }
    }
}
