// crates/namespace-gate-authz/tests/common/mod.rs
// =============================================================================
// Module: Authz Test Fixtures
// Description: Shared store seeding, caller builders, and recording sinks.
// Purpose: Reduce duplication across integration tests for namespace-gate-authz.
// =============================================================================

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test helpers are selectively used across suites."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use namespace_gate_authz::AuthzAuditEvent;
use namespace_gate_authz::AuthzAuditSink;
use namespace_gate_authz::CallerServices;
use namespace_gate_authz::UserCaller;
use namespace_gate_core::Group;
use namespace_gate_core::InMemoryStore;
use namespace_gate_core::MembershipSubject;
use namespace_gate_core::Namespace;
use namespace_gate_core::NamespaceMembership;
use namespace_gate_core::NamespacePath;
use namespace_gate_core::Role;
use namespace_gate_core::ServiceAccountId;
use namespace_gate_core::StaticMaintenanceMonitor;
use namespace_gate_core::TokenClaims;
use namespace_gate_core::TokenError;
use namespace_gate_core::TokenVerifier;
use namespace_gate_core::User;
use namespace_gate_core::UserId;
use namespace_gate_core::Workspace;

/// Parses a namespace path fixture.
pub fn path(value: &str) -> NamespacePath {
    NamespacePath::parse(value).unwrap()
}

/// Store seeded with a small hierarchy:
///
/// ```text
/// org                (group g-org)
/// org/team           (group g-team)
/// org/team/ws1       (workspace ws-1)
/// org/ws2            (workspace ws-2)
/// other              (group g-other)
/// other/ws3          (workspace ws-3)
/// ```
pub fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    for (id, full_path) in [("g-org", "org"), ("g-team", "org/team"), ("g-other", "other")] {
        store.add_group(Group {
            id: id.into(),
            full_path: path(full_path),
        });
    }
    for (id, full_path) in [("ws-1", "org/team/ws1"), ("ws-2", "org/ws2"), ("ws-3", "other/ws3")] {
        store.add_workspace(Workspace {
            id: id.into(),
            full_path: path(full_path),
        });
    }
    store
}

/// Returns the group id owning a fixture path, if it is a group.
fn group_id_for(full_path: &str) -> Option<&'static str> {
    match full_path {
        "org" => Some("g-org"),
        "org/team" => Some("g-team"),
        "other" => Some("g-other"),
        _ => None,
    }
}

/// Returns the workspace id owning a fixture path, if it is a workspace.
fn workspace_id_for(full_path: &str) -> Option<&'static str> {
    match full_path {
        "org/team/ws1" => Some("ws-1"),
        "org/ws2" => Some("ws-2"),
        "other/ws3" => Some("ws-3"),
        _ => None,
    }
}

/// Builds the namespace record for a fixture path.
pub fn namespace(full_path: &str) -> Namespace {
    if let Some(workspace_id) = workspace_id_for(full_path) {
        return Namespace::workspace(path(full_path), workspace_id);
    }
    let group_id = group_id_for(full_path).map_or_else(|| format!("g-{full_path}"), str::to_string);
    Namespace::group(path(full_path), group_id)
}

/// Grants `role` at `full_path` to a user.
pub fn grant_user(store: &InMemoryStore, user_id: &str, full_path: &str, role: Role) {
    store.add_membership(NamespaceMembership {
        subject: MembershipSubject::User(UserId::new(user_id)),
        namespace: namespace(full_path),
        role,
    });
}

/// Grants `role` at `full_path` to a service account.
pub fn grant_service_account(store: &InMemoryStore, id: &str, full_path: &str, role: Role) {
    store.add_membership(NamespaceMembership {
        subject: MembershipSubject::ServiceAccount(ServiceAccountId::new(id)),
        namespace: namespace(full_path),
        role,
    });
}

/// Builds caller services over `store` with a controllable maintenance monitor.
pub fn services(store: &InMemoryStore) -> (CallerServices, StaticMaintenanceMonitor) {
    let monitor = StaticMaintenanceMonitor::new(false);
    let services = CallerServices::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(monitor.clone()),
    );
    (services, monitor)
}

/// Builds a user record.
pub fn user(id: &str, admin: bool) -> User {
    User {
        id: id.into(),
        username: format!("{id}@example.com"),
        admin,
        scim_external_id: None,
    }
}

/// Builds a user caller over `services`.
pub fn user_caller(services: &CallerServices, id: &str, admin: bool) -> UserCaller {
    services.user_caller(user(id, admin))
}

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded events.
    events: Mutex<Vec<AuthzAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns a snapshot of the recorded events.
    pub fn events(&self) -> Vec<AuthzAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuthzAuditSink for RecordingAuditSink {
    fn record(&self, event: &AuthzAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Token verifier answering from a fixed token table.
#[derive(Default)]
pub struct StaticTokenVerifier {
    /// Claims keyed by raw token.
    tokens: BTreeMap<String, TokenClaims>,
}

impl StaticTokenVerifier {
    /// Returns a copy that accepts `token` with the given claims.
    pub fn with_token(mut self, token: &str, issuer: &str, subject: &str, audience: &str) -> Self {
        self.tokens.insert(
            token.to_string(),
            TokenClaims {
                issuer: issuer.to_string(),
                subject: subject.to_string(),
                audiences: vec![audience.to_string()],
                custom: BTreeMap::new(),
            },
        );
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| TokenError::Invalid("unknown token".to_string()))
    }
}
