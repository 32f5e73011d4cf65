// crates/namespace-gate-authz/src/audit.rs
// ============================================================================
// Module: Authorization Audit Logging
// Description: Structured audit events for authorization decisions.
// Purpose: Emit one JSON line per decision without a logging framework.
// Dependencies: namespace-gate-config, serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the audit event payload and sinks for authorization
//! decisions. Deployments route events to their own pipeline by choosing a
//! sink: JSON lines on stderr, JSON lines appended to a file, or nothing.
//! Sinks never fail the decision they record; write errors are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use namespace_gate_config::AuditConfig;
use namespace_gate_config::AuditSinkKind;
use serde::Serialize;

use crate::caller::CallerKind;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthzDecision {
    /// Access granted.
    Allow,
    /// Access denied or the check failed.
    Deny,
}

/// Authorization audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AuthzAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Caller kind, absent for unauthenticated requests.
    pub caller_kind: Option<CallerKind>,
    /// Caller subject, absent for unauthenticated requests.
    pub subject: Option<String>,
    /// Check label (`permission:<resource>:<action>` or `inheritable:<resource>`).
    pub check: String,
    /// Decision outcome.
    pub decision: AuthzDecision,
    /// Normalized error kind label on denial.
    pub error_kind: Option<&'static str>,
    /// Denial reason.
    pub reason: Option<String>,
}

/// Inputs required to construct an audit event.
pub struct AuthzAuditEventParams {
    /// Event identifier.
    pub event: &'static str,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Caller kind.
    pub caller_kind: Option<CallerKind>,
    /// Caller subject.
    pub subject: Option<String>,
    /// Check label.
    pub check: String,
    /// Decision outcome.
    pub decision: AuthzDecision,
    /// Normalized error kind label on denial.
    pub error_kind: Option<&'static str>,
    /// Denial reason.
    pub reason: Option<String>,
}

impl AuthzAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: AuthzAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: params.event,
            timestamp_ms,
            request_id: params.request_id,
            caller_kind: params.caller_kind,
            subject: params.subject,
            check: params.check,
            decision: params.decision,
            error_kind: params.error_kind,
            reason: params.reason,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for authorization events.
pub trait AuthzAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &AuthzAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuthzAuditSink for StderrAuditSink {
    fn record(&self, event: &AuthzAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuthzAuditSink for FileAuditSink {
    fn record(&self, event: &AuthzAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            // Each line is written whole, so a poisoned lock still guards a usable file.
            let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuthzAuditSink for NoopAuditSink {
    fn record(&self, _event: &AuthzAuditEvent) {}
}

/// Builds the sink selected by configuration.
///
/// # Errors
///
/// Returns an error when the file sink cannot open its path.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn AuthzAuditSink>> {
    match (config.sink, config.path.as_deref()) {
        (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
        (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
        (AuditSinkKind::File, Some(path)) => Ok(Arc::new(FileAuditSink::new(Path::new(path))?)),
        (AuditSinkKind::File, None) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "audit.path is required for the file sink",
        )),
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit panics and unwraps for clarity."
    )]

    use std::thread;

    use super::*;

    /// Deny event for the `permission:run:view` check.
    fn deny_event() -> AuthzAuditEvent {
        AuthzAuditEvent::new(AuthzAuditEventParams {
            event: "authz_decision",
            request_id: None,
            caller_kind: None,
            subject: None,
            check: "permission:run:view".to_string(),
            decision: AuthzDecision::Deny,
            error_kind: Some("unauthenticated"),
            reason: None,
        })
    }

    #[test]
    fn file_sink_keeps_writing_after_lock_poisoning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authz.log");
        let sink = Arc::new(FileAuditSink::new(&path).unwrap());
        sink.record(&deny_event());

        let poisoner = Arc::clone(&sink);
        let joined = thread::spawn(move || {
            let _guard = poisoner.file.lock().unwrap();
            panic!("poison the audit file lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(sink.file.is_poisoned());

        sink.record(&deny_event());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
