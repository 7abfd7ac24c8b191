//! Audit Service
//!
//! Wraps the audit log with the portal's visibility rules. Workflow services
//! record through [`AuditService::record`], which never fails the caller.

use std::sync::Arc;

use mimic_core::error::{PortalError, PortalResult};
use mimic_core::ledger::AuditLog;
use mimic_core::logging::operations;
use mimic_core::policy;
use mimic_core::types::{LogEntry, LogEvent, LogQuery, Viewer};

/// Audit log access for services and callers
#[derive(Clone)]
pub struct AuditService {
    log: Arc<dyn AuditLog>,
    default_limit: usize,
}

impl AuditService {
    pub fn new(log: Arc<dyn AuditLog>, default_limit: usize) -> Self {
        Self { log, default_limit }
    }

    /// Best-effort append. A failure is reported through tracing and the
    /// business operation carries on.
    pub async fn record(&self, event: LogEvent) -> Option<LogEntry> {
        match self.log.append(event).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(
                    operation = operations::AUDIT_APPEND,
                    error = %e,
                    "Audit append failed; continuing"
                );
                None
            }
        }
    }

    /// Explicit append from a caller. Users may only log as themselves.
    pub async fn append(&self, viewer: &Viewer, event: LogEvent) -> PortalResult<LogEntry> {
        if event.user.trim().is_empty() {
            return Err(PortalError::invalid_input("log user is empty"));
        }
        if event.action.trim().is_empty() {
            return Err(PortalError::invalid_input("log action is empty"));
        }
        if event.user != viewer.username && !policy::sees_all_records(viewer.role) {
            return Err(PortalError::forbidden(format!(
                "{} may not log on behalf of {}",
                viewer.username, event.user
            )));
        }
        self.log.append(event).await
    }

    /// Entries visible to the viewer, newest first.
    ///
    /// Users are pinned to their own entries; asking for someone else's is
    /// `Forbidden`.
    pub async fn query(&self, viewer: &Viewer, mut query: LogQuery) -> PortalResult<Vec<LogEntry>> {
        if !policy::sees_all_records(viewer.role) {
            match query.user {
                Some(ref user) if user != &viewer.username => {
                    return Err(PortalError::forbidden(format!(
                        "{} may not read logs of {}",
                        viewer.username, user
                    )));
                }
                _ => query.user = Some(viewer.username.clone()),
            }
        }
        if query.limit.is_none() {
            query.limit = Some(self.default_limit);
        }

        tracing::debug!(
            operation = operations::AUDIT_QUERY,
            actor_id = %viewer.username,
            "Querying audit log"
        );
        self.log.query(&query).await
    }

    /// Number of entries ever appended
    pub async fn count(&self) -> PortalResult<u64> {
        self.log.count().await
    }
}
