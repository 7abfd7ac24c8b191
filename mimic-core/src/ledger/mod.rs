//! Store interfaces for the portal
//!
//! The portal keeps three stores:
//! - Request Store: application requests in submission order
//! - Ticket Store: deployment tickets in creation order
//! - Audit Log: append-only record of install, chat, file and system events
//!
//! Implementations live in `mimic-db` (in-memory and JSON file backed).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PortalResult;
use crate::types::{AppRequest, LogEntry, LogEvent, LogQuery, RequestStatus, Ticket, TicketStatus};
use crate::workflow::SwapOutcome;

/// Filter for request and ticket listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter<S> {
    pub user: Option<String>,
    pub status: Option<S>,
}

impl<S> Default for RecordFilter<S> {
    fn default() -> Self {
        Self {
            user: None,
            status: None,
        }
    }
}

impl<S: PartialEq> RecordFilter<S> {
    pub fn new(user: Option<String>, status: Option<S>) -> Self {
        Self { user, status }
    }

    pub fn matches(&self, user: &str, status: &S) -> bool {
        self.user.as_deref().map_or(true, |u| u == user)
            && self.status.as_ref().map_or(true, |s| s == status)
    }
}

pub type RequestFilter = RecordFilter<RequestStatus>;
pub type TicketFilter = RecordFilter<TicketStatus>;

/// Request store
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Insert a new request; fails with `InvalidInput` on a duplicate id
    async fn insert(&self, request: AppRequest) -> PortalResult<()>;

    /// Get request by id
    async fn get(&self, request_id: &str) -> PortalResult<Option<AppRequest>>;

    /// List requests in submission order
    async fn list(&self, filter: &RequestFilter) -> PortalResult<Vec<AppRequest>>;

    /// Replace the status if it still equals `expected`, recording the decider.
    /// Fails with `NotFound` for an unknown id.
    async fn swap_status(
        &self,
        request_id: &str,
        expected: RequestStatus,
        next: RequestStatus,
        decided_by: &str,
    ) -> PortalResult<SwapOutcome<AppRequest>>;
}

/// Ticket store
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Insert a new ticket; fails with `InvalidInput` on a duplicate id and
    /// with `InvalidState` when another ticket is already linked to the same
    /// request. Both checks happen atomically with the insert.
    async fn insert(&self, ticket: Ticket) -> PortalResult<()>;

    /// Get ticket by id
    async fn get(&self, ticket_id: &str) -> PortalResult<Option<Ticket>>;

    /// List tickets in creation order
    async fn list(&self, filter: &TicketFilter) -> PortalResult<Vec<Ticket>>;

    /// Replace the status if it still equals `expected`.
    /// Fails with `NotFound` for an unknown id.
    async fn swap_status(
        &self,
        ticket_id: &str,
        expected: TicketStatus,
        next: TicketStatus,
    ) -> PortalResult<SwapOutcome<Ticket>>;
}

/// Append-only audit log
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append an event, assigning the next sequence number and a timestamp
    /// no earlier than the previous entry's
    async fn append(&self, event: LogEvent) -> PortalResult<LogEntry>;

    /// Matching entries, newest first, at most `query.effective_limit()`
    async fn query(&self, query: &LogQuery) -> PortalResult<Vec<LogEntry>>;

    /// Number of entries ever appended
    async fn count(&self) -> PortalResult<u64>;
}
