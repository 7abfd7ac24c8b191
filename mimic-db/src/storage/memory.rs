//! In-memory store

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use mimic_core::error::PortalResult;
use mimic_core::ledger::{AuditLog, RequestFilter, RequestStore, TicketFilter, TicketStore};
use mimic_core::types::{
    AppRequest, LogEntry, LogEvent, LogQuery, RequestStatus, Ticket, TicketStatus,
};
use mimic_core::workflow::SwapOutcome;

use super::{next_log_timestamp, query_log, OrderedTable};

/// In-memory storage
///
/// Thread-safe, every collection guarded by its own RwLock.
#[derive(Debug)]
pub struct MemoryStorage {
    requests: Arc<RwLock<OrderedTable<AppRequest>>>,
    tickets: Arc<RwLock<OrderedTable<Ticket>>>,
    logs: Arc<RwLock<Vec<LogEntry>>>,
    sequence: AtomicU64,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(OrderedTable::default())),
            tickets: Arc::new(RwLock::new(OrderedTable::default())),
            logs: Arc::new(RwLock::new(Vec::new())),
            sequence: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl RequestStore for MemoryStorage {
    async fn insert(&self, request: AppRequest) -> PortalResult<()> {
        self.requests.write().await.insert(request)
    }

    async fn get(&self, request_id: &str) -> PortalResult<Option<AppRequest>> {
        Ok(self.requests.read().await.get(request_id).cloned())
    }

    async fn list(&self, filter: &RequestFilter) -> PortalResult<Vec<AppRequest>> {
        Ok(self
            .requests
            .read()
            .await
            .rows()
            .iter()
            .filter(|r| filter.matches(&r.user, &r.status))
            .cloned()
            .collect())
    }

    async fn swap_status(
        &self,
        request_id: &str,
        expected: RequestStatus,
        next: RequestStatus,
        decided_by: &str,
    ) -> PortalResult<SwapOutcome<AppRequest>> {
        let mut requests = self.requests.write().await;
        let (outcome, _) = requests.compare_and_swap(
            request_id,
            expected,
            |r| r.status,
            |r| {
                r.status = next;
                r.decided_by = Some(decided_by.to_string());
                r.decided_at = Some(Utc::now());
            },
        )?;
        Ok(outcome)
    }
}

#[async_trait]
impl TicketStore for MemoryStorage {
    async fn insert(&self, ticket: Ticket) -> PortalResult<()> {
        self.tickets.write().await.insert(ticket)
    }

    async fn get(&self, ticket_id: &str) -> PortalResult<Option<Ticket>> {
        Ok(self.tickets.read().await.get(ticket_id).cloned())
    }

    async fn list(&self, filter: &TicketFilter) -> PortalResult<Vec<Ticket>> {
        Ok(self
            .tickets
            .read()
            .await
            .rows()
            .iter()
            .filter(|t| filter.matches(&t.user, &t.status))
            .cloned()
            .collect())
    }

    async fn swap_status(
        &self,
        ticket_id: &str,
        expected: TicketStatus,
        next: TicketStatus,
    ) -> PortalResult<SwapOutcome<Ticket>> {
        let mut tickets = self.tickets.write().await;
        let (outcome, _) = tickets.compare_and_swap(
            ticket_id,
            expected,
            |t| t.status,
            |t| {
                t.status = next;
                t.updated_at = Utc::now();
            },
        )?;
        Ok(outcome)
    }
}

#[async_trait]
impl AuditLog for MemoryStorage {
    async fn append(&self, event: LogEvent) -> PortalResult<LogEntry> {
        let mut logs = self.logs.write().await;
        let entry_id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = event.into_entry(entry_id, next_log_timestamp(logs.last()));
        logs.push(entry.clone());
        Ok(entry)
    }

    async fn query(&self, query: &LogQuery) -> PortalResult<Vec<LogEntry>> {
        Ok(query_log(&self.logs.read().await, query))
    }

    async fn count(&self) -> PortalResult<u64> {
        Ok(self.sequence.load(Ordering::SeqCst))
    }
}
