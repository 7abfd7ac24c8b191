//! JSON file store
//!
//! Layout under the base path:
//! - `requests.json`: snapshot of all requests, rewritten on every change
//! - `tickets.json`: snapshot of all tickets, rewritten on every change
//! - `audit.jsonl`: one log entry per line, only ever appended to
//!
//! Snapshots are written to a temporary file and renamed into place, so a
//! crash mid-write leaves the previous snapshot intact. Audit appends never
//! leave a partial line in front of the next entry. A failed write rolls
//! the in-memory change back and surfaces `Storage`.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::RwLock;

use mimic_core::error::{PortalError, PortalResult};
use mimic_core::ledger::{AuditLog, RequestFilter, RequestStore, TicketFilter, TicketStore};
use mimic_core::types::{
    AppRequest, LogEntry, LogEvent, LogQuery, RequestStatus, Ticket, TicketStatus,
};
use mimic_core::workflow::SwapOutcome;

use super::{next_log_timestamp, query_log, Keyed, OrderedTable};

const REQUESTS_FILE: &str = "requests.json";
const TICKETS_FILE: &str = "tickets.json";
const AUDIT_FILE: &str = "audit.jsonl";

/// File-based storage
pub struct FileStorage {
    base_path: PathBuf,
    requests: RwLock<OrderedTable<AppRequest>>,
    tickets: RwLock<OrderedTable<Ticket>>,
    logs: RwLock<Vec<LogEntry>>,
    sequence: AtomicU64,
}

impl FileStorage {
    /// Open or create a store under `base_path`
    pub async fn open(base_path: impl Into<PathBuf>) -> PortalResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            PortalError::storage(format!("Failed to create directory {:?}: {}", base_path, e))
        })?;

        let requests: Vec<AppRequest> = read_snapshot(&base_path.join(REQUESTS_FILE)).await?;
        let tickets: Vec<Ticket> = read_snapshot(&base_path.join(TICKETS_FILE)).await?;
        let logs = read_log(&base_path.join(AUDIT_FILE)).await?;
        let last_id = logs.last().map(|e| e.entry_id).unwrap_or(0);

        tracing::info!(
            path = %base_path.display(),
            requests = requests.len(),
            tickets = tickets.len(),
            log_entries = logs.len(),
            "Opened file store"
        );

        Ok(Self {
            requests: RwLock::new(OrderedTable::from_rows(requests)),
            tickets: RwLock::new(OrderedTable::from_rows(tickets)),
            logs: RwLock::new(logs),
            sequence: AtomicU64::new(last_id),
            base_path,
        })
    }

    /// Base directory of this store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    async fn save_snapshot<T: Serialize>(&self, file: &str, rows: &[T]) -> PortalResult<()> {
        let path = self.base_path.join(file);
        let tmp = self.base_path.join(format!("{}.tmp", file));
        let json = serde_json::to_vec_pretty(rows)?;

        fs::write(&tmp, json)
            .await
            .map_err(|e| PortalError::storage(format!("Failed to write {:?}: {}", tmp, e)))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| PortalError::storage(format!("Failed to replace {:?}: {}", path, e)))?;
        Ok(())
    }

    async fn insert_row<T>(
        &self,
        table: &RwLock<OrderedTable<T>>,
        file: &str,
        row: T,
    ) -> PortalResult<()>
    where
        T: Keyed + Serialize,
    {
        let mut guard = table.write().await;
        let key = row.key().to_string();
        guard.insert(row)?;
        if let Err(e) = self.save_snapshot(file, guard.rows()).await {
            guard.remove_last(&key);
            return Err(e);
        }
        Ok(())
    }

    async fn persist_swap<T>(
        &self,
        guard: &mut OrderedTable<T>,
        file: &str,
        outcome: SwapOutcome<T>,
        previous: Option<T>,
    ) -> PortalResult<SwapOutcome<T>>
    where
        T: Keyed + Serialize,
    {
        if let (SwapOutcome::Swapped(_), Some(previous)) = (&outcome, previous) {
            if let Err(e) = self.save_snapshot(file, guard.rows()).await {
                guard.replace(previous);
                return Err(e);
            }
        }
        Ok(outcome)
    }
}

async fn read_snapshot<T: DeserializeOwned>(path: &Path) -> PortalResult<Vec<T>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(PortalError::storage(format!("Failed to read {:?}: {}", path, e))),
    }
}

async fn read_log(path: &Path) -> PortalResult<Vec<LogEntry>> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PortalError::storage(format!("Failed to read {:?}: {}", path, e))),
    };

    let mut entries = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) => entries.push(entry),
            // a torn final line from an interrupted append
            Err(e) => tracing::warn!(line = line_no + 1, error = %e, "Skipping unreadable audit line"),
        }
    }
    Ok(entries)
}

/// Append one line to the audit file. A line is only ever written whole: a
/// torn tail left by an earlier failure is terminated first, and a failed
/// write truncates the file back to where it started.
async fn append_line(path: &Path, line: &[u8]) -> PortalResult<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| PortalError::storage(format!("Failed to open {:?}: {}", path, e)))?;
    let start = file.metadata().await?.len();

    let mut buf = Vec::with_capacity(line.len() + 1);
    if start > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(start - 1)).await?;
        file.read_exact(&mut last).await?;
        if last[0] != b'\n' {
            buf.push(b'\n');
        }
    }
    buf.extend_from_slice(line);

    let written: std::io::Result<()> = async {
        file.write_all(&buf).await?;
        file.flush().await
    }
    .await;
    if let Err(e) = written {
        if let Err(undo) = file.set_len(start).await {
            tracing::error!(path = %path.display(), error = %undo, "Failed to truncate partial audit line");
        }
        return Err(PortalError::storage(format!("Failed to append {:?}: {}", path, e)));
    }
    Ok(())
}

#[async_trait]
impl RequestStore for FileStorage {
    async fn insert(&self, request: AppRequest) -> PortalResult<()> {
        self.insert_row(&self.requests, REQUESTS_FILE, request).await
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
        let mut guard = self.requests.write().await;
        let (outcome, previous) = guard.compare_and_swap(
            request_id,
            expected,
            |r| r.status,
            |r| {
                r.status = next;
                r.decided_by = Some(decided_by.to_string());
                r.decided_at = Some(Utc::now());
            },
        )?;
        self.persist_swap(&mut guard, REQUESTS_FILE, outcome, previous)
            .await
    }
}

#[async_trait]
impl TicketStore for FileStorage {
    async fn insert(&self, ticket: Ticket) -> PortalResult<()> {
        self.insert_row(&self.tickets, TICKETS_FILE, ticket).await
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
        let mut guard = self.tickets.write().await;
        let (outcome, previous) = guard.compare_and_swap(
            ticket_id,
            expected,
            |t| t.status,
            |t| {
                t.status = next;
                t.updated_at = Utc::now();
            },
        )?;
        self.persist_swap(&mut guard, TICKETS_FILE, outcome, previous)
            .await
    }
}

#[async_trait]
impl AuditLog for FileStorage {
    async fn append(&self, event: LogEvent) -> PortalResult<LogEntry> {
        let mut logs = self.logs.write().await;
        let entry_id = self.sequence.load(Ordering::SeqCst) + 1;
        let entry = event.into_entry(entry_id, next_log_timestamp(logs.last()));

        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        append_line(&self.base_path.join(AUDIT_FILE), &line).await?;

        self.sequence.store(entry_id, Ordering::SeqCst);
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
