//! Store implementations
//!
//! - [`MemoryStorage`]: process-local, used for tests and ephemeral runs
//! - [`FileStorage`]: JSON snapshots plus an append-only JSON-lines audit log
//!
//! Both implement every store trait from `mimic_core::ledger`.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mimic_core::error::{PortalError, PortalResult};
use mimic_core::types::{AppRequest, LogEntry, LogQuery, Ticket};
use mimic_core::workflow::SwapOutcome;

/// A record stored under a string id
pub(crate) trait Keyed: Clone {
    const ENTITY: &'static str;
    fn key(&self) -> &str;

    /// Secondary key that at most one row may carry
    fn link(&self) -> Option<&str> {
        None
    }
}

impl Keyed for AppRequest {
    const ENTITY: &'static str = "Request";
    fn key(&self) -> &str {
        &self.request_id
    }
}

impl Keyed for Ticket {
    const ENTITY: &'static str = "Ticket";
    fn key(&self) -> &str {
        &self.ticket_id
    }

    fn link(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

/// Insertion-ordered rows with an id index and a unique link index
#[derive(Debug, Clone)]
pub(crate) struct OrderedTable<T> {
    rows: Vec<T>,
    index: HashMap<String, usize>,
    links: HashMap<String, String>,
}

impl<T> Default for OrderedTable<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
            links: HashMap::new(),
        }
    }
}

impl<T: Keyed> OrderedTable<T> {
    /// Rebuild from persisted rows. Later duplicates are dropped.
    pub(crate) fn from_rows(rows: Vec<T>) -> Self {
        let mut table = Self::default();
        for row in rows {
            if table.insert(row).is_err() {
                tracing::warn!(entity = T::ENTITY, "Dropping duplicate row on load");
            }
        }
        table
    }

    /// Insert a new row. A duplicate id is `InvalidInput`; a link already
    /// held by another row is `InvalidState`.
    pub(crate) fn insert(&mut self, row: T) -> PortalResult<()> {
        if self.index.contains_key(row.key()) {
            return Err(PortalError::invalid_input(format!(
                "{} already exists: {}",
                T::ENTITY,
                row.key()
            )));
        }
        if let Some(link) = row.link() {
            if let Some(holder) = self.links.get(link) {
                return Err(PortalError::invalid_state(format!(
                    "{} already has {} {}",
                    link,
                    T::ENTITY.to_lowercase(),
                    holder
                )));
            }
            self.links.insert(link.to_string(), row.key().to_string());
        }
        self.index.insert(row.key().to_string(), self.rows.len());
        self.rows.push(row);
        Ok(())
    }

    /// Undo the most recent insert of `key`
    pub(crate) fn remove_last(&mut self, key: &str) {
        if self.rows.last().map(Keyed::key) == Some(key) {
            if let Some(row) = self.rows.pop() {
                if let Some(link) = row.link() {
                    self.links.remove(link);
                }
            }
            self.index.remove(key);
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.rows[i])
    }

    pub(crate) fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Overwrite a row in place, keeping its position
    pub(crate) fn replace(&mut self, row: T) {
        if let Some(&i) = self.index.get(row.key()) {
            self.rows[i] = row;
        }
    }

    /// Apply `update` if `status_of` still equals `expected`.
    ///
    /// On success returns the updated row together with the previous one so
    /// callers that persist can roll back.
    pub(crate) fn compare_and_swap<S, F, U>(
        &mut self,
        key: &str,
        expected: S,
        status_of: F,
        update: U,
    ) -> PortalResult<(SwapOutcome<T>, Option<T>)>
    where
        S: PartialEq,
        F: Fn(&T) -> S,
        U: FnOnce(&mut T),
    {
        let i = *self
            .index
            .get(key)
            .ok_or_else(|| PortalError::not_found(T::ENTITY, key))?;
        let row = &mut self.rows[i];

        if status_of(row) != expected {
            return Ok((SwapOutcome::Conflict(row.clone()), None));
        }

        let previous = row.clone();
        update(row);
        Ok((SwapOutcome::Swapped(row.clone()), Some(previous)))
    }
}

/// Timestamp for the next log entry: now, but never before the last entry
pub(crate) fn next_log_timestamp(last: Option<&LogEntry>) -> DateTime<Utc> {
    let now = Utc::now();
    match last {
        Some(entry) if entry.timestamp > now => entry.timestamp,
        _ => now,
    }
}

/// Newest-first filtered view over an insertion-ordered log
pub(crate) fn query_log(entries: &[LogEntry], query: &LogQuery) -> Vec<LogEntry> {
    entries
        .iter()
        .rev()
        .filter(|e| query.matches(e))
        .take(query.effective_limit())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::types::{RequestStatus, Role};

    #[test]
    fn test_table_insert_and_duplicate() {
        let mut table = OrderedTable::default();
        table
            .insert(AppRequest::new("request:1", "alice", "Zoom", "5.0"))
            .unwrap();
        let err = table
            .insert(AppRequest::new("request:1", "bob", "Zoom", "5.1"))
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidInput(_)));
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.get("request:1").unwrap().user, "alice");
    }

    #[test]
    fn test_compare_and_swap() {
        let mut table = OrderedTable::default();
        table
            .insert(AppRequest::new("request:1", "alice", "Zoom", "5.0"))
            .unwrap();

        let (outcome, previous) = table
            .compare_and_swap(
                "request:1",
                RequestStatus::Pending,
                |r| r.status,
                |r| r.status = RequestStatus::Approved,
            )
            .unwrap();
        assert!(matches!(outcome, SwapOutcome::Swapped(ref r) if r.status == RequestStatus::Approved));
        assert_eq!(previous.unwrap().status, RequestStatus::Pending);

        let (outcome, previous) = table
            .compare_and_swap(
                "request:1",
                RequestStatus::Pending,
                |r| r.status,
                |r| r.status = RequestStatus::Rejected,
            )
            .unwrap();
        assert!(matches!(outcome, SwapOutcome::Conflict(ref r) if r.status == RequestStatus::Approved));
        assert!(previous.is_none());

        let missing = table.compare_and_swap("request:9", RequestStatus::Pending, |r| r.status, |_| {});
        assert!(matches!(missing, Err(PortalError::NotFound { .. })));
    }

    #[test]
    fn test_ticket_link_is_unique() {
        let mut table = OrderedTable::default();
        table
            .insert(Ticket::new("ticket:1", "alice", Role::User, "install Zoom 5.0").for_request("request:1"))
            .unwrap();
        table
            .insert(Ticket::new("ticket:2", "alice", Role::User, "reset password"))
            .unwrap();

        let err = table
            .insert(Ticket::new("ticket:3", "alice", Role::User, "install Zoom 5.0").for_request("request:1"))
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidState(_)));
        assert_eq!(table.rows().len(), 2);

        table.remove_last("ticket:2");
        table
            .insert(Ticket::new("ticket:4", "bob", Role::Manager, "install Slack latest").for_request("request:2"))
            .unwrap();
        assert_eq!(table.rows().len(), 2);
    }

    #[test]
    fn test_remove_last_releases_link() {
        let mut table = OrderedTable::default();
        table
            .insert(Ticket::new("ticket:1", "alice", Role::User, "install Zoom 5.0").for_request("request:1"))
            .unwrap();
        table.remove_last("ticket:1");
        table
            .insert(Ticket::new("ticket:2", "alice", Role::User, "install Zoom 5.0").for_request("request:1"))
            .unwrap();
        assert!(table.get("ticket:2").is_some());
    }

    #[test]
    fn test_remove_last() {
        let mut table = OrderedTable::default();
        table
            .insert(AppRequest::new("request:1", "alice", "Zoom", "5.0"))
            .unwrap();
        table.remove_last("request:1");
        assert!(table.get("request:1").is_none());
        assert!(table.rows().is_empty());
    }
}
