//! Request and ticket state machines
//!
//! Statuses only change along the edges listed here. Stores apply a
//! transition as a compare-and-swap, so the table is checked before the
//! swap and the swap rejects stale callers.

use crate::error::{PortalError, PortalResult};
use crate::types::{RequestStatus, TicketStatus};

/// A status with a fixed transition table
pub trait Lifecycle: Copy + Eq + std::fmt::Display + 'static {
    /// Entity name used in errors
    const ENTITY: &'static str;

    /// Legal (from, to) edges
    const TRANSITIONS: &'static [(Self, Self)];

    fn can_transition_to(self, next: Self) -> bool {
        Self::TRANSITIONS
            .iter()
            .any(|&(from, to)| from == self && to == next)
    }

    /// No outgoing edges
    fn is_terminal(self) -> bool {
        !Self::TRANSITIONS.iter().any(|&(from, _)| from == self)
    }

    /// Fail with `InvalidTransition` if the edge is not in the table
    fn check_transition(self, id: &str, next: Self) -> PortalResult<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(PortalError::InvalidTransition {
                entity: Self::ENTITY.to_string(),
                id: id.to_string(),
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl Lifecycle for RequestStatus {
    const ENTITY: &'static str = "Request";
    const TRANSITIONS: &'static [(Self, Self)] = &[
        (RequestStatus::Pending, RequestStatus::Approved),
        (RequestStatus::Pending, RequestStatus::Rejected),
    ];
}

impl Lifecycle for TicketStatus {
    const ENTITY: &'static str = "Ticket";
    const TRANSITIONS: &'static [(Self, Self)] = &[
        (TicketStatus::Open, TicketStatus::InProgress),
        (TicketStatus::InProgress, TicketStatus::Closed),
        (TicketStatus::Open, TicketStatus::Closed),
    ];
}

/// Result of a compare-and-swap on a record's status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome<T> {
    /// Status matched the expectation and was replaced; carries the new record
    Swapped(T),
    /// Status had already moved; carries the current record untouched
    Conflict(T),
}
