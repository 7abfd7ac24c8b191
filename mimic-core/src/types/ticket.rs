//! Deployment tickets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;

/// Ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Closed => "closed",
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Closed => "Closed",
        }
    }

    /// Accepts both the wire form and the label
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(' ', "_").as_str() {
            "open" => Some(TicketStatus::Open),
            "in_progress" | "inprogress" => Some(TicketStatus::InProgress),
            "closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracked unit of deployment work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub user: String,
    pub role: Role,
    pub action: String,
    pub status: TicketStatus,
    #[serde(default)]
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Create a new open ticket
    pub fn new(
        ticket_id: impl Into<String>,
        user: impl Into<String>,
        role: Role,
        action: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            ticket_id: ticket_id.into(),
            user: user.into(),
            role,
            action: action.into(),
            status: TicketStatus::Open,
            request_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Link the ticket to the request it deploys
    pub fn for_request(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
