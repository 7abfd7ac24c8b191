//! Ticket Service
//!
//! Deployment tickets and the "approve and deploy" flow. Status changes go
//! through the ticket transition table and a compare-and-swap in the store.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use mimic_core::error::{PortalError, PortalResult};
use mimic_core::identity::IdentityResolver;
use mimic_core::ledger::{RequestStore, TicketFilter, TicketStore};
use mimic_core::logging::operations;
use mimic_core::policy::{self, Capability};
use mimic_core::types::{
    AppRequest, LogEvent, LogType, RequestStatus, Role, Ticket, TicketStatus, Viewer,
};
use mimic_core::workflow::{Lifecycle, SwapOutcome};

use super::AuditService;

/// Result of deploying an approved request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub request: AppRequest,
    pub ticket: Ticket,
}

/// Ticket lifecycle manager
#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn TicketStore>,
    requests: Arc<dyn RequestStore>,
    identity: Arc<dyn IdentityResolver>,
    audit: AuditService,
    deploy_delay: Duration,
}

impl TicketService {
    pub fn new(
        store: Arc<dyn TicketStore>,
        requests: Arc<dyn RequestStore>,
        identity: Arc<dyn IdentityResolver>,
        audit: AuditService,
        deploy_delay: Duration,
    ) -> Self {
        Self {
            store,
            requests,
            identity,
            audit,
            deploy_delay,
        }
    }

    /// Generate a ticket id
    fn generate_ticket_id() -> String {
        format!("ticket:{}", uuid::Uuid::new_v4())
    }

    /// Open a new ticket
    pub async fn create_ticket(&self, user: &str, role: Role, action: &str) -> PortalResult<Ticket> {
        if user.trim().is_empty() {
            return Err(PortalError::invalid_input("user is empty"));
        }
        if action.trim().is_empty() {
            return Err(PortalError::invalid_input("action is empty"));
        }
        self.open_ticket(Ticket::new(Self::generate_ticket_id(), user, role, action))
            .await
    }

    async fn open_ticket(&self, ticket: Ticket) -> PortalResult<Ticket> {
        self.store.insert(ticket.clone()).await?;

        tracing::info!(
            ticket_id = %ticket.ticket_id,
            actor_id = %ticket.user,
            operation = operations::TICKET_CREATE,
            "Ticket created"
        );

        self.audit
            .record(
                LogEvent::system(
                    &ticket.user,
                    format!("Ticket {} created for {}", ticket.ticket_id, ticket.action),
                )
                .with_status(ticket.status.label()),
            )
            .await;

        Ok(ticket)
    }

    /// Move a ticket along the transition table. The actor must hold
    /// [`Capability::ManageTickets`].
    pub async fn advance_ticket(
        &self,
        ticket_id: &str,
        new_status: TicketStatus,
        actor: &Viewer,
    ) -> PortalResult<Ticket> {
        policy::require(actor.role, Capability::ManageTickets)?;
        self.transition(ticket_id, new_status, &actor.username).await
    }

    async fn transition(
        &self,
        ticket_id: &str,
        new_status: TicketStatus,
        actor: &str,
    ) -> PortalResult<Ticket> {
        let ticket = self
            .store
            .get(ticket_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Ticket", ticket_id))?;

        ticket.status.check_transition(ticket_id, new_status)?;

        let updated = match self
            .store
            .swap_status(ticket_id, ticket.status, new_status)
            .await?
        {
            SwapOutcome::Swapped(ticket) => ticket,
            SwapOutcome::Conflict(current) => {
                // lost a race; report against the status we actually found
                current.status.check_transition(ticket_id, new_status)?;
                return Err(PortalError::invalid_state(format!(
                    "ticket {} changed concurrently to {}",
                    ticket_id, current.status
                )));
            }
        };

        tracing::info!(
            ticket_id = %ticket_id,
            actor_id = %actor,
            status = updated.status.as_str(),
            operation = operations::TICKET_ADVANCE,
            "Ticket advanced"
        );

        self.audit
            .record(
                LogEvent::system(
                    actor,
                    format!("Ticket {} updated to {}", ticket_id, updated.status.label()),
                )
                .with_status(updated.status.label()),
            )
            .await;

        Ok(updated)
    }

    /// Deploy an approved request: open a linked ticket, walk it to Closed
    /// and record the install. The operator must hold
    /// [`Capability::ManageTickets`].
    pub async fn deploy_request(&self, request_id: &str, operator: &Viewer) -> PortalResult<Deployment> {
        policy::require(operator.role, Capability::ManageTickets)?;
        self.deploy(request_id, &operator.username).await
    }

    pub(crate) async fn deploy(&self, request_id: &str, operator: &str) -> PortalResult<Deployment> {
        let request = self
            .requests
            .get(request_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Request", request_id))?;

        if request.status != RequestStatus::Approved {
            return Err(PortalError::invalid_state(format!(
                "request {} is {}, not approved",
                request_id, request.status
            )));
        }

        let role = self
            .identity
            .resolve_role(&request.user)
            .unwrap_or(Role::User);
        let action = format!("install {} {}", request.app, request.version);
        let ticket = Ticket::new(Self::generate_ticket_id(), &request.user, role, action)
            .for_request(request_id);
        // the store admits one ticket per request; a second deploy fails here
        let ticket = self.open_ticket(ticket).await?;

        self.transition(&ticket.ticket_id, TicketStatus::InProgress, operator)
            .await?;
        if !self.deploy_delay.is_zero() {
            tokio::time::sleep(self.deploy_delay).await;
        }
        let ticket = self
            .transition(&ticket.ticket_id, TicketStatus::Closed, operator)
            .await?;

        tracing::info!(
            request_id = %request_id,
            ticket_id = %ticket.ticket_id,
            actor_id = %operator,
            operation = operations::REQUEST_DEPLOY,
            "Request deployed"
        );

        self.audit
            .record(
                LogEvent::new(
                    &request.user,
                    LogType::Install,
                    format!("Installed {} {}", request.app, request.version),
                )
                .with_app(&request.app, &request.version)
                .with_status("Installed"),
            )
            .await;

        Ok(Deployment { request, ticket })
    }

    /// Get a ticket by id
    pub async fn get_ticket(&self, ticket_id: &str) -> PortalResult<Ticket> {
        self.store
            .get(ticket_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Ticket", ticket_id))
    }

    /// Get a ticket the viewer is allowed to see
    pub async fn get_ticket_for(&self, viewer: &Viewer, ticket_id: &str) -> PortalResult<Ticket> {
        let ticket = self.get_ticket(ticket_id).await?;
        if ticket.user != viewer.username && !policy::sees_all_records(viewer.role) {
            return Err(PortalError::not_found("Ticket", ticket_id));
        }
        Ok(ticket)
    }

    /// Tickets visible to the viewer in creation order
    pub async fn list_tickets(
        &self,
        viewer: &Viewer,
        status: Option<TicketStatus>,
    ) -> PortalResult<Vec<Ticket>> {
        let user = if policy::sees_all_records(viewer.role) {
            None
        } else {
            Some(viewer.username.clone())
        };
        self.store.list(&TicketFilter::new(user, status)).await
    }
}
