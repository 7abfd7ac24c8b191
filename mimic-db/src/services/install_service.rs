//! Direct install
//!
//! Self-service installs for versions the caller's role is already eligible
//! for. Produces the same records as a request that was approved and
//! deployed: an approved request and a closed ticket.

use mimic_core::error::{PortalError, PortalResult};
use mimic_core::logging::operations;
use mimic_core::types::{Decision, Viewer};

use super::{Deployment, RequestService, TicketService};

/// Name recorded as decider for self-service approvals
pub const SELF_SERVICE_DECIDER: &str = "system";

#[derive(Clone)]
pub struct InstallService {
    requests: RequestService,
    tickets: TicketService,
}

impl InstallService {
    pub fn new(requests: RequestService, tickets: TicketService) -> Self {
        Self { requests, tickets }
    }

    /// Install `app`/`version` for the viewer.
    ///
    /// Unknown application is `NotFound`, unknown version `InvalidInput`,
    /// a version outside the viewer's eligibility `PolicyViolation`.
    pub async fn install_direct(
        &self,
        viewer: &Viewer,
        app: &str,
        version: &str,
    ) -> PortalResult<Deployment> {
        let catalog = self.requests.catalog();
        let application = catalog
            .get(app)
            .ok_or_else(|| PortalError::not_found("Application", app))?;
        if !application.has_version(version) {
            return Err(PortalError::invalid_input(format!(
                "version {} is not offered for {}",
                version, app
            )));
        }
        if !self.requests.matrix().is_eligible(viewer.role, app, version) {
            return Err(PortalError::PolicyViolation(format!(
                "role {} is not eligible for {} {}",
                viewer.role, app, version
            )));
        }

        let request = self
            .requests
            .submit_request(&viewer.username, app, version)
            .await?;
        self.requests
            .apply_decision(&request.request_id, Decision::Approve, SELF_SERVICE_DECIDER)
            .await?;
        let deployment = self
            .tickets
            .deploy(&request.request_id, SELF_SERVICE_DECIDER)
            .await?;

        tracing::info!(
            request_id = %request.request_id,
            actor_id = %viewer.username,
            app = %app,
            version = %version,
            operation = operations::DIRECT_INSTALL,
            "Direct install completed"
        );

        Ok(deployment)
    }
}
