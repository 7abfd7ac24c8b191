//! Request Service
//!
//! Submission and approval of application requests. Eligibility is only
//! evaluated when a request is approved, never at submission.

use std::sync::Arc;

use mimic_core::catalog::Catalog;
use mimic_core::error::{PortalError, PortalResult};
use mimic_core::identity::IdentityResolver;
use mimic_core::ledger::{RequestFilter, RequestStore};
use mimic_core::logging::operations;
use mimic_core::policy::{self, Capability, EligibilityMatrix};
use mimic_core::types::{AppRequest, Decision, LogEvent, RequestStatus, Role, Viewer};
use mimic_core::workflow::{Lifecycle, SwapOutcome};

use super::AuditService;

/// Request lifecycle manager
#[derive(Clone)]
pub struct RequestService {
    store: Arc<dyn RequestStore>,
    catalog: Arc<Catalog>,
    matrix: Arc<EligibilityMatrix>,
    identity: Arc<dyn IdentityResolver>,
    audit: AuditService,
}

impl RequestService {
    pub fn new(
        store: Arc<dyn RequestStore>,
        catalog: Arc<Catalog>,
        matrix: Arc<EligibilityMatrix>,
        identity: Arc<dyn IdentityResolver>,
        audit: AuditService,
    ) -> Self {
        Self {
            store,
            catalog,
            matrix,
            identity,
            audit,
        }
    }

    /// Generate a request id
    fn generate_request_id() -> String {
        format!("request:{}", uuid::Uuid::new_v4())
    }

    /// Submit a new pending request
    pub async fn submit_request(
        &self,
        user: &str,
        app: &str,
        version: &str,
    ) -> PortalResult<AppRequest> {
        if user.trim().is_empty() {
            return Err(PortalError::invalid_input("user is empty"));
        }
        self.catalog.validate_selection(app, version)?;

        let request = AppRequest::new(Self::generate_request_id(), user, app, version);
        self.store.insert(request.clone()).await?;

        tracing::info!(
            request_id = %request.request_id,
            actor_id = %user,
            app = %app,
            version = %version,
            operation = operations::REQUEST_SUBMIT,
            "Request submitted"
        );

        self.audit
            .record(
                LogEvent::system(
                    user,
                    format!(
                        "Request {} submitted for {} {}",
                        request.request_id, app, version
                    ),
                )
                .with_app(app, version)
                .with_status(request.status.label()),
            )
            .await;

        Ok(request)
    }

    /// Role of the requester, if the directory knows them
    pub fn requester_role(&self, username: &str) -> Option<Role> {
        self.identity.resolve_role(username)
    }

    /// Approve or reject a pending request. The decider must hold
    /// [`Capability::DecideRequests`].
    pub async fn decide_request(
        &self,
        request_id: &str,
        decision: Decision,
        decider: &Viewer,
    ) -> PortalResult<AppRequest> {
        policy::require(decider.role, Capability::DecideRequests)?;
        self.apply_decision(request_id, decision, &decider.username)
            .await
    }

    /// Decision without the decider capability check; eligibility still applies
    pub(crate) async fn apply_decision(
        &self,
        request_id: &str,
        decision: Decision,
        decider: &str,
    ) -> PortalResult<AppRequest> {
        let request = self
            .store
            .get(request_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Request", request_id))?;

        if !request.is_pending() {
            return Err(PortalError::invalid_state(format!(
                "request {} is already {}",
                request_id, request.status
            )));
        }

        if decision == Decision::Approve {
            let eligible = self
                .requester_role(&request.user)
                .map(|role| self.matrix.is_eligible(role, &request.app, &request.version))
                .unwrap_or(false);
            if !eligible {
                tracing::warn!(
                    request_id = %request_id,
                    actor_id = %decider,
                    app = %request.app,
                    version = %request.version,
                    operation = operations::REQUEST_DECIDE,
                    "Approval blocked by eligibility policy"
                );
                return Err(PortalError::PolicyViolation(format!(
                    "{} is not eligible for {} {}",
                    request.user, request.app, request.version
                )));
            }
        }

        let next = decision.target_status();
        RequestStatus::Pending.check_transition(request_id, next)?;

        let decided = match self
            .store
            .swap_status(request_id, RequestStatus::Pending, next, decider)
            .await?
        {
            SwapOutcome::Swapped(request) => request,
            SwapOutcome::Conflict(current) => {
                return Err(PortalError::invalid_state(format!(
                    "request {} was already decided: {}",
                    request_id, current.status
                )));
            }
        };

        tracing::info!(
            request_id = %request_id,
            actor_id = %decider,
            status = decided.status.as_str(),
            operation = operations::REQUEST_DECIDE,
            "Request decided"
        );

        self.audit
            .record(
                LogEvent::system(
                    decider,
                    format!(
                        "Request {} {} by {}",
                        request_id,
                        decided.status.as_str(),
                        decider
                    ),
                )
                .with_app(&decided.app, &decided.version)
                .with_status(decided.status.label()),
            )
            .await;

        Ok(decided)
    }

    /// Get a request by id
    pub async fn get_request(&self, request_id: &str) -> PortalResult<AppRequest> {
        self.store
            .get(request_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Request", request_id))
    }

    /// Get a request the viewer is allowed to see. Another user's request
    /// reads as not found.
    pub async fn get_request_for(&self, viewer: &Viewer, request_id: &str) -> PortalResult<AppRequest> {
        let request = self.get_request(request_id).await?;
        if request.user != viewer.username && !policy::sees_all_records(viewer.role) {
            return Err(PortalError::not_found("Request", request_id));
        }
        Ok(request)
    }

    /// Requests visible to the viewer in submission order
    pub async fn list_requests(
        &self,
        viewer: &Viewer,
        status: Option<RequestStatus>,
    ) -> PortalResult<Vec<AppRequest>> {
        let user = if policy::sees_all_records(viewer.role) {
            None
        } else {
            Some(viewer.username.clone())
        };
        self.store.list(&RequestFilter::new(user, status)).await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &EligibilityMatrix {
        &self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::services::audit_service::testing::BrokenLog;
    use mimic_core::identity::StaticDirectory;
    use mimic_core::types::{LogQuery, LogType};

    struct Fixture {
        service: RequestService,
        audit: AuditService,
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let audit = AuditService::new(storage.clone(), 200);
        let catalog = Catalog::standard();
        let matrix = EligibilityMatrix::standard(&catalog);
        let service = RequestService::new(
            storage,
            Arc::new(catalog),
            Arc::new(matrix),
            Arc::new(StaticDirectory::standard()),
            audit.clone(),
        );
        Fixture { service, audit }
    }

    fn manager() -> Viewer {
        Viewer::new("bob", Role::Manager)
    }

    fn admin() -> Viewer {
        Viewer::new("admin", Role::Admin)
    }

    #[tokio::test]
    async fn test_decisions_survive_broken_audit_log() {
        let storage = Arc::new(MemoryStorage::new());
        let catalog = Catalog::standard();
        let matrix = EligibilityMatrix::standard(&catalog);
        let service = RequestService::new(
            storage.clone(),
            Arc::new(catalog),
            Arc::new(matrix),
            Arc::new(StaticDirectory::standard()),
            AuditService::new(Arc::new(BrokenLog), 200),
        );

        let request = service
            .submit_request("alice", "Zoom", "5.0")
            .await
            .unwrap();
        let decided = service
            .decide_request(&request.request_id, Decision::Approve, &manager())
            .await
            .unwrap();
        assert_eq!(decided.status, RequestStatus::Approved);

        let stored = RequestStore::get(storage.as_ref(), &request.request_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RequestStatus::Approved);
        assert_eq!(stored.decided_by.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_submit_validates_catalog() {
        let f = fixture();
        let err = f
            .service
            .submit_request("alice", "Zoom", "9.9")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidInput(_)));

        let err = f
            .service
            .submit_request("alice", "Teams", "1.0")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidInput(_)));

        let err = f.service.submit_request(" ", "Zoom", "5.0").await.unwrap_err();
        assert!(matches!(err, PortalError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_submit_does_not_check_eligibility() {
        let f = fixture();
        let request = f
            .service
            .submit_request("alice", "MS Word", "2021")
            .await
            .unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_submit_list_get_roundtrip() {
        let f = fixture();
        let submitted = f
            .service
            .submit_request("alice", "Zoom", "5.0")
            .await
            .unwrap();

        let alice = Viewer::new("alice", Role::User);
        let listed = f.service.list_requests(&alice, None).await.unwrap();
        assert_eq!(listed, vec![submitted.clone()]);

        let fetched = f
            .service
            .get_request_for(&alice, &submitted.request_id)
            .await
            .unwrap();
        assert_eq!(fetched, submitted);
    }

    #[tokio::test]
    async fn test_ineligible_approval_stays_pending() {
        let f = fixture();
        let request = f
            .service
            .submit_request("alice", "Zoom", "5.1")
            .await
            .unwrap();

        let err = f
            .service
            .decide_request(&request.request_id, Decision::Approve, &manager())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::PolicyViolation(_)));

        let current = f.service.get_request(&request.request_id).await.unwrap();
        assert_eq!(current.status, RequestStatus::Pending);
        assert!(current.decided_by.is_none());
    }

    #[tokio::test]
    async fn test_eligible_approval_logs_once() {
        let f = fixture();
        let request = f
            .service
            .submit_request("alice", "Zoom", "5.0")
            .await
            .unwrap();
        let before = f.audit.count().await.unwrap();

        let decided = f
            .service
            .decide_request(&request.request_id, Decision::Approve, &admin())
            .await
            .unwrap();
        assert_eq!(decided.status, RequestStatus::Approved);
        assert_eq!(decided.decided_by.as_deref(), Some("admin"));
        assert!(decided.decided_at.is_some());

        assert_eq!(f.audit.count().await.unwrap(), before + 1);
        let entries = f
            .audit
            .query(&admin(), LogQuery::default().with_limit(1))
            .await
            .unwrap();
        assert_eq!(entries[0].log_type, LogType::System);
        assert_eq!(entries[0].user, "admin");
        assert!(entries[0].action.contains(&request.request_id));
    }

    #[tokio::test]
    async fn test_double_decide_changes_once() {
        let f = fixture();
        let request = f
            .service
            .submit_request("alice", "Zoom", "5.0")
            .await
            .unwrap();

        f.service
            .decide_request(&request.request_id, Decision::Reject, &manager())
            .await
            .unwrap();
        let err = f
            .service
            .decide_request(&request.request_id, Decision::Approve, &admin())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidState(_)));

        let current = f.service.get_request(&request.request_id).await.unwrap();
        assert_eq!(current.status, RequestStatus::Rejected);
        assert_eq!(current.decided_by.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_concurrent_decisions_change_once() {
        let f = fixture();
        let request = f
            .service
            .submit_request("alice", "Zoom", "5.0")
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..6 {
            let service = f.service.clone();
            let id = request.request_id.clone();
            let decision = if i % 2 == 0 { Decision::Approve } else { Decision::Reject };
            handles.push(tokio::spawn(async move {
                service.decide_request(&id, decision, &admin()).await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert!(matches!(e, PortalError::InvalidState(_))),
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn test_unknown_requester_never_eligible() {
        let f = fixture();
        let request = f
            .service
            .submit_request("mallory", "Zoom", "5.0")
            .await
            .unwrap();
        assert!(f.service.requester_role("mallory").is_none());

        let err = f
            .service
            .decide_request(&request.request_id, Decision::Approve, &admin())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::PolicyViolation(_)));

        let rejected = f
            .service
            .decide_request(&request.request_id, Decision::Reject, &admin())
            .await
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
    }

    #[tokio::test]
    async fn test_users_cannot_decide_or_see_others() {
        let f = fixture();
        let request = f
            .service
            .submit_request("bob", "MS Excel", "2019")
            .await
            .unwrap();
        let alice = Viewer::new("alice", Role::User);

        let err = f
            .service
            .decide_request(&request.request_id, Decision::Approve, &alice)
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Forbidden(_)));

        assert!(f.service.list_requests(&alice, None).await.unwrap().is_empty());
        let err = f
            .service
            .get_request_for(&alice, &request.request_id)
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_decide_unknown_request() {
        let f = fixture();
        let err = f
            .service
            .decide_request("request:missing", Decision::Approve, &admin())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let f = fixture();
        let a = f.service.submit_request("alice", "Zoom", "5.0").await.unwrap();
        f.service.submit_request("alice", "Zoom", "latest").await.unwrap();
        f.service
            .decide_request(&a.request_id, Decision::Approve, &admin())
            .await
            .unwrap();

        let pending = f
            .service
            .list_requests(&admin(), Some(RequestStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].version, "latest");
    }
}
