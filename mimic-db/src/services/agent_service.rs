//! Agent Service
//!
//! Chat front door. Classifier output is treated as untrusted input: an
//! install hint becomes an ordinary request submission and is validated
//! against the catalog like any other.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mimic_core::error::{PortalError, PortalResult};
use mimic_core::intent::{IntentClassifier, IntentKind};
use mimic_core::logging::operations;
use mimic_core::types::{AppRequest, FileEntry, LogEvent, LogType, Viewer};

use super::{AuditService, FileService, RequestService};

/// Agent response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    pub kind: IntentKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<AppRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileEntry>,
}

#[derive(Clone)]
pub struct AgentService {
    classifier: Arc<dyn IntentClassifier>,
    requests: RequestService,
    files: FileService,
    audit: AuditService,
}

impl AgentService {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        requests: RequestService,
        files: FileService,
        audit: AuditService,
    ) -> Self {
        Self {
            classifier,
            requests,
            files,
            audit,
        }
    }

    /// Handle one chat message
    pub async fn handle(&self, viewer: &Viewer, text: &str) -> PortalResult<AgentReply> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PortalError::invalid_input("message is empty"));
        }

        let hint = match self.classifier.classify(text).await {
            Ok(hint) => hint,
            Err(e) => {
                tracing::warn!(
                    actor_id = %viewer.username,
                    error = %e,
                    operation = operations::AGENT_FALLBACK,
                    "Intent classifier failed; echoing"
                );
                return Ok(self.echo(viewer, text).await);
            }
        };

        tracing::debug!(
            actor_id = %viewer.username,
            kind = ?hint.kind,
            operation = operations::AGENT_CLASSIFY,
            "Classified message"
        );

        match hint.kind {
            IntentKind::Install => {
                let raw_app = hint.app.unwrap_or_default();
                let catalog = self.requests.catalog();
                let app = catalog.resolve_name(&raw_app).ok_or_else(|| {
                    PortalError::invalid_input(format!("unknown application: {}", raw_app))
                })?;
                let version = match hint.version {
                    Some(version) => version,
                    None => catalog.latest_version(&app.name)?.to_string(),
                };

                let request = self
                    .requests
                    .submit_request(&viewer.username, &app.name, &version)
                    .await?;

                Ok(AgentReply {
                    kind: IntentKind::Install,
                    message: format!(
                        "Request {} submitted for {} {}; awaiting approval",
                        request.request_id, request.app, request.version
                    ),
                    request: Some(request),
                    file: None,
                })
            }
            IntentKind::File => {
                let name = hint.file.unwrap_or_default();
                let file = self.files.find_by_name(viewer, &name)?;
                self.files.download(viewer, file.file_id).await?;

                Ok(AgentReply {
                    kind: IntentKind::File,
                    message: format!("{} is ready for download", file.filename),
                    request: None,
                    file: Some(file),
                })
            }
            IntentKind::Chat => Ok(self.echo(viewer, text).await),
        }
    }

    async fn echo(&self, viewer: &Viewer, text: &str) -> AgentReply {
        let message = format!("You said: {}", text);
        self.audit
            .record(LogEvent::new(&viewer.username, LogType::Chat, text).with_status("Answered"))
            .await;
        AgentReply {
            kind: IntentKind::Chat,
            message,
            request: None,
            file: None,
        }
    }
}
