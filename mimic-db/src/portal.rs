//! Portal wiring
//!
//! Builds the stores and services from a [`PortalConfig`] and hands out the
//! shared service handles.

use std::sync::Arc;
use std::time::Duration;

use mimic_core::catalog::Catalog;
use mimic_core::config::PortalConfig;
use mimic_core::error::{PortalError, PortalResult};
use mimic_core::export::{CsvExport, TabularExport};
use mimic_core::identity::{IdentityResolver, StaticDirectory};
use mimic_core::intent::{IntentClassifier, RuleBasedClassifier};
use mimic_core::ledger::{AuditLog, RequestStore, TicketStore};
use mimic_core::logging::operations;
use mimic_core::policy::EligibilityMatrix;
use mimic_core::types::{default_files, FileEntry, Viewer};

use crate::services::{
    AgentService, AuditService, ExportService, FileService, InstallService, RequestService,
    TicketService,
};
use crate::storage::{FileStorage, MemoryStorage};

/// The assembled portal
#[derive(Clone)]
pub struct Portal {
    pub requests: RequestService,
    pub tickets: TicketService,
    pub installs: InstallService,
    pub audit: AuditService,
    pub files: FileService,
    pub exports: ExportService,
    pub agent: AgentService,
    identity: Arc<dyn IdentityResolver>,
    catalog: Arc<Catalog>,
    matrix: Arc<EligibilityMatrix>,
}

impl Portal {
    /// Builder seeded with built-in collaborators
    pub fn builder(config: PortalConfig) -> PortalBuilder {
        PortalBuilder::new(config)
    }

    /// In-memory portal with the default catalog, matrix and directory
    pub fn in_memory() -> PortalResult<Self> {
        Self::builder(PortalConfig::default()).build_in_memory()
    }

    /// Portal backed by `config.data_dir`, or memory when unset
    pub async fn open(config: PortalConfig) -> PortalResult<Self> {
        Self::builder(config).build().await
    }

    /// Check credentials against the directory
    pub fn login(&self, username: &str, password: &str) -> PortalResult<Viewer> {
        let role = self.identity.authenticate(username, password).ok_or_else(|| {
            tracing::warn!(actor_id = %username, operation = operations::LOGIN, "Login failed");
            PortalError::forbidden("invalid username or password")
        })?;
        tracing::info!(actor_id = %username, role = role.as_str(), operation = operations::LOGIN, "Login");
        Ok(Viewer::new(username, role))
    }

    /// Resolve a caller, `Forbidden` when unknown
    pub fn viewer(&self, username: &str) -> PortalResult<Viewer> {
        self.identity.viewer(username)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &EligibilityMatrix {
        &self.matrix
    }
}

/// Portal builder
pub struct PortalBuilder {
    config: PortalConfig,
    policy: Option<(Catalog, EligibilityMatrix)>,
    identity: Arc<dyn IdentityResolver>,
    classifier: Arc<dyn IntentClassifier>,
    exporter: Arc<dyn TabularExport>,
    files: Vec<FileEntry>,
}

impl PortalBuilder {
    pub fn new(config: PortalConfig) -> Self {
        Self {
            config,
            policy: None,
            identity: Arc::new(StaticDirectory::standard()),
            classifier: Arc::new(RuleBasedClassifier::new()),
            exporter: Arc::new(CsvExport),
            files: default_files(),
        }
    }

    /// Use an explicit catalog and matrix instead of `config.policy_path`
    pub fn policy(mut self, catalog: Catalog, matrix: EligibilityMatrix) -> Self {
        self.policy = Some((catalog, matrix));
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = identity;
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn exporter(mut self, exporter: Arc<dyn TabularExport>) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn files(mut self, files: Vec<FileEntry>) -> Self {
        self.files = files;
        self
    }

    /// Build with the store selected by `config.data_dir`
    pub async fn build(self) -> PortalResult<Portal> {
        match self.config.data_dir.clone() {
            Some(dir) => {
                let storage = Arc::new(FileStorage::open(dir).await?);
                self.assemble(storage.clone(), storage.clone(), storage)
            }
            None => self.build_in_memory(),
        }
    }

    /// Build over fresh in-memory stores
    pub fn build_in_memory(self) -> PortalResult<Portal> {
        let storage = Arc::new(MemoryStorage::new());
        self.assemble(storage.clone(), storage.clone(), storage)
    }

    /// Build over caller-supplied stores
    pub fn assemble(
        self,
        request_store: Arc<dyn RequestStore>,
        ticket_store: Arc<dyn TicketStore>,
        audit_log: Arc<dyn AuditLog>,
    ) -> PortalResult<Portal> {
        let (catalog, matrix) = match self.policy {
            Some((catalog, matrix)) => {
                matrix.validate(&catalog)?;
                (catalog, matrix)
            }
            None => self.config.load_policy()?,
        };

        for gap in matrix.hierarchy_gaps() {
            tracing::warn!("Eligibility hierarchy gap: {}", gap);
        }

        let catalog = Arc::new(catalog);
        let matrix = Arc::new(matrix);
        let audit = AuditService::new(audit_log, self.config.default_log_limit);

        let requests = RequestService::new(
            request_store.clone(),
            catalog.clone(),
            matrix.clone(),
            self.identity.clone(),
            audit.clone(),
        );
        let tickets = TicketService::new(
            ticket_store,
            request_store,
            self.identity.clone(),
            audit.clone(),
            Duration::from_millis(self.config.deploy_delay_ms),
        );
        let installs = InstallService::new(requests.clone(), tickets.clone());
        let files = FileService::new(self.files, audit.clone());
        let exports = ExportService::new(
            requests.clone(),
            tickets.clone(),
            audit.clone(),
            files.clone(),
            self.exporter,
        );
        let agent = AgentService::new(self.classifier, requests.clone(), files.clone(), audit.clone());

        tracing::info!(
            applications = catalog.list_applications().len(),
            persistent = self.config.data_dir.is_some(),
            "Portal assembled"
        );

        Ok(Portal {
            requests,
            tickets,
            installs,
            audit,
            files,
            exports,
            agent,
            identity: self.identity,
            catalog,
            matrix,
        })
    }
}
