//! Portal service implementations
//!
//! Each service works against the store traits from `mimic_core::ledger`
//! and records its state changes through [`AuditService`].

pub mod agent_service;
pub mod audit_service;
pub mod export_service;
pub mod file_service;
pub mod install_service;
pub mod request_service;
pub mod ticket_service;

pub use agent_service::{AgentReply, AgentService};
pub use audit_service::AuditService;
pub use export_service::{ExportKind, ExportService, ExportedFile};
pub use file_service::FileService;
pub use install_service::{InstallService, SELF_SERVICE_DECIDER};
pub use request_service::RequestService;
pub use ticket_service::{Deployment, TicketService};
