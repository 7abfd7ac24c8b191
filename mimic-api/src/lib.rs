//! Mimic API Server
//!
//! REST API for the IT self-service portal. Callers identify themselves with
//! a `username` (query string on reads, JSON body on writes); the role comes
//! from the identity directory and unknown users are rejected.
//!
//! ## Endpoints
//!
//! - GET /health - Service health
//!
//! ### Auth and catalog
//! - POST /api/v1/login - Check credentials
//! - GET /api/v1/catalog - List applications
//! - GET /api/v1/catalog/:app - Get application versions
//!
//! ### Requests
//! - GET /api/v1/requests - List requests
//! - POST /api/v1/requests - Submit request
//! - GET /api/v1/requests/:request_id - Get request
//! - POST /api/v1/requests/:request_id/decision - Approve or reject
//! - POST /api/v1/requests/:request_id/deploy - Deploy approved request
//! - POST /api/v1/install - Direct install of an eligible version
//!
//! ### Tickets
//! - GET /api/v1/tickets - List tickets
//! - POST /api/v1/tickets - Open ticket
//! - GET /api/v1/tickets/:ticket_id - Get ticket
//! - POST /api/v1/tickets/:ticket_id/status - Advance ticket
//!
//! ### Logs, files, export, agent
//! - GET /api/v1/logs - Query audit log
//! - POST /api/v1/logs - Append audit entry
//! - GET /api/v1/files - List accessible files
//! - GET /api/v1/files/:file_id/download - Download file
//! - GET /api/v1/export/:kind - CSV export (logs, tickets, requests, files)
//! - POST /api/v1/agent - Chat / intent handling

pub mod dto;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use dto::*;
pub use error::*;
pub use routes::*;
pub use server::*;
pub use state::*;
