//! Mimic Database Layer
//!
//! Store implementations and workflow services for the portal.
//!
//! # Usage
//!
//! ```ignore
//! use mimic_core::config::PortalConfig;
//! use mimic_db::Portal;
//!
//! async fn example() {
//!     let portal = Portal::open(PortalConfig::from_env()).await.unwrap();
//!     let request = portal.requests.submit_request("alice", "Zoom", "5.0").await.unwrap();
//! }
//! ```

pub mod portal;
pub mod services;
pub mod storage;

pub use portal::{Portal, PortalBuilder};
pub use services::*;
pub use storage::{FileStorage, MemoryStorage};
