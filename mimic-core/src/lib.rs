//! Mimic Core - IT self-service portal workflow
//!
//! This crate provides the types and interfaces the rest of the portal is
//! built on:
//! - Application catalog and the role eligibility matrix
//! - Request and ticket state machines
//! - Store contracts for requests, tickets and the audit log
//! - Collaborator contracts for identity, intent detection and export
//!
//! Store implementations and services live in `mimic-db`.

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod identity;
pub mod intent;
pub mod ledger;
pub mod logging;
pub mod policy;
pub mod types;
pub mod workflow;

pub use catalog::Catalog;
pub use config::{PolicyDocument, PortalConfig};
pub use error::*;
pub use policy::EligibilityMatrix;
pub use types::*;
pub use workflow::{Lifecycle, SwapOutcome};
