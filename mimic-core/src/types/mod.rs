//! Core type definitions for the portal
//!
//! All types follow these naming conventions:
//! - snake_case for field names
//! - *_id suffix for primary keys
//! - `user` fields are plain usernames used only for filtering

mod application;
mod audit;
mod file;
mod request;
mod role;
mod ticket;

pub use application::*;
pub use audit::*;
pub use file::*;
pub use request::*;
pub use role::*;
pub use ticket::*;
