//! Error types for the portal core
//!
//! Every workflow failure is a structured, recoverable value. None of them
//! should bring the process down.

use thiserror::Error;

/// Portal errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// Unknown application, request, ticket or file
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Missing or malformed field, or a version absent from the catalog
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation on a record that is not in the required state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Ticket status change outside the transition table
    #[error("Invalid transition for {entity} {id}: {from} -> {to}")]
    InvalidTransition {
        entity: String,
        id: String,
        from: String,
        to: String,
    },

    /// Approval attempted for a role/version the eligibility matrix does not allow
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// Data or file access denied by role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Store unavailable or failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for portal operations
pub type PortalResult<T> = Result<T, PortalError>;

impl PortalError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::PolicyViolation(_) => "POLICY_VIOLATION",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::Storage(err.to_string())
    }
}
