//! Dashboard error model.

use thiserror::Error;

use crate::id::{ProductName, RequestId};

/// Result type used across the dashboard layers.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Dashboard-level error.
///
/// Every variant is recoverable: the caller reports it to the operator and
/// keeps accepting actions. Guard violations are not errors; workflow actions
/// report those as skipped outcomes instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The request id is not present in the latest request snapshot.
    #[error("request {0} not found")]
    RequestNotFound(RequestId),

    /// The product is not present in the latest stock snapshot.
    #[error("product {0} not found")]
    ProductNotFound(ProductName),

    /// A request lifecycle transition is not allowed from its current status.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A collaborator call failed (transport, status or parse failure).
    #[error("collaborator call failed: {0}")]
    Collaborator(String),
}

impl DashboardError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }
}
