//! Replenishment requests and their lifecycle.
//!
//! ```text
//! Pending ──approve──▶ Approved
//!    │
//!    └────reject────▶ Rejected
//! ```
//!
//! Each request makes exactly one terminal transition. The backing service is
//! the system of record; `Request::decide` is the shared statement of which
//! transitions are legal.

use std::num::NonZeroU32;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use shelfwatch_core::{DashboardError, ProductName, RequestId};

/// Comment marker left by an automated process that already bypassed a request.
///
/// A request whose comment contains this substring stays `Pending` but can no
/// longer be approved by hand. This is a legacy convention carried in free
/// text: existing comment data relies on a plain, case-sensitive substring
/// match, so it must not be replaced by a status value.
pub const SKIP_SENTINEL: &str = "Skipped";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl core::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator decision on a pending request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Approve,
    Reject,
}

impl RequestAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestAction::Approve => "approve",
            RequestAction::Reject => "reject",
        }
    }

    /// Status reached when this action succeeds.
    pub fn target_status(&self) -> RequestStatus {
        match self {
            RequestAction::Approve => RequestStatus::Approved,
            RequestAction::Reject => RequestStatus::Rejected,
        }
    }
}

impl core::fmt::Display for RequestAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A replenishment request as reported by the request source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub product: ProductName,
    pub quantity: NonZeroU32,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub timestamp: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_time: Option<NaiveDateTime>,
}

impl Request {
    pub fn new(
        id: RequestId,
        product: impl Into<ProductName>,
        quantity: NonZeroU32,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            product: product.into(),
            quantity,
            status: RequestStatus::Pending,
            comment: None,
            timestamp,
            decision_time: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// True when the comment carries the skip sentinel.
    pub fn is_skipped(&self) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|c| c.contains(SKIP_SENTINEL))
    }

    /// Resulting status of `action`, or an error when the request is already terminal.
    ///
    /// Pure: supplier availability and the skip sentinel are dashboard-side
    /// guards and are not checked here.
    pub fn decide(&self, action: RequestAction) -> Result<RequestStatus, DashboardError> {
        if self.status.is_terminal() {
            return Err(DashboardError::invalid_transition(format!(
                "request {} is already {}; cannot {}",
                self.id, self.status, action
            )));
        }
        Ok(action.target_status())
    }
}
