//! Analytics snapshot: request counters, alerts and supplier balances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use shelfwatch_core::ProductName;

use crate::alert::AlertMap;
use crate::request::{Request, RequestStatus};

/// Units the supplier can still ship, per product.
pub type SupplierAvailability = BTreeMap<ProductName, u32>;

/// Units requested and not yet resolved, per product.
///
/// Aggregated by the backing service; consumed as-is, never recomputed here.
pub type PendingRequestQuantity = BTreeMap<ProductName, u32>;

/// Request counters by status.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub approved: u64,
    #[serde(default)]
    pub rejected: u64,
}

impl RequestStats {
    pub fn from_requests<'a>(requests: impl IntoIterator<Item = &'a Request>) -> Self {
        requests.into_iter().fold(Self::default(), |mut stats, r| {
            stats.total += 1;
            match r.status {
                RequestStatus::Pending => stats.pending += 1,
                RequestStatus::Approved => stats.approved += 1,
                RequestStatus::Rejected => stats.rejected += 1,
            }
            stats
        })
    }
}

impl core::fmt::Display for RequestStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Total Requests: {} | Pending: {} | Approved: {} | Rejected: {}",
            self.total, self.pending, self.approved, self.rejected
        )
    }
}

/// Analytics response. Every part is optional on the wire and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    #[serde(flatten)]
    pub stats: RequestStats,
    #[serde(default)]
    pub alerts: AlertMap,
    #[serde(default)]
    pub supplier: SupplierAvailability,
    #[serde(default)]
    pub pending_supplier: PendingRequestQuantity,
}
