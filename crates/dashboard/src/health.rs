//! Data sources and their health.

use serde::{Deserialize, Serialize};

/// An independently fetched data source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Shelf/warehouse stock per product.
    Stock,
    /// The replenishment request list.
    Requests,
    /// Counters, alerts, supplier availability and pending quantities.
    Analytics,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Stock, Source::Requests, Source::Analytics];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Stock => "stock",
            Source::Requests => "requests",
            Source::Analytics => "analytics",
        }
    }
}

impl core::fmt::Display for Source {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the most recent completed fetch of a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "reason")]
pub enum SourceHealth {
    /// Never fetched.
    #[default]
    Unknown,
    /// Last fetch succeeded; the snapshot is its result.
    Healthy,
    /// Last fetch failed; the snapshot still holds the previous value and the
    /// presentation layer shows a degraded indicator instead.
    Degraded(String),
}

impl SourceHealth {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SourceHealth::Degraded(_))
    }
}
