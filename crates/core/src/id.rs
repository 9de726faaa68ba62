//! Strongly-typed identifiers used across the dashboard.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Identifier of a replenishment request.
///
/// Always assigned by the backing service; the dashboard never mints one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for RequestId {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .trim_start_matches('#')
            .parse::<u64>()
            .map_err(|e| DashboardError::validation(format!("RequestId: {}", e)))?;
        Ok(Self(raw))
    }
}

/// Product name: the unique key of a product across every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductName(String);

impl ProductName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProductName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl core::borrow::Borrow<str> for ProductName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProductName {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DashboardError::validation("product name cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }
}
