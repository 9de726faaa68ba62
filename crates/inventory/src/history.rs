//! Rolling sensor history.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use shelfwatch_core::ProductName;

use crate::product::{Product, SensorLocation, SensorReading};

/// Samples kept per product; older ones are dropped first.
pub const SENSOR_HISTORY_LIMIT: usize = 20;

/// Recent samples per product, oldest first.
pub type SensorHistory = BTreeMap<ProductName, Vec<SensorSample>>;

/// Both sensor groups of a product at one point in time.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub shelf: SensorReading,
    #[serde(default)]
    pub inventory: SensorReading,
}

impl SensorSample {
    /// Capture the current readings of `product`; a missing group is recorded empty.
    pub fn capture(product: &Product, timestamp: NaiveDateTime) -> Self {
        let reading = |location| product.sensor(location).copied().unwrap_or_default();
        Self {
            timestamp,
            shelf: reading(SensorLocation::Shelf),
            inventory: reading(SensorLocation::Inventory),
        }
    }
}

/// Append `sample`, keeping at most [`SENSOR_HISTORY_LIMIT`] entries.
pub fn record_sample(samples: &mut Vec<SensorSample>, sample: SensorSample) {
    samples.push(sample);
    if samples.len() > SENSOR_HISTORY_LIMIT {
        let excess = samples.len() - SENSOR_HISTORY_LIMIT;
        samples.drain(..excess);
    }
}
