//! Product stock records as reported by the stock source.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use shelfwatch_core::ProductName;

/// Full stock snapshot keyed by product name.
pub type ProductMap = BTreeMap<ProductName, Product>;

/// Inclusive `[low, high]` bounds, encoded as a two-element array on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeRange(pub f64, pub f64);

impl SafeRange {
    pub fn low(&self) -> f64 {
        self.0
    }

    pub fn high(&self) -> f64 {
        self.1
    }

    pub fn contains(&self, value: f64) -> bool {
        self.0 <= value && value <= self.1
    }
}

/// Where a sensor is mounted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorLocation {
    Shelf,
    Inventory,
}

impl SensorLocation {
    pub const ALL: [SensorLocation; 2] = [SensorLocation::Shelf, SensorLocation::Inventory];

    /// Capitalized label used in alert messages.
    pub fn label(&self) -> &'static str {
        match self {
            SensorLocation::Shelf => "Shelf",
            SensorLocation::Inventory => "Inventory",
        }
    }
}

/// One sensor reading. Either value may be missing on the wire.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "temp", default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

impl SensorReading {
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature: Some(temperature),
            humidity: Some(humidity),
        }
    }
}

/// Sensor groups of a product; a missing group means "no reading".
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sensors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf: Option<SensorReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<SensorReading>,
}

impl Sensors {
    pub fn at(&self, location: SensorLocation) -> Option<&SensorReading> {
        match location {
            SensorLocation::Shelf => self.shelf.as_ref(),
            SensorLocation::Inventory => self.inventory.as_ref(),
        }
    }

    pub fn at_mut(&mut self, location: SensorLocation) -> &mut SensorReading {
        match location {
            SensorLocation::Shelf => self.shelf.get_or_insert_with(SensorReading::default),
            SensorLocation::Inventory => self.inventory.get_or_insert_with(SensorReading::default),
        }
    }
}

/// A product as reported by the stock source.
///
/// Replaced wholesale on every stock fetch; the dashboard never edits one in
/// place (changes go through the backing service and come back via fetch).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Units on the shelf.
    pub stock: u32,
    /// Cumulative units sold.
    #[serde(default)]
    pub sales: u64,
    /// Restock threshold: below it the service raises a replenishment request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_temp: Option<SafeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_humidity: Option<SafeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensors: Option<Sensors>,
}

impl Product {
    pub fn new(stock: u32) -> Self {
        Self {
            stock,
            ..Self::default()
        }
    }

    pub fn with_sales(mut self, sales: u64) -> Self {
        self.sales = sales;
        self
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_safe_ranges(mut self, temp: SafeRange, humidity: SafeRange) -> Self {
        self.safe_temp = Some(temp);
        self.safe_humidity = Some(humidity);
        self
    }

    pub fn with_sensor(mut self, location: SensorLocation, reading: SensorReading) -> Self {
        *self.sensors.get_or_insert_with(Sensors::default).at_mut(location) = reading;
        self
    }

    pub fn sensor(&self, location: SensorLocation) -> Option<&SensorReading> {
        self.sensors.as_ref().and_then(|s| s.at(location))
    }

    /// Units still needed to reach the restock threshold.
    pub fn shortfall(&self) -> u32 {
        self.threshold.unwrap_or(0).saturating_sub(self.stock)
    }
}

/// Partial configuration change for one product; absent fields stay as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_temp: Option<SafeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_humidity: Option<SafeRange>,
}

impl ProductConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.threshold.is_none() && self.safe_temp.is_none() && self.safe_humidity.is_none()
    }

    /// Apply the present fields to `product`.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(threshold) = self.threshold {
            product.threshold = Some(threshold);
        }
        if let Some(range) = self.safe_temp {
            product.safe_temp = Some(range);
        }
        if let Some(range) = self.safe_humidity {
            product.safe_humidity = Some(range);
        }
    }
}
