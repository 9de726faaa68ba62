//! Inventory data model for the shelf dashboard.
//!
//! This crate contains the records exchanged with the backing service and the
//! replenishment request lifecycle, implemented purely as deterministic logic
//! (no IO, no HTTP, no storage).

pub mod alert;
pub mod analytics;
pub mod history;
pub mod product;
pub mod request;

pub use alert::{AlertMap, environment_alerts};
pub use analytics::{Analytics, PendingRequestQuantity, RequestStats, SupplierAvailability};
pub use history::{SENSOR_HISTORY_LIMIT, SensorHistory, SensorSample, record_sample};
pub use product::{
    Product, ProductConfigUpdate, ProductMap, SafeRange, SensorLocation, SensorReading, Sensors,
};
pub use request::{Request, RequestAction, RequestStatus, SKIP_SENTINEL};
