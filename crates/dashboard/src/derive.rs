//! Derivation engine: merged product views and the approvability guard.
//!
//! Everything here is a pure function of a [`SnapshotView`]. Nothing is
//! memoized, so a view taken after a store write always reflects that write.

use serde::Serialize;

use shelfwatch_core::ProductName;
use shelfwatch_inventory::{Request, SensorLocation, SensorReading};

use crate::snapshot::{SnapshotStore, SnapshotView};

/// A sensor value that may be unknown. Zero is a valid reading, so absence is
/// never encoded as zero.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Measurement {
    Known(f64),
    Unknown,
}

impl Measurement {
    pub fn value(&self) -> Option<f64> {
        match self {
            Measurement::Known(v) => Some(*v),
            Measurement::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Measurement::Known(_))
    }
}

impl From<Option<f64>> for Measurement {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Measurement::Unknown, Measurement::Known)
    }
}

impl core::fmt::Display for Measurement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Measurement::Known(v) => write!(f, "{v}"),
            Measurement::Unknown => f.write_str("N/A"),
        }
    }
}

/// Temperature and humidity at one sensor location.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SensorView {
    pub temperature: Measurement,
    pub humidity: Measurement,
}

impl SensorView {
    pub const UNKNOWN: SensorView = SensorView {
        temperature: Measurement::Unknown,
        humidity: Measurement::Unknown,
    };

    fn from_reading(reading: Option<&SensorReading>) -> Self {
        reading.map_or(Self::UNKNOWN, |r| SensorView {
            temperature: r.temperature.into(),
            humidity: r.humidity.into(),
        })
    }
}

/// Per-product record combining stock, supplier and pending snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedProductView {
    pub name: ProductName,
    /// Shelf stock; `None` when the product is missing from the stock snapshot.
    pub shelf_stock: Option<u32>,
    pub sales: Option<u64>,
    /// Supplier units, 0 when the supplier snapshot has no entry.
    pub supplier_available: u32,
    /// Pending request units, 0 when the pending snapshot has no entry.
    pub pending_quantity: u32,
    pub shelf: SensorView,
    pub inventory: SensorView,
    pub alerts: Vec<String>,
}

impl MergedProductView {
    /// Whether a sale can be simulated (shelf stock above zero).
    pub fn can_sell(&self) -> bool {
        self.shelf_stock.is_some_and(|s| s > 0)
    }

    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}

/// A request together with the actions the operator may take on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestView {
    pub request: Request,
    pub can_approve: bool,
    /// Rejection only needs a pending status; supplier stock is irrelevant.
    pub can_reject: bool,
}

/// Merge every snapshot entry for `name` into one view.
pub fn merge_product(view: &SnapshotView, name: &str) -> MergedProductView {
    let product = view.stock.get(name);
    let sensor = |location| SensorView::from_reading(product.and_then(|p| p.sensor(location)));

    MergedProductView {
        name: ProductName::from(name),
        shelf_stock: product.map(|p| p.stock),
        sales: product.map(|p| p.sales),
        supplier_available: supplier_available(view, name),
        pending_quantity: view.pending.get(name).copied().unwrap_or(0),
        shelf: sensor(SensorLocation::Shelf),
        inventory: sensor(SensorLocation::Inventory),
        alerts: view.alerts.get(name).cloned().unwrap_or_default(),
    }
}

/// Supplier units for `name`, 0 when absent.
pub fn supplier_available(view: &SnapshotView, name: &str) -> u32 {
    view.supplier.get(name).copied().unwrap_or(0)
}

/// Approvability guard: pending, not carrying the skip sentinel, and the
/// supplier has stock for the product.
pub fn is_approvable(view: &SnapshotView, request: &Request) -> bool {
    request.is_pending()
        && !request.is_skipped()
        && supplier_available(view, request.product.as_str()) > 0
}

pub fn request_view(view: &SnapshotView, request: &Request) -> RequestView {
    RequestView {
        request: request.clone(),
        can_approve: is_approvable(view, request),
        can_reject: request.is_pending(),
    }
}

/// Derivation entry point bound to a store.
///
/// Each call takes a fresh view of the store first.
#[derive(Debug, Clone, Copy)]
pub struct DerivationEngine<'a> {
    store: &'a SnapshotStore,
}

impl<'a> DerivationEngine<'a> {
    pub fn new(store: &'a SnapshotStore) -> Self {
        Self { store }
    }

    pub fn merge_product(&self, name: &str) -> MergedProductView {
        merge_product(&self.store.view(), name)
    }

    /// Merged views for every product in the stock snapshot, by name.
    pub fn merge_all(&self) -> Vec<MergedProductView> {
        let view = self.store.view();
        view.stock
            .keys()
            .map(|name| merge_product(&view, name.as_str()))
            .collect()
    }

    pub fn is_approvable(&self, request: &Request) -> bool {
        is_approvable(&self.store.view(), request)
    }

    /// Views for every request, in snapshot order.
    pub fn request_views(&self) -> Vec<RequestView> {
        let view = self.store.view();
        view.requests.iter().map(|r| request_view(&view, r)).collect()
    }
}
