//! Snapshot store: the latest known value of every data source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use shelfwatch_inventory::{
    AlertMap, Analytics, PendingRequestQuantity, ProductMap, Request, RequestStats,
    SupplierAvailability,
};

use crate::health::{Source, SourceHealth};

/// Point-in-time copy of every snapshot.
///
/// Cheap to take (shared handles); later writes to the store never show up in
/// a view that was already taken.
#[derive(Debug, Clone, Default)]
pub struct SnapshotView {
    pub stock: Arc<ProductMap>,
    pub requests: Arc<Vec<Request>>,
    pub supplier: Arc<SupplierAvailability>,
    pub pending: Arc<PendingRequestQuantity>,
    pub alerts: Arc<AlertMap>,
    pub stats: RequestStats,
}

#[derive(Debug, Default)]
struct Snapshots {
    view: SnapshotView,
    health: HashMap<Source, SourceHealth>,
}

/// Holds the latest snapshot of each source.
///
/// Every write is a full replacement of one snapshot; nothing is merged with
/// the previous value. Writing never triggers recomputation: callers derive
/// views explicitly. Reads of a never-written snapshot return an empty value.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    inner: RwLock<Snapshots>,
    revision: AtomicU64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stock(&self, stock: ProductMap) {
        self.write(|s| s.view.stock = Arc::new(stock));
    }

    pub fn set_requests(&self, requests: Vec<Request>) {
        self.write(|s| s.view.requests = Arc::new(requests));
    }

    pub fn set_supplier(&self, supplier: SupplierAvailability) {
        self.write(|s| s.view.supplier = Arc::new(supplier));
    }

    pub fn set_pending(&self, pending: PendingRequestQuantity) {
        self.write(|s| s.view.pending = Arc::new(pending));
    }

    pub fn set_alerts(&self, alerts: AlertMap) {
        self.write(|s| s.view.alerts = Arc::new(alerts));
    }

    pub fn set_stats(&self, stats: RequestStats) {
        self.write(|s| s.view.stats = stats);
    }

    /// Store one analytics response as a single write.
    ///
    /// Readers see either every part of the previous response or every part
    /// of this one.
    pub fn apply_analytics(&self, analytics: Analytics) {
        let Analytics {
            stats,
            alerts,
            supplier,
            pending_supplier,
        } = analytics;

        self.write(|s| {
            s.view.stats = stats;
            s.view.alerts = Arc::new(alerts);
            s.view.supplier = Arc::new(supplier);
            s.view.pending = Arc::new(pending_supplier);
        });
    }

    pub fn stock(&self) -> Arc<ProductMap> {
        self.read(|s| s.view.stock.clone())
    }

    pub fn requests(&self) -> Arc<Vec<Request>> {
        self.read(|s| s.view.requests.clone())
    }

    pub fn supplier(&self) -> Arc<SupplierAvailability> {
        self.read(|s| s.view.supplier.clone())
    }

    pub fn pending(&self) -> Arc<PendingRequestQuantity> {
        self.read(|s| s.view.pending.clone())
    }

    pub fn alerts(&self) -> Arc<AlertMap> {
        self.read(|s| s.view.alerts.clone())
    }

    pub fn stats(&self) -> RequestStats {
        self.read(|s| s.view.stats)
    }

    /// Consistent copy of all snapshots.
    pub fn view(&self) -> SnapshotView {
        self.read(|s| s.view.clone())
    }

    pub fn health(&self, source: Source) -> SourceHealth {
        self.read(|s| s.health.get(&source).cloned().unwrap_or_default())
    }

    pub fn mark_healthy(&self, source: Source) {
        self.set_health(source, SourceHealth::Healthy);
    }

    /// Flag `source` as degraded; its snapshot keeps the previous value.
    pub fn mark_degraded(&self, source: Source, reason: impl Into<String>) {
        self.set_health(source, SourceHealth::Degraded(reason.into()));
    }

    /// Number of snapshot writes so far. Health changes do not count.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn set_health(&self, source: Source, health: SourceHealth) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.health.insert(source, health);
    }

    fn write(&self, f: impl FnOnce(&mut Snapshots)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
        self.revision.fetch_add(1, Ordering::SeqCst);
    }

    fn read<T>(&self, f: impl FnOnce(&Snapshots) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}
