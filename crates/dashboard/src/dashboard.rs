//! Dashboard facade: one owner for the snapshot store and the collaborator.

use tokio::sync::broadcast;

use shelfwatch_core::DashboardResult;
use shelfwatch_inventory::{RequestStats, SensorHistory};

use crate::collaborator::Collaborator;
use crate::config::DashboardConfig;
use crate::derive::{DerivationEngine, MergedProductView, RequestView};
use crate::health::{Source, SourceHealth};
use crate::refresh::{MutationKind, RefreshOrchestrator, Settlement};
use crate::snapshot::SnapshotStore;

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// A fetch completed and replaced its snapshot (intermediate render point).
    SourceUpdated(Source),
    /// A fetch failed; the snapshot is unchanged and now degraded.
    SourceFailed { source: Source, error: String },
    /// Every fetch of a cascade has completed (settled render point).
    Settled(Settlement),
    /// Message from the service to show the operator right away.
    Notice { message: String },
}

/// Client-side dashboard state bound to one backing service.
///
/// All snapshot writes happen on fetch completion; workflow actions run
/// through the methods in `workflow` and `alerting`.
pub struct Dashboard<C> {
    pub(crate) collaborator: C,
    pub(crate) store: SnapshotStore,
    pub(crate) events: broadcast::Sender<DashboardEvent>,
}

impl<C> Dashboard<C>
where
    C: Collaborator,
{
    pub fn new(collaborator: C) -> Self {
        Self::with_config(collaborator, &DashboardConfig::default())
    }

    pub fn with_config(collaborator: C, config: &DashboardConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            collaborator,
            store: SnapshotStore::new(),
            events,
        }
    }

    pub fn collaborator(&self) -> &C {
        &self.collaborator
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub fn engine(&self) -> DerivationEngine<'_> {
        DerivationEngine::new(&self.store)
    }

    pub fn orchestrator(&self) -> RefreshOrchestrator<'_, C> {
        RefreshOrchestrator::new(&self.collaborator, &self.store).with_events(&self.events)
    }

    /// Populate every snapshot.
    pub async fn load(&self) -> Settlement {
        self.orchestrator().settle(MutationKind::Load).await
    }

    /// Re-fetch a single source outside of any mutation (manual refresh).
    pub async fn refresh(&self, source: Source) -> SourceHealth {
        self.orchestrator().refresh(source).await;
        self.store.health(source)
    }

    pub fn products(&self) -> Vec<MergedProductView> {
        self.engine().merge_all()
    }

    pub fn product(&self, name: &str) -> MergedProductView {
        self.engine().merge_product(name)
    }

    pub fn requests(&self) -> Vec<RequestView> {
        self.engine().request_views()
    }

    pub fn stats(&self) -> RequestStats {
        self.store.stats()
    }

    pub fn health(&self, source: Source) -> SourceHealth {
        self.store.health(source)
    }

    /// Fetch recent sensor samples on demand.
    ///
    /// History is not a snapshot source: it is never cached and no mutation
    /// refreshes it.
    pub async fn sensor_history(&self) -> DashboardResult<SensorHistory> {
        let history = self
            .collaborator
            .get_sensor_history()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to fetch sensor history"))?;
        Ok(history)
    }

    pub(crate) fn notify(&self, message: impl Into<String>) {
        let _ = self.events.send(DashboardEvent::Notice {
            message: message.into(),
        });
    }
}
