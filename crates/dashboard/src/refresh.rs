//! Refresh orchestrator: declared re-fetch cascades after mutations.
//!
//! Each mutation kind names the exact set of sources it re-fetches. The fetches
//! of one cascade run concurrently and each writes the store as soon as it
//! completes, so intermediate renders may observe a partial cascade. Only the
//! returned [`Settlement`] (and the matching `Settled` event) marks the point
//! where every fetch of the cascade has completed or failed.

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::collaborator::{Collaborator, CollaboratorError};
use crate::dashboard::DashboardEvent;
use crate::health::Source;
use crate::snapshot::SnapshotStore;

/// What triggered a cascade.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Initial population of every snapshot.
    Load,
    /// A simulated sale changed one product's shelf stock.
    Sale,
    /// A request was approved or rejected.
    RequestTransition,
    /// An environmental issue was reported for a product.
    IssueReport,
    /// A product's threshold or safe ranges changed.
    ConfigUpdate,
}

impl MutationKind {
    /// Sources re-fetched after this mutation, in issue order.
    ///
    /// Sales can move alert thresholds and request approvability, so they
    /// refresh all three sources. Transitions change supplier and pending
    /// balances and may restock the shelf. Issue reports only affect alerts.
    pub fn refresh_set(&self) -> &'static [Source] {
        match self {
            MutationKind::Load => &[Source::Stock, Source::Requests, Source::Analytics],
            MutationKind::Sale => &[Source::Stock, Source::Requests, Source::Analytics],
            MutationKind::RequestTransition => {
                &[Source::Requests, Source::Analytics, Source::Stock]
            }
            MutationKind::IssueReport => &[Source::Analytics],
            MutationKind::ConfigUpdate => &[Source::Stock, Source::Analytics],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Load => "load",
            MutationKind::Sale => "sale",
            MutationKind::RequestTransition => "request_transition",
            MutationKind::IssueReport => "issue_report",
            MutationKind::ConfigUpdate => "config_update",
        }
    }
}

impl core::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one fetch within a cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub source: Source,
    pub error: Option<CollaboratorError>,
}

impl SourceOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A completed cascade: every declared fetch has finished, successfully or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub mutation: MutationKind,
    pub outcomes: Vec<SourceOutcome>,
}

impl Settlement {
    /// Sources that were re-fetched (attempted), in issue order.
    pub fn sources(&self) -> Vec<Source> {
        self.outcomes.iter().map(|o| o.source).collect()
    }

    pub fn failed_sources(&self) -> Vec<Source> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_ok())
            .map(|o| o.source)
            .collect()
    }

    /// True when every fetch of the cascade succeeded.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(SourceOutcome::is_ok)
    }
}

/// Runs refresh cascades against a collaborator, writing into a store.
pub struct RefreshOrchestrator<'a, C: ?Sized> {
    collaborator: &'a C,
    store: &'a SnapshotStore,
    events: Option<&'a broadcast::Sender<DashboardEvent>>,
}

impl<'a, C> RefreshOrchestrator<'a, C>
where
    C: Collaborator + ?Sized,
{
    pub fn new(collaborator: &'a C, store: &'a SnapshotStore) -> Self {
        Self {
            collaborator,
            store,
            events: None,
        }
    }

    /// Publish per-source and settled events on `events`.
    pub fn with_events(mut self, events: &'a broadcast::Sender<DashboardEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Re-fetch the declared sources of `mutation` and wait for all of them.
    pub async fn settle(&self, mutation: MutationKind) -> Settlement {
        let sources = mutation.refresh_set();
        debug!(%mutation, ?sources, "starting refresh cascade");

        let outcomes = join_all(sources.iter().map(|source| self.refresh(*source))).await;
        let settlement = Settlement {
            mutation,
            outcomes,
        };

        if settlement.is_clean() {
            info!(%mutation, "refresh cascade settled");
        } else {
            info!(
                %mutation,
                failed = ?settlement.failed_sources(),
                "refresh cascade settled with degraded sources"
            );
        }

        self.emit(DashboardEvent::Settled(settlement.clone()));
        settlement
    }

    /// Fetch one source and replace its snapshot.
    ///
    /// On failure the snapshot is left as it was and the source is marked
    /// degraded.
    pub async fn refresh(&self, source: Source) -> SourceOutcome {
        let result = match source {
            Source::Stock => self
                .collaborator
                .get_stock()
                .await
                .map(|stock| self.store.set_stock(stock)),
            Source::Requests => self
                .collaborator
                .get_requests()
                .await
                .map(|requests| self.store.set_requests(requests)),
            Source::Analytics => self
                .collaborator
                .get_analytics()
                .await
                .map(|analytics| self.store.apply_analytics(analytics)),
        };

        match result {
            Ok(()) => {
                self.store.mark_healthy(source);
                debug!(%source, revision = self.store.revision(), "snapshot replaced");
                self.emit(DashboardEvent::SourceUpdated(source));
                SourceOutcome {
                    source,
                    error: None,
                }
            }
            Err(err) => {
                error!(%source, error = %err, "fetch failed; keeping previous snapshot");
                self.store.mark_degraded(source, err.to_string());
                self.emit(DashboardEvent::SourceFailed {
                    source,
                    error: err.to_string(),
                });
                SourceOutcome {
                    source,
                    error: Some(err),
                }
            }
        }
    }

    fn emit(&self, event: DashboardEvent) {
        if let Some(tx) = self.events {
            // Lossy: nobody listening is fine.
            let _ = tx.send(event);
        }
    }
}
