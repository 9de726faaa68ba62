//! `shelfwatch-dashboard`
//!
//! **Responsibility:** client-side state reconciliation for the shelf
//! dashboard.
//!
//! This crate provides:
//! - A snapshot store holding the latest stock, request and analytics data
//! - Derived per-product views and the request approvability guard
//! - The request approval workflow and alert-triggered issue reporting
//! - Declared refresh cascades that re-fetch affected sources after mutations
//!
//! The backing service stays the system of record; this crate only talks to
//! it through the [`Collaborator`] port.

pub mod alerting;
pub mod collaborator;
pub mod config;
pub mod dashboard;
pub mod derive;
pub mod health;
pub mod http;
pub mod in_memory;
pub mod refresh;
pub mod snapshot;
pub mod workflow;

pub use collaborator::{Collaborator, CollaboratorError, Operation};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardEvent};
pub use derive::{DerivationEngine, Measurement, MergedProductView, RequestView, SensorView};
pub use health::{Source, SourceHealth};
pub use http::HttpCollaborator;
pub use in_memory::InMemoryCollaborator;
pub use refresh::{MutationKind, RefreshOrchestrator, Settlement, SourceOutcome};
pub use snapshot::{SnapshotStore, SnapshotView};
pub use workflow::{ActionOutcome, SkipReason};
