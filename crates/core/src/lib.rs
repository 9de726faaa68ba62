//! `shelfwatch-core`: shared building blocks.
//!
//! This crate contains identifiers and the error model shared by the
//! inventory data model and the dashboard client (no IO).

pub mod error;
pub mod id;

pub use error::{DashboardError, DashboardResult};
pub use id::{ProductName, RequestId};
