//! Alert-triggered issue reporting.

use tracing::{error, info};

use shelfwatch_core::{DashboardResult, ProductName};

use crate::collaborator::Collaborator;
use crate::dashboard::Dashboard;
use crate::refresh::MutationKind;
use crate::workflow::{ActionOutcome, SkipReason};

impl<C> Dashboard<C>
where
    C: Collaborator,
{
    /// Report an environmental issue for a product with active alerts.
    ///
    /// The service's message is published as a notice before the analytics
    /// refresh runs. On failure nothing is refreshed, so the current alerts
    /// stay on display; the error is logged and returned, never retried.
    pub async fn report_issue(&self, product: &str) -> DashboardResult<ActionOutcome> {
        let active = self
            .store
            .alerts()
            .get(product)
            .is_some_and(|alerts| !alerts.is_empty());
        if !active {
            return Ok(ActionOutcome::Skipped(SkipReason::NoActiveAlert));
        }

        let name = ProductName::from(product);
        let message = self
            .collaborator
            .report_environment_issue(&name)
            .await
            .inspect_err(|e| error!(product, error = %e, "failed to report issue"))?;

        info!(product, %message, "environmental issue reported");
        self.notify(message.clone());

        self.settled(MutationKind::IssueReport, Some(message)).await
    }
}
