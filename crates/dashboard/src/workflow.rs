//! Request workflow and stock mutations.
//!
//! Guards are evaluated against the current snapshots at the moment an
//! action is invoked. A failed guard or an operator cancellation is not an
//! error: the action is skipped and the collaborator is never called. The
//! collaborator re-checks server-side; this layer does not.

use tracing::{error, info, warn};

use shelfwatch_core::{DashboardError, DashboardResult, ProductName, RequestId};
use shelfwatch_inventory::{ProductConfigUpdate, RequestAction};

use crate::collaborator::Collaborator;
use crate::dashboard::Dashboard;
use crate::derive::is_approvable;
use crate::refresh::{MutationKind, Settlement};

/// Why an action was not sent to the collaborator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Shelf stock is zero.
    OutOfStock,
    /// The product is not in the stock snapshot.
    UnknownProduct,
    /// The approvability guard does not hold.
    NotApprovable,
    /// The request is no longer pending.
    NotPending,
    /// The operator declined to provide required input.
    Cancelled,
    /// The product has no active alert to report.
    NoActiveAlert,
}

/// Result of a workflow action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The mutation was acknowledged and its refresh cascade has settled.
    Settled {
        /// Message returned by the service, when it sends one.
        message: Option<String>,
        settlement: Settlement,
    },
    Skipped(SkipReason),
}

impl ActionOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ActionOutcome::Skipped(_))
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        match self {
            ActionOutcome::Settled { settlement, .. } => Some(settlement),
            ActionOutcome::Skipped(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ActionOutcome::Settled { message, .. } => message.as_deref(),
            ActionOutcome::Skipped(_) => None,
        }
    }
}

impl<C> Dashboard<C>
where
    C: Collaborator,
{
    /// Sell one unit from the shelf.
    ///
    /// The new count is computed from the current stock snapshot. Sales are
    /// only reflected after the next stock fetch.
    pub async fn simulate_sale(&self, product: &str) -> DashboardResult<ActionOutcome> {
        let current = self.store.stock().get(product).map(|p| p.stock);
        let stock = match current {
            None => return Ok(ActionOutcome::Skipped(SkipReason::UnknownProduct)),
            Some(0) => {
                info!(product, "sale ignored: out of stock");
                return Ok(ActionOutcome::Skipped(SkipReason::OutOfStock));
            }
            Some(stock) => stock,
        };

        let name = ProductName::from(product);
        self.collaborator
            .set_stock(&name, stock - 1)
            .await
            .inspect_err(|e| error!(product, error = %e, "sale simulation failed"))?;
        info!(product, new_stock = stock - 1, "sale recorded");

        self.settled(MutationKind::Sale, None).await
    }

    /// Approve a pending request.
    pub async fn approve(&self, id: RequestId) -> DashboardResult<ActionOutcome> {
        let view = self.store.view();
        let request = view
            .requests
            .iter()
            .find(|r| r.id == id)
            .ok_or(DashboardError::RequestNotFound(id))?;

        if !is_approvable(&view, request) {
            warn!(request_id = %id, status = %request.status, "approval suppressed by guard");
            return Ok(ActionOutcome::Skipped(SkipReason::NotApprovable));
        }

        self.transition(id, RequestAction::Approve, "").await
    }

    /// Reject a pending request with the operator's reason.
    ///
    /// `None` means the operator cancelled the prompt: nothing is sent.
    pub async fn reject(
        &self,
        id: RequestId,
        reason: Option<&str>,
    ) -> DashboardResult<ActionOutcome> {
        let pending = self
            .store
            .requests()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.is_pending())
            .ok_or(DashboardError::RequestNotFound(id))?;

        if !pending {
            return Ok(ActionOutcome::Skipped(SkipReason::NotPending));
        }
        let Some(reason) = reason else {
            info!(request_id = %id, "rejection abandoned by operator");
            return Ok(ActionOutcome::Skipped(SkipReason::Cancelled));
        };

        self.transition(id, RequestAction::Reject, reason).await
    }

    /// Change a product's threshold or safe ranges.
    pub async fn update_config(
        &self,
        product: &str,
        update: &ProductConfigUpdate,
    ) -> DashboardResult<ActionOutcome> {
        if update.is_empty() {
            return Err(DashboardError::validation("config update has no fields"));
        }
        let name = ProductName::from(product);
        if !self.store.stock().contains_key(product) {
            return Err(DashboardError::ProductNotFound(name));
        }

        let message = self
            .collaborator
            .update_product_config(&name, update)
            .await
            .inspect_err(|e| error!(product, error = %e, "config update failed"))?;
        info!(product, %message, "config updated");

        self.settled(MutationKind::ConfigUpdate, Some(message)).await
    }

    async fn transition(
        &self,
        id: RequestId,
        action: RequestAction,
        comment: &str,
    ) -> DashboardResult<ActionOutcome> {
        self.collaborator
            .submit_request_action(id, action, comment)
            .await
            .inspect_err(|e| error!(request_id = %id, %action, error = %e, "request action failed"))?;
        info!(request_id = %id, %action, "request action submitted");

        self.settled(MutationKind::RequestTransition, None).await
    }

    pub(crate) async fn settled(
        &self,
        mutation: MutationKind,
        message: Option<String>,
    ) -> DashboardResult<ActionOutcome> {
        let settlement = self.orchestrator().settle(mutation).await;
        Ok(ActionOutcome::Settled {
            message,
            settlement,
        })
    }
}
