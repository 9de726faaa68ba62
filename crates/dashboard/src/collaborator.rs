//! Port to the backing service that owns stock, supplier and request data.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use shelfwatch_core::{DashboardError, ProductName, RequestId};
use shelfwatch_inventory::{
    Analytics, ProductConfigUpdate, ProductMap, Request, RequestAction, SensorHistory,
};

/// Failure of a collaborator call.
///
/// Always recoverable: the affected snapshot is left unchanged and the failure
/// is reported to the operator. Nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<CollaboratorError> for DashboardError {
    fn from(err: CollaboratorError) -> Self {
        DashboardError::collaborator(err.to_string())
    }
}

/// Collaborator operations, used for call logs and failure injection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    GetStock,
    SetStock,
    GetRequests,
    SubmitRequestAction,
    GetAnalytics,
    GetSensorHistory,
    ReportEnvironmentIssue,
    UpdateProductConfig,
}

/// Operations exposed by the backing service.
///
/// Every fetch returns a full replacement snapshot. Mutations only acknowledge;
/// their effect becomes visible through the next fetch.
#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn get_stock(&self) -> Result<ProductMap, CollaboratorError>;

    /// Set one product's shelf stock.
    async fn set_stock(&self, product: &ProductName, stock: u32) -> Result<(), CollaboratorError>;

    /// Full request list, in no particular order.
    async fn get_requests(&self) -> Result<Vec<Request>, CollaboratorError>;

    /// Approve or reject a request. The service ignores requests that are no
    /// longer pending.
    async fn submit_request_action(
        &self,
        id: RequestId,
        action: RequestAction,
        comment: &str,
    ) -> Result<(), CollaboratorError>;

    async fn get_analytics(&self) -> Result<Analytics, CollaboratorError>;

    /// Recent sensor samples per product, oldest first.
    async fn get_sensor_history(&self) -> Result<SensorHistory, CollaboratorError>;

    /// Report an environmental issue; returns the service's outcome message.
    async fn report_environment_issue(
        &self,
        product: &ProductName,
    ) -> Result<String, CollaboratorError>;

    /// Change a product's threshold and safe ranges; returns the service's message.
    async fn update_product_config(
        &self,
        product: &ProductName,
        update: &ProductConfigUpdate,
    ) -> Result<String, CollaboratorError>;
}

#[async_trait]
impl<C> Collaborator for Arc<C>
where
    C: Collaborator + ?Sized,
{
    async fn get_stock(&self) -> Result<ProductMap, CollaboratorError> {
        (**self).get_stock().await
    }

    async fn set_stock(&self, product: &ProductName, stock: u32) -> Result<(), CollaboratorError> {
        (**self).set_stock(product, stock).await
    }

    async fn get_requests(&self) -> Result<Vec<Request>, CollaboratorError> {
        (**self).get_requests().await
    }

    async fn submit_request_action(
        &self,
        id: RequestId,
        action: RequestAction,
        comment: &str,
    ) -> Result<(), CollaboratorError> {
        (**self).submit_request_action(id, action, comment).await
    }

    async fn get_analytics(&self) -> Result<Analytics, CollaboratorError> {
        (**self).get_analytics().await
    }

    async fn get_sensor_history(&self) -> Result<SensorHistory, CollaboratorError> {
        (**self).get_sensor_history().await
    }

    async fn report_environment_issue(
        &self,
        product: &ProductName,
    ) -> Result<String, CollaboratorError> {
        (**self).report_environment_issue(product).await
    }

    async fn update_product_config(
        &self,
        product: &ProductName,
        update: &ProductConfigUpdate,
    ) -> Result<String, CollaboratorError> {
        (**self).update_product_config(product, update).await
    }
}
