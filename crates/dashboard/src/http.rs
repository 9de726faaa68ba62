//! Collaborator backed by the shelf service's JSON API.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use shelfwatch_core::{ProductName, RequestId};
use shelfwatch_inventory::{
    Analytics, ProductConfigUpdate, ProductMap, Request, RequestAction, SensorHistory,
};

use crate::collaborator::{Collaborator, CollaboratorError};
use crate::config::DashboardConfig;

#[derive(Debug, Serialize)]
struct SetStockBody<'a> {
    product: &'a ProductName,
    stock: u32,
}

#[derive(Debug, Serialize)]
struct RequestActionBody<'a> {
    id: RequestId,
    action: RequestAction,
    comment: &'a str,
}

#[derive(Debug, Serialize)]
struct ProductBody<'a> {
    product: &'a ProductName,
}

#[derive(Debug, Serialize)]
struct ConfigBody<'a> {
    product: &'a ProductName,
    #[serde(flatten)]
    update: &'a ProductConfigUpdate,
}

#[derive(Debug, serde::Deserialize)]
struct MessageBody {
    message: String,
}

/// HTTP client for the shelf service.
///
/// One shared `reqwest::Client`; calls are never retried.
#[derive(Debug, Clone)]
pub struct HttpCollaborator {
    client: Client,
    config: DashboardConfig,
}

impl HttpCollaborator {
    pub fn new(config: &DashboardConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CollaboratorError> {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "GET");
        let resp = self.client.get(&url).send().await.map_err(network)?;
        decode(resp).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, CollaboratorError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "POST");
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }
}

fn network(err: reqwest::Error) -> CollaboratorError {
    CollaboratorError::Network(err.to_string())
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, CollaboratorError> {
    let status = resp.status();
    let text = resp.text().await.map_err(network)?;
    if !status.is_success() {
        return Err(CollaboratorError::Api {
            status: status.as_u16(),
            body: text,
        });
    }
    serde_json::from_str(&text).map_err(|e| CollaboratorError::Parse(e.to_string()))
}

#[async_trait]
impl Collaborator for HttpCollaborator {
    async fn get_stock(&self) -> Result<ProductMap, CollaboratorError> {
        self.get("/stock").await
    }

    async fn set_stock(&self, product: &ProductName, stock: u32) -> Result<(), CollaboratorError> {
        // The service echoes the product back; only the status matters here.
        let _: serde_json::Value = self.post("/stock", &SetStockBody { product, stock }).await?;
        Ok(())
    }

    async fn get_requests(&self) -> Result<Vec<Request>, CollaboratorError> {
        self.get("/requests").await
    }

    async fn submit_request_action(
        &self,
        id: RequestId,
        action: RequestAction,
        comment: &str,
    ) -> Result<(), CollaboratorError> {
        let body = RequestActionBody {
            id,
            action,
            comment,
        };
        let _: serde_json::Value = self.post("/requests", &body).await?;
        Ok(())
    }

    async fn get_analytics(&self) -> Result<Analytics, CollaboratorError> {
        self.get("/analytics").await
    }

    async fn get_sensor_history(&self) -> Result<SensorHistory, CollaboratorError> {
        self.get("/sensor-history").await
    }

    async fn report_environment_issue(
        &self,
        product: &ProductName,
    ) -> Result<String, CollaboratorError> {
        let body: MessageBody = self
            .post("/report-environment", &ProductBody { product })
            .await?;
        Ok(body.message)
    }

    async fn update_product_config(
        &self,
        product: &ProductName,
        update: &ProductConfigUpdate,
    ) -> Result<String, CollaboratorError> {
        let body: MessageBody = self
            .post("/config", &ConfigBody { product, update })
            .await?;
        Ok(body.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfwatch_inventory::SafeRange;

    #[test]
    fn request_bodies_match_service_shape() {
        let product = ProductName::from("Milk");
        let body = serde_json::to_value(RequestActionBody {
            id: RequestId::new(3),
            action: RequestAction::Approve,
            comment: "",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"id": 3, "action": "approve", "comment": ""})
        );

        let update = ProductConfigUpdate {
            threshold: Some(7),
            safe_temp: Some(SafeRange(1.0, 6.0)),
            safe_humidity: None,
        };
        let body = serde_json::to_value(ConfigBody {
            product: &product,
            update: &update,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"product": "Milk", "threshold": 7, "safe_temp": [1.0, 6.0]})
        );
    }

    #[test]
    fn client_uses_configured_base_url() {
        let config = DashboardConfig::default().with_api_url("http://shelf.local:5000/");
        let collaborator = HttpCollaborator::new(&config).unwrap();
        assert_eq!(
            collaborator.config().endpoint("/stock"),
            "http://shelf.local:5000/stock"
        );
    }
}
