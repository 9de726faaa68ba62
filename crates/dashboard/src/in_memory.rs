//! In-memory backing service for tests/dev.
//!
//! Mirrors the shelf service's behavior:
//! - Lowering stock counts the difference as sales and opens a restock request
//!   when the shelf falls below its threshold and the supplier has units
//! - Approving restocks the shelf from supplier inventory, opening a follow-up
//!   request for any part that could not be delivered
//! - Approving without supplier stock leaves the request pending and appends
//!   the skip sentinel to its comment
//! - Alerts are evaluated from sensor readings against each product's safe ranges
//! - Every sensor change is sampled into a rolling per-product history
//!
//! Every call is recorded, and individual operations can be made to fail.

use std::collections::HashSet;
use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};

use shelfwatch_core::{ProductName, RequestId};
use shelfwatch_inventory::{
    AlertMap, Analytics, PendingRequestQuantity, Product, ProductConfigUpdate, ProductMap, Request,
    RequestAction, RequestStats, RequestStatus, SensorHistory, SensorLocation, SensorReading,
    SensorSample, SupplierAvailability, environment_alerts, record_sample,
};

use crate::collaborator::{Collaborator, CollaboratorError, Operation};

const SKIPPED_NO_SUPPLIER: &str = " | Skipped: no supplier stock available.";
const PARTIAL_RESTOCK: &str = "Partial restock, awaiting inventory";

#[derive(Debug, Default)]
struct ServiceState {
    products: ProductMap,
    supplier: SupplierAvailability,
    requests: Vec<Request>,
    history: SensorHistory,
    next_id: u64,
    failing: HashSet<Operation>,
    calls: Vec<Operation>,
}

impl ServiceState {
    fn pending_quantity(&self, product: &ProductName, exclude: Option<RequestId>) -> u32 {
        self.requests
            .iter()
            .filter(|r| &r.product == product && r.is_pending() && Some(r.id) != exclude)
            .map(|r| r.quantity.get())
            .sum()
    }

    fn open_request(&mut self, product: &ProductName, quantity: NonZeroU32, comment: &str) {
        self.next_id += 1;
        let request = Request::new(RequestId::new(self.next_id), product.clone(), quantity, now())
            .with_comment(comment);
        self.requests.push(request);
    }

    fn record_sensors(&mut self, product: &ProductName) {
        if let Some(entry) = self.products.get(product) {
            let sample = SensorSample::capture(entry, now());
            record_sample(self.history.entry(product.clone()).or_default(), sample);
        }
    }

    fn product_mut(&mut self, product: &ProductName) -> Result<&mut Product, CollaboratorError> {
        self.products
            .get_mut(product)
            .ok_or_else(|| invalid("Invalid product"))
    }
}

/// Simulated backing service.
#[derive(Debug, Default)]
pub struct InMemoryCollaborator {
    state: Mutex<ServiceState>,
}

impl InMemoryCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(self, name: &str, product: Product) -> Self {
        self.lock().products.insert(name.into(), product);
        self
    }

    pub fn with_supplier(self, name: &str, units: u32) -> Self {
        self.lock().supplier.insert(name.into(), units);
        self
    }

    /// Seed an existing request; later requests get ids above it.
    pub fn with_request(self, request: Request) -> Self {
        {
            let mut state = self.lock();
            state.next_id = state.next_id.max(request.id.get());
            state.requests.push(request);
        }
        self
    }

    /// Make every call to `op` fail with a network error.
    pub fn fail(&self, op: Operation) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: Operation) {
        self.lock().failing.remove(&op);
    }

    /// Operations called so far, in call order.
    pub fn calls(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn product(&self, name: &str) -> Option<Product> {
        self.lock().products.get(name).cloned()
    }

    pub fn supplier_units(&self, name: &str) -> u32 {
        self.lock().supplier.get(name).copied().unwrap_or(0)
    }

    pub fn request(&self, id: RequestId) -> Option<Request> {
        self.lock().requests.iter().find(|r| r.id == id).cloned()
    }

    /// Change service-side product data without going through a call.
    ///
    /// Sensor changes are sampled into the history.
    pub fn update_product(&self, name: &str, f: impl FnOnce(&mut Product)) {
        let mut state = self.lock();
        let Some(product) = state.products.get_mut(name) else {
            return;
        };
        let before = product.sensors;
        f(product);
        if product.sensors != before {
            state.record_sensors(&ProductName::from(name));
        }
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and apply failure injection.
    fn begin(&self, op: Operation) -> Result<MutexGuard<'_, ServiceState>, CollaboratorError> {
        let mut state = self.lock();
        state.calls.push(op);
        if state.failing.contains(&op) {
            return Err(CollaboratorError::Network(format!(
                "simulated outage during {op:?}"
            )));
        }
        Ok(state)
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn invalid(body: &str) -> CollaboratorError {
    CollaboratorError::Api {
        status: 400,
        body: body.to_string(),
    }
}

fn midpoint(low: f64, high: f64) -> f64 {
    ((low + high) / 2.0 * 10.0).round() / 10.0
}

#[async_trait]
impl Collaborator for InMemoryCollaborator {
    async fn get_stock(&self) -> Result<ProductMap, CollaboratorError> {
        let state = self.begin(Operation::GetStock)?;
        Ok(state.products.clone())
    }

    async fn set_stock(&self, product: &ProductName, stock: u32) -> Result<(), CollaboratorError> {
        let mut state = self.begin(Operation::SetStock)?;
        let entry = state.products.get_mut(product).ok_or_else(|| invalid("Invalid data"))?;

        let old = entry.stock;
        entry.stock = stock;
        if old > stock {
            entry.sales += u64::from(old - stock);
        }
        let needed = entry.shortfall();

        let pending = state.pending_quantity(product, None);
        let available = state.supplier.get(product).copied().unwrap_or(0);
        if needed > pending && available > 0 {
            if let Some(quantity) = NonZeroU32::new((needed - pending).min(available)) {
                state.open_request(product, quantity, "");
            }
        }
        Ok(())
    }

    async fn get_requests(&self) -> Result<Vec<Request>, CollaboratorError> {
        let state = self.begin(Operation::GetRequests)?;
        Ok(state.requests.clone())
    }

    async fn submit_request_action(
        &self,
        id: RequestId,
        action: RequestAction,
        comment: &str,
    ) -> Result<(), CollaboratorError> {
        let mut state = self.begin(Operation::SubmitRequestAction)?;
        let Some(index) = state
            .requests
            .iter()
            .position(|r| r.id == id && r.is_pending())
        else {
            // Unknown or already decided: ignored, like the service does.
            return Ok(());
        };

        let product = state.requests[index].product.clone();
        let available = state.supplier.get(&product).copied().unwrap_or(0);

        if action == RequestAction::Approve && available == 0 {
            let request = &mut state.requests[index];
            request
                .comment
                .get_or_insert_with(String::new)
                .push_str(SKIPPED_NO_SUPPLIER);
            return Ok(());
        }

        let status = state.requests[index]
            .decide(action)
            .map_err(|e| invalid(&e.to_string()))?;
        let requested = {
            let request = &mut state.requests[index];
            request.status = status;
            request.comment = Some(comment.to_string());
            request.decision_time = Some(now());
            request.quantity.get()
        };

        if status == RequestStatus::Approved {
            let other_pending = state.pending_quantity(&product, Some(id));
            let current_need = state.product_mut(&product)?.shortfall();
            let net_need = current_need.saturating_sub(other_pending);
            let restock = requested.min(available).min(net_need);

            state.product_mut(&product)?.stock += restock;
            if let Some(units) = state.supplier.get_mut(&product) {
                *units -= restock;
            }

            if let Some(rest) = NonZeroU32::new(requested - restock) {
                state.open_request(&product, rest, PARTIAL_RESTOCK);
            }
        }
        Ok(())
    }

    async fn get_analytics(&self) -> Result<Analytics, CollaboratorError> {
        let state = self.begin(Operation::GetAnalytics)?;

        let alerts: AlertMap = state
            .products
            .iter()
            .map(|(name, product)| (name.clone(), environment_alerts(product)))
            .collect();

        let mut pending_supplier = PendingRequestQuantity::new();
        for request in state.requests.iter().filter(|r| r.is_pending()) {
            *pending_supplier.entry(request.product.clone()).or_default() += request.quantity.get();
        }

        Ok(Analytics {
            stats: RequestStats::from_requests(&state.requests),
            alerts,
            supplier: state.supplier.clone(),
            pending_supplier,
        })
    }

    async fn get_sensor_history(&self) -> Result<SensorHistory, CollaboratorError> {
        let state = self.begin(Operation::GetSensorHistory)?;
        Ok(state.history.clone())
    }

    async fn report_environment_issue(
        &self,
        product: &ProductName,
    ) -> Result<String, CollaboratorError> {
        let mut state = self.begin(Operation::ReportEnvironmentIssue)?;
        let entry = state.product_mut(product)?;

        // Bring the shelf back inside its safe ranges.
        if let (Some(temp), Some(humidity)) = (entry.safe_temp, entry.safe_humidity) {
            let reading = SensorReading::new(
                midpoint(temp.low(), temp.high()),
                midpoint(humidity.low(), humidity.high()).round(),
            );
            *entry
                .sensors
                .get_or_insert_with(Default::default)
                .at_mut(SensorLocation::Shelf) = reading;
        }
        state.record_sensors(product);

        Ok(format!(
            "Environmental issue reported for {product}, auto-adjustment started."
        ))
    }

    async fn update_product_config(
        &self,
        product: &ProductName,
        update: &ProductConfigUpdate,
    ) -> Result<String, CollaboratorError> {
        let mut state = self.begin(Operation::UpdateProductConfig)?;
        update.apply_to(state.product_mut(product)?);
        Ok("Updated successfully".to_string())
    }
}

/// Products, supplier balances and requests of the demo shop.
pub fn demo_service() -> InMemoryCollaborator {
    use shelfwatch_inventory::SafeRange;

    InMemoryCollaborator::new()
        .with_product(
            "Milk",
            Product::new(10)
                .with_threshold(5)
                .with_safe_ranges(SafeRange(2.0, 8.0), SafeRange(60.0, 90.0))
                .with_sensor(SensorLocation::Shelf, SensorReading::new(5.0, 75.0))
                .with_sensor(SensorLocation::Inventory, SensorReading::new(7.0, 65.0)),
        )
        .with_product(
            "Bread",
            Product::new(20)
                .with_threshold(8)
                .with_safe_ranges(SafeRange(20.0, 25.0), SafeRange(30.0, 60.0))
                .with_sensor(SensorLocation::Shelf, SensorReading::new(22.0, 45.0))
                .with_sensor(SensorLocation::Inventory, SensorReading::new(25.0, 55.0)),
        )
        .with_supplier("Milk", 15)
        .with_supplier("Bread", 8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfwatch_inventory::SENSOR_HISTORY_LIMIT;

    fn milk(stock: u32) -> Product {
        Product::new(stock).with_threshold(5)
    }

    async fn pending_ids(service: &InMemoryCollaborator) -> Vec<u64> {
        service
            .get_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.is_pending())
            .map(|r| r.id.get())
            .collect()
    }

    #[tokio::test]
    async fn lowering_stock_counts_sales_and_opens_restock_request() {
        let service = InMemoryCollaborator::new()
            .with_product("Milk", milk(6))
            .with_supplier("Milk", 15);

        service.set_stock(&"Milk".into(), 5).await.unwrap();
        assert_eq!(service.product("Milk").unwrap().sales, 1);
        assert!(pending_ids(&service).await.is_empty());

        service.set_stock(&"Milk".into(), 2).await.unwrap();
        let requests = service.get_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].quantity.get(), 3);
        assert_eq!(requests[0].id, RequestId::new(1));

        // Already covered by the pending request.
        service.set_stock(&"Milk".into(), 2).await.unwrap();
        assert_eq!(pending_ids(&service).await, vec![1]);
    }

    #[tokio::test]
    async fn approval_without_supplier_stock_appends_skip_sentinel() {
        let service = InMemoryCollaborator::new()
            .with_product("Milk", milk(0))
            .with_supplier("Milk", 0)
            .with_request(Request::new(
                RequestId::new(4),
                "Milk",
                NonZeroU32::new(5).unwrap(),
                now(),
            ));

        service
            .submit_request_action(RequestId::new(4), RequestAction::Approve, "")
            .await
            .unwrap();

        let request = service.request(RequestId::new(4)).unwrap();
        assert!(request.is_pending());
        assert!(request.is_skipped());
    }

    #[tokio::test]
    async fn partial_approval_restocks_and_opens_follow_up() {
        let service = InMemoryCollaborator::new()
            .with_product("Milk", milk(0))
            .with_supplier("Milk", 2)
            .with_request(Request::new(
                RequestId::new(1),
                "Milk",
                NonZeroU32::new(5).unwrap(),
                now(),
            ));

        service
            .submit_request_action(RequestId::new(1), RequestAction::Approve, "")
            .await
            .unwrap();

        assert_eq!(service.product("Milk").unwrap().stock, 2);
        assert_eq!(service.supplier_units("Milk"), 0);
        let follow_up = service.request(RequestId::new(2)).unwrap();
        assert_eq!(follow_up.quantity.get(), 3);
        assert_eq!(follow_up.comment.as_deref(), Some(PARTIAL_RESTOCK));
        assert_eq!(
            service.request(RequestId::new(1)).unwrap().status,
            RequestStatus::Approved
        );
    }

    #[tokio::test]
    async fn decided_requests_are_ignored() {
        let service = InMemoryCollaborator::new()
            .with_product("Milk", milk(0))
            .with_supplier("Milk", 9)
            .with_request(
                Request::new(RequestId::new(1), "Milk", NonZeroU32::new(5).unwrap(), now())
                    .with_status(RequestStatus::Rejected),
            );

        service
            .submit_request_action(RequestId::new(1), RequestAction::Approve, "")
            .await
            .unwrap();

        assert_eq!(
            service.request(RequestId::new(1)).unwrap().status,
            RequestStatus::Rejected
        );
        assert_eq!(service.supplier_units("Milk"), 9);
    }

    #[tokio::test]
    async fn analytics_reports_alerts_and_pending_totals() {
        let service = demo_service();
        service.update_product("Milk", |p| {
            p.sensors.get_or_insert_with(Default::default).at_mut(SensorLocation::Shelf).temperature =
                Some(9.5)
        });
        service.set_stock(&"Milk".into(), 3).await.unwrap();

        let analytics = service.get_analytics().await.unwrap();
        assert_eq!(analytics.alerts["Milk"], vec!["Shelf temp out of range: 9.5°C".to_string()]);
        assert!(analytics.alerts["Bread"].is_empty());
        assert_eq!(analytics.pending_supplier["Milk"], 2);
        assert_eq!(analytics.stats.pending, 1);

        let message = service.report_environment_issue(&"Milk".into()).await.unwrap();
        assert!(message.contains("Milk"));
        let analytics = service.get_analytics().await.unwrap();
        assert!(analytics.alerts["Milk"].is_empty());
    }

    #[tokio::test]
    async fn sensor_history_keeps_the_last_twenty_samples() {
        let service = demo_service();
        for step in 0..25 {
            service.update_product("Milk", |p| {
                p.sensors
                    .get_or_insert_with(Default::default)
                    .at_mut(SensorLocation::Shelf)
                    .temperature = Some(f64::from(step) * 0.5)
            });
        }
        // Sensors untouched: nothing sampled.
        service.update_product("Milk", |p| p.stock = 4);

        let history = service.get_sensor_history().await.unwrap();
        let milk = &history["Milk"];
        assert_eq!(milk.len(), SENSOR_HISTORY_LIMIT);
        assert_eq!(milk.first().unwrap().shelf.temperature, Some(2.5));
        assert_eq!(milk.last().unwrap().shelf.temperature, Some(12.0));
        assert!(!history.contains_key("Bread"));
    }

    #[tokio::test]
    async fn issue_report_samples_the_adjusted_shelf() {
        let service = demo_service();
        service.report_environment_issue(&"Bread".into()).await.unwrap();

        let history = service.get_sensor_history().await.unwrap();
        assert_eq!(history["Bread"].len(), 1);
        assert_eq!(history["Bread"][0].shelf, SensorReading::new(22.5, 45.0));
        assert_eq!(
            service.calls(),
            vec![Operation::ReportEnvironmentIssue, Operation::GetSensorHistory]
        );
    }

    #[tokio::test]
    async fn injected_failures_are_recorded_and_recoverable() {
        let service = demo_service();
        service.fail(Operation::GetStock);

        assert!(matches!(
            service.get_stock().await,
            Err(CollaboratorError::Network(_))
        ));
        service.recover(Operation::GetStock);
        assert_eq!(service.get_stock().await.unwrap().len(), 2);
        assert_eq!(service.calls(), vec![Operation::GetStock, Operation::GetStock]);
    }

    #[tokio::test]
    async fn unknown_products_are_rejected() {
        let service = demo_service();
        let err = service.set_stock(&"Eggs".into(), 1).await.unwrap_err();
        assert_eq!(
            err,
            CollaboratorError::Api {
                status: 400,
                body: "Invalid data".to_string()
            }
        );
        assert!(service.report_environment_issue(&"Eggs".into()).await.is_err());
    }
}
