//! End-to-end workflows against the in-memory shelf service.

use std::num::NonZeroU32;

use chrono::NaiveDate;

use shelfwatch_core::{DashboardError, RequestId};
use shelfwatch_dashboard::in_memory::demo_service;
use shelfwatch_dashboard::{
    ActionOutcome, Dashboard, DashboardEvent, InMemoryCollaborator, MutationKind, Operation,
    SkipReason, Source, SourceHealth,
};
use shelfwatch_inventory::{
    Product, ProductConfigUpdate, Request, RequestStatus, SafeRange, SensorLocation, SensorReading,
};

fn request(id: u64, quantity: u32) -> Request {
    let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    Request::new(RequestId::new(id), "Milk", NonZeroU32::new(quantity).unwrap(), ts)
}

fn chilled_milk(stock: u32) -> Product {
    Product::new(stock)
        .with_threshold(5)
        .with_safe_ranges(SafeRange(2.0, 8.0), SafeRange(60.0, 90.0))
        .with_sensor(SensorLocation::Shelf, SensorReading::new(5.0, 75.0))
}

async fn loaded(service: InMemoryCollaborator) -> Dashboard<InMemoryCollaborator> {
    shelfwatch_observability::init_pretty();
    let dashboard = Dashboard::new(service);
    let settlement = dashboard.load().await;
    assert!(settlement.is_clean());
    dashboard.collaborator().clear_calls();
    dashboard
}

#[tokio::test]
async fn sale_is_reflected_after_the_stock_fetch() {
    let dashboard = loaded(
        InMemoryCollaborator::new().with_product("Milk", Product::new(5).with_sales(10)),
    )
    .await;

    let before = dashboard.product("Milk");
    assert_eq!(before.shelf_stock, Some(5));
    assert_eq!(before.sales, Some(10));
    assert!(before.can_sell());

    let outcome = dashboard.simulate_sale("Milk").await.unwrap();
    let settlement = outcome.settlement().unwrap();
    assert_eq!(settlement.mutation, MutationKind::Sale);
    assert!(settlement.is_clean());

    let calls = dashboard.collaborator().calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], Operation::SetStock);
    for op in [Operation::GetStock, Operation::GetRequests, Operation::GetAnalytics] {
        assert!(calls[1..].contains(&op), "missing {op:?} in {calls:?}");
    }

    let after = dashboard.product("Milk");
    assert_eq!(after.shelf_stock, Some(4));
    assert_eq!(after.sales, Some(11));
    assert!(after.can_sell());
}

#[tokio::test]
async fn sale_of_empty_shelf_makes_no_call() {
    let dashboard = loaded(InMemoryCollaborator::new().with_product("Milk", Product::new(0))).await;

    assert!(!dashboard.product("Milk").can_sell());
    let outcome = dashboard.simulate_sale("Milk").await.unwrap();

    assert_eq!(outcome, ActionOutcome::Skipped(SkipReason::OutOfStock));
    assert!(dashboard.collaborator().calls().is_empty());
}

#[tokio::test]
async fn sale_of_unknown_product_is_skipped() {
    let dashboard = loaded(demo_service()).await;

    let outcome = dashboard.simulate_sale("Eggs").await.unwrap();

    assert_eq!(outcome, ActionOutcome::Skipped(SkipReason::UnknownProduct));
    assert!(dashboard.collaborator().calls().is_empty());
}

#[tokio::test]
async fn approve_is_suppressed_without_supplier_stock_but_reject_is_not() {
    let dashboard = loaded(
        InMemoryCollaborator::new()
            .with_product("Milk", Product::new(0).with_threshold(5))
            .with_supplier("Milk", 0)
            .with_request(request(7, 5).with_comment("")),
    )
    .await;

    let view = dashboard
        .requests()
        .into_iter()
        .find(|v| v.request.id == RequestId::new(7))
        .unwrap();
    assert!(!view.can_approve);
    assert!(view.can_reject);

    let outcome = dashboard.approve(RequestId::new(7)).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Skipped(SkipReason::NotApprovable));
    assert!(dashboard.collaborator().calls().is_empty());

    let outcome = dashboard
        .reject(RequestId::new(7), Some("supplier out"))
        .await
        .unwrap();
    assert!(!outcome.is_skipped());

    let rejected = dashboard.collaborator().request(RequestId::new(7)).unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.comment.as_deref(), Some("supplier out"));
    assert_eq!(dashboard.stats().rejected, 1);
}

#[tokio::test]
async fn skip_sentinel_blocks_approval_despite_supplier_stock() {
    let dashboard = loaded(
        InMemoryCollaborator::new()
            .with_product("Milk", Product::new(0).with_threshold(5))
            .with_supplier("Milk", 20)
            .with_request(request(8, 5).with_comment("Skipped by auto-reconciler")),
    )
    .await;

    assert!(!dashboard.requests()[0].can_approve);
    let outcome = dashboard.approve(RequestId::new(8)).await.unwrap();

    assert_eq!(outcome, ActionOutcome::Skipped(SkipReason::NotApprovable));
    assert!(dashboard.collaborator().calls().is_empty());
    assert_eq!(
        dashboard.collaborator().request(RequestId::new(8)).unwrap().status,
        RequestStatus::Pending
    );
}

#[tokio::test]
async fn approved_request_is_terminal() {
    let dashboard = loaded(
        InMemoryCollaborator::new()
            .with_product("Milk", Product::new(0).with_threshold(5))
            .with_supplier("Milk", 15)
            .with_request(request(1, 5)),
    )
    .await;

    let outcome = dashboard.approve(RequestId::new(1)).await.unwrap();
    assert_eq!(
        outcome.settlement().unwrap().mutation,
        MutationKind::RequestTransition
    );

    let view = &dashboard.requests()[0];
    assert_eq!(view.request.status, RequestStatus::Approved);
    assert!(!view.can_approve);
    assert!(!view.can_reject);

    let product = dashboard.product("Milk");
    assert_eq!(product.shelf_stock, Some(5));
    assert_eq!(product.supplier_available, 10);

    assert_eq!(
        dashboard.approve(RequestId::new(1)).await.unwrap(),
        ActionOutcome::Skipped(SkipReason::NotApprovable)
    );
    assert_eq!(
        dashboard.reject(RequestId::new(1), Some("late")).await.unwrap(),
        ActionOutcome::Skipped(SkipReason::NotPending)
    );
}

#[tokio::test]
async fn request_transition_refreshes_every_declared_source() {
    let dashboard = loaded(
        InMemoryCollaborator::new()
            .with_product("Milk", Product::new(0).with_threshold(5))
            .with_supplier("Milk", 15)
            .with_request(request(1, 5)),
    )
    .await;

    dashboard.approve(RequestId::new(1)).await.unwrap();

    let calls = dashboard.collaborator().calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], Operation::SubmitRequestAction);
    for op in [Operation::GetRequests, Operation::GetAnalytics, Operation::GetStock] {
        assert!(calls[1..].contains(&op), "missing {op:?} in {calls:?}");
    }
}

#[tokio::test]
async fn cancelled_rejection_sends_nothing() {
    let dashboard = loaded(
        InMemoryCollaborator::new()
            .with_product("Milk", Product::new(0))
            .with_request(request(3, 2)),
    )
    .await;

    let outcome = dashboard.reject(RequestId::new(3), None).await.unwrap();

    assert_eq!(outcome, ActionOutcome::Skipped(SkipReason::Cancelled));
    assert!(dashboard.collaborator().calls().is_empty());
}

#[tokio::test]
async fn unknown_request_is_an_error() {
    let dashboard = loaded(demo_service()).await;

    let err = dashboard.approve(RequestId::new(99)).await.unwrap_err();
    assert_eq!(err, DashboardError::RequestNotFound(RequestId::new(99)));
}

#[tokio::test]
async fn failed_report_keeps_alerts_and_skips_refresh() {
    let service = InMemoryCollaborator::new().with_product(
        "Milk",
        chilled_milk(8).with_sensor(SensorLocation::Shelf, SensorReading::new(9.1, 75.0)),
    );
    let dashboard = loaded(service).await;
    let alerts = dashboard.product("Milk").alerts;
    assert_eq!(alerts, vec!["Shelf temp out of range: 9.1°C".to_string()]);

    dashboard
        .collaborator()
        .fail(Operation::ReportEnvironmentIssue);
    let result = dashboard.report_issue("Milk").await;

    assert!(matches!(result, Err(DashboardError::Collaborator(_))));
    assert_eq!(dashboard.product("Milk").alerts, alerts);
    assert_eq!(
        dashboard.collaborator().calls(),
        vec![Operation::ReportEnvironmentIssue]
    );
    assert_eq!(dashboard.health(Source::Analytics), SourceHealth::Healthy);
}

#[tokio::test]
async fn report_publishes_notice_before_settling() {
    let service = InMemoryCollaborator::new().with_product(
        "Milk",
        chilled_milk(8).with_sensor(SensorLocation::Shelf, SensorReading::new(5.0, 95.0)),
    );
    let dashboard = loaded(service).await;
    assert!(dashboard.product("Milk").has_alerts());

    let mut events = dashboard.subscribe();
    let outcome = dashboard.report_issue("Milk").await.unwrap();

    assert_eq!(
        outcome.message(),
        Some("Environmental issue reported for Milk, auto-adjustment started.")
    );
    assert_eq!(
        outcome.settlement().unwrap().sources(),
        vec![Source::Analytics]
    );
    assert!(!dashboard.product("Milk").has_alerts());

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    let notice = received
        .iter()
        .position(|e| matches!(e, DashboardEvent::Notice { .. }))
        .unwrap();
    let settled = received
        .iter()
        .position(|e| matches!(e, DashboardEvent::Settled(_)))
        .unwrap();
    assert!(notice < settled);
}

#[tokio::test]
async fn report_without_active_alert_is_skipped() {
    let dashboard = loaded(InMemoryCollaborator::new().with_product("Milk", chilled_milk(8))).await;

    let outcome = dashboard.report_issue("Milk").await.unwrap();

    assert_eq!(outcome, ActionOutcome::Skipped(SkipReason::NoActiveAlert));
    assert!(dashboard.collaborator().calls().is_empty());
}

#[tokio::test]
async fn failed_fetch_degrades_source_and_keeps_previous_snapshot() {
    let service = InMemoryCollaborator::new()
        .with_product(
            "Milk",
            chilled_milk(8).with_sensor(SensorLocation::Shelf, SensorReading::new(9.1, 75.0)),
        )
        .with_supplier("Milk", 4);
    let dashboard = loaded(service).await;
    dashboard.collaborator().fail(Operation::GetAnalytics);

    let outcome = dashboard.simulate_sale("Milk").await.unwrap();
    let settlement = outcome.settlement().unwrap();

    assert_eq!(settlement.failed_sources(), vec![Source::Analytics]);
    assert!(dashboard.health(Source::Analytics).is_degraded());
    assert_eq!(dashboard.health(Source::Stock), SourceHealth::Healthy);
    assert_eq!(dashboard.product("Milk").shelf_stock, Some(7));
    assert_eq!(dashboard.product("Milk").alerts.len(), 1);

    dashboard.collaborator().recover(Operation::GetAnalytics);
    assert_eq!(
        dashboard.refresh(Source::Analytics).await,
        SourceHealth::Healthy
    );
}

#[tokio::test]
async fn failed_sale_propagates_without_refresh() {
    let dashboard = loaded(demo_service()).await;
    dashboard.collaborator().fail(Operation::SetStock);

    let err = dashboard.simulate_sale("Bread").await.unwrap_err();

    assert!(matches!(err, DashboardError::Collaborator(_)));
    assert_eq!(dashboard.collaborator().calls(), vec![Operation::SetStock]);
    assert_eq!(dashboard.product("Bread").shelf_stock, Some(20));
}

#[tokio::test]
async fn config_update_refreshes_stock_and_analytics() {
    let dashboard = loaded(demo_service()).await;
    let update = ProductConfigUpdate {
        safe_temp: Some(SafeRange(6.0, 8.0)),
        ..Default::default()
    };

    let outcome = dashboard.update_config("Milk", &update).await.unwrap();

    assert_eq!(outcome.message(), Some("Updated successfully"));
    assert_eq!(
        dashboard.collaborator().calls(),
        vec![
            Operation::UpdateProductConfig,
            Operation::GetStock,
            Operation::GetAnalytics
        ]
    );
    let milk = dashboard.store().stock()["Milk"].clone();
    assert_eq!(milk.safe_temp, Some(SafeRange(6.0, 8.0)));
    assert_eq!(
        dashboard.product("Milk").alerts,
        vec!["Shelf temp out of range: 5.0°C".to_string()]
    );
}

#[tokio::test]
async fn sensor_history_is_fetched_on_demand() {
    let dashboard = loaded(demo_service()).await;
    dashboard.collaborator().update_product("Milk", |p| {
        p.sensors
            .get_or_insert_with(Default::default)
            .at_mut(SensorLocation::Inventory)
            .humidity = Some(92.0)
    });

    let history = dashboard.sensor_history().await.unwrap();
    assert_eq!(history["Milk"].len(), 1);
    assert_eq!(history["Milk"][0].inventory.humidity, Some(92.0));
    assert_eq!(
        dashboard.collaborator().calls(),
        vec![Operation::GetSensorHistory]
    );

    dashboard.collaborator().fail(Operation::GetSensorHistory);
    let err = dashboard.sensor_history().await.unwrap_err();
    assert!(matches!(err, DashboardError::Collaborator(_)));
    assert_eq!(dashboard.store().revision(), 3);
}

#[tokio::test]
async fn empty_config_update_is_rejected() {
    let dashboard = loaded(demo_service()).await;

    let err = dashboard
        .update_config("Milk", &ProductConfigUpdate::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DashboardError::Validation(_)));
    assert!(dashboard.collaborator().calls().is_empty());
}
