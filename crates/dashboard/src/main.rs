use anyhow::Context;

use shelfwatch_dashboard::{Dashboard, DashboardConfig, HttpCollaborator, Source};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shelfwatch_observability::init();

    let config = DashboardConfig::from_env().context("invalid dashboard configuration")?;
    tracing::info!(api_url = %config.api_url, "connecting to shelf service");

    let collaborator = HttpCollaborator::new(&config).context("failed to build HTTP client")?;
    let dashboard = Dashboard::with_config(collaborator, &config);

    let settlement = dashboard.load().await;
    for source in settlement.failed_sources() {
        tracing::warn!(%source, "initial load failed; showing empty snapshot");
    }

    for product in dashboard.products() {
        tracing::info!(
            product = %product.name,
            stock = ?product.shelf_stock,
            sales = ?product.sales,
            supplier = product.supplier_available,
            pending = product.pending_quantity,
            shelf_temp = %product.shelf.temperature,
            shelf_humidity = %product.shelf.humidity,
            alerts = ?product.alerts,
            "product"
        );
    }

    for view in dashboard.requests() {
        let request = &view.request;
        tracing::info!(
            id = %request.id,
            product = %request.product,
            quantity = request.quantity.get(),
            status = %request.status,
            comment = request.comment.as_deref().unwrap_or(""),
            can_approve = view.can_approve,
            can_reject = view.can_reject,
            "request"
        );
    }

    tracing::info!(stats = %dashboard.stats(), "request summary");

    if Source::ALL
        .iter()
        .any(|source| dashboard.health(*source).is_degraded())
    {
        anyhow::bail!("shelf service unavailable for one or more sources");
    }
    Ok(())
}
