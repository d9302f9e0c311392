//! Prometeo Dashboard - loads the dashboard queries once and reports them.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prometeo_dashboard::infrastructure::DashboardConfig;
use prometeo_dashboard::state::{ClientTable, ProgressView};
use prometeo_dashboard::Dashboard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prometeo_dashboard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DashboardConfig::from_env().context("Invalid dashboard configuration")?;
    tracing::info!(
        api_url = %config.api_url,
        page_size = config.page_size,
        assistant = config.assistant_webhook_url.is_some(),
        "Starting Prometeo dashboard"
    );

    let dashboard = Dashboard::new(config);
    let mut failures = 0;
    for (key, result) in dashboard.warm_up().await {
        match result {
            Ok(()) => tracing::info!(key = %key, "Query loaded"),
            Err(e) => {
                failures += 1;
                tracing::error!(key = %key, error = %e, "Query failed");
            }
        }
    }

    if let Ok(clients) = dashboard.clients.fetch_priority_list(dashboard.first_page()).await {
        let table = ClientTable::new(dashboard.config().page_size);
        for client in table.sorted(&clients) {
            tracing::info!(
                client_id = %client.id,
                user_id = %client.user_id,
                probability = client.probability.percent(),
                status = client.status.label(),
                "Priority client"
            );
        }
    }

    if let Ok(progress) = dashboard.contacts.progress().await {
        let view = ProgressView::from(&progress);
        tracing::info!(
            monthly_percent = view.monthly_percent,
            projected_percent = view.projected_percent,
            will_reach_target = view.will_reach_target,
            "Contact progress"
        );
    }

    dashboard.shutdown();
    if failures > 0 {
        anyhow::bail!("{} dashboard queries failed", failures);
    }
    Ok(())
}
