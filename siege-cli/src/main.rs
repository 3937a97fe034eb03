// ABOUTME: Command-line launcher: reads SIEGE_* settings and both sequence files,
// ABOUTME: runs the selected strategies and prints each report.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use siege::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "siege=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let json = std::env::args().skip(1).any(|arg| arg == "--json");

    let config = SiegeConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        width = config.grid_width,
        height = config.grid_height,
        hits = config.hits_per_agent,
        power = config.agent_power,
        strategy = %config.strategy,
        "starting siege"
    );

    let plan = AttackPlan::load(
        &config.sequence_source(),
        config.grid_width,
        config.grid_height,
        config.hits_per_agent,
    )
    .await
    .context("failed to load attack sequences")?;

    let runner = Runner::new(config).with_observer(Arc::new(TracingObserver));
    let reports = runner.run_selection(&plan).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", report);
        }
    }

    Ok(())
}
