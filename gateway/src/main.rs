use anyhow::Result;
use std::sync::Arc;
use telemetry_core::{
    loader,
    synthetic::{generate_trace_set, SyntheticConfig},
    DashboardEngine, SatelliteId, TraceSet,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod routes;
mod scheduler;

use config::GatewayConfig;
use scheduler::{spawn_tick_scheduler, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "telemetry_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;

    let traces = load_traces(&config)?;
    let engine = DashboardEngine::new(Arc::new(traces))?;
    let state = AppState::new(engine);

    let app = routes::dashboard_routes(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let _scheduler = spawn_tick_scheduler(state, config.tick_interval);

    let addr = config.bind_addr();
    tracing::info!("🛰️  Telemetry Gateway starting on {}", addr);
    tracing::info!("   Satellites: {}", SatelliteId::ALL.map(|s| s.designation()).join(", "));
    tracing::info!("   Tick interval: {:?}", config.tick_interval);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CSV traces when the dataset is present, seeded synthetic traces otherwise
fn load_traces(config: &GatewayConfig) -> Result<TraceSet> {
    if loader::dataset_present(&config.data_dir) {
        let traces = loader::load_trace_set(&config.data_dir)?;
        tracing::info!("   Loaded telemetry traces from {}", config.data_dir.display());
        return Ok(traces);
    }

    tracing::warn!(
        "   No telemetry dataset in {}, using synthetic traces (seed {})",
        config.data_dir.display(),
        config.synthetic_seed
    );
    Ok(generate_trace_set(&SyntheticConfig {
        seed: config.synthetic_seed,
    })?)
}
