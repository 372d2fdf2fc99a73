// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{routing::{get, put}, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::monitor_service::MonitorService;
use crate::application::plot_sink::{PlotSink, PlotSinks};
use crate::domain::palette::ColorPicker;
use crate::infrastructure::config::{load_monitor_config, load_topology_config, monitor_settings};
use crate::infrastructure::local_bus::LocalBus;
use crate::infrastructure::simulator::Simulator;
use crate::infrastructure::tracing_sink::TracingPlotSink;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_snapshot, get_topology, health_check, set_lna, set_polarimeter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let monitor_config = load_monitor_config()?;
    let topology = load_topology_config()?;
    let settings = monitor_settings(&monitor_config, &topology);

    // Bus and plot sinks (infrastructure layer)
    let bus = LocalBus::new();
    let sinks =
        PlotSinks::from_fn(|plot| Arc::new(TracingPlotSink::new(plot)) as Arc<dyn PlotSink>);

    if monitor_config.simulator.enabled {
        Simulator::new(
            bus.clone(),
            settings.channels.clone(),
            &settings.topic_template,
            settings.housekeeping_suffix.clone(),
            Duration::from_millis(monitor_config.simulator.tick_ms),
        )
        .spawn();
    }

    // Engine (application layer)
    let monitor = MonitorService::spawn(Arc::new(bus), sinks, settings, ColorPicker::new());

    let state = Arc::new(AppState {
        monitor: monitor.clone(),
        topology,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/snapshot", get(get_snapshot))
        .route("/topology", get(get_topology))
        .route("/polarimeters/:name", put(set_polarimeter))
        .route("/lna/:stage", put(set_lna))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = monitor_config.server.bind.parse()?;
    tracing::info!(%addr, "starting polarimeter-monitor");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
        })
        .await?;

    monitor.shutdown().await?;

    Ok(())
}
