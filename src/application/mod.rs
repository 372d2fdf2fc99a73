// Application layer - Engine components and the orchestrating service
pub mod bus;
pub mod error;
pub mod housekeeping;
pub mod lna_selection;
pub mod monitor_service;
pub mod plot_sink;
pub mod series_registry;
pub mod subscription_manager;
pub mod telemetry_router;

#[cfg(test)]
pub mod testing;
