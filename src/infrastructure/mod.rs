// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod local_bus;
pub mod simulator;
pub mod tracing_sink;
