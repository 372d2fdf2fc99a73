// Application state for HTTP handlers
use crate::application::monitor_service::MonitorHandle;
use crate::infrastructure::config::TopologyConfig;

#[derive(Clone)]
pub struct AppState {
    pub monitor: MonitorHandle,
    pub topology: TopologyConfig,
}
