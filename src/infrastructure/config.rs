use crate::application::monitor_service::MonitorSettings;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub bus: BusSettings,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub simulator: SimulatorSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusSettings {
    /// Topic carrying one channel's telemetry; `${pol}` is the channel name
    pub topic_template: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindowSettings {
    pub span_seconds: f64,
    pub housekeeping_suffix: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            span_seconds: 10.0,
            housekeeping_suffix: "_HK".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorSettings {
    pub enabled: bool,
    pub tick_ms: u64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            tick_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TopologyConfig {
    #[serde(default)]
    pub boards: Vec<BoardConfig>,
    /// Board bias register map; housekeeping entries carry the suffix
    #[serde(default, rename = "BIAS_POL", alias = "bias_pol")]
    pub bias_pol: Vec<AddressConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    pub name: String,
    #[serde(default)]
    pub pols: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AddressConfig {
    pub name: String,
}

impl TopologyConfig {
    pub fn channels(&self) -> Vec<String> {
        self.boards.iter().flat_map(|b| b.pols.iter().cloned()).collect()
    }

    pub fn housekeeping_names(&self, suffix: &str) -> Vec<String> {
        self.bias_pol
            .iter()
            .filter(|a| a.name.ends_with(suffix))
            .map(|a| a.name.clone())
            .collect()
    }
}

pub fn load_monitor_config() -> anyhow::Result<MonitorConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/monitor"))
        .add_source(
            config::Environment::with_prefix("POLMON")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_topology_config() -> anyhow::Result<TopologyConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/topology"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn monitor_settings(monitor: &MonitorConfig, topology: &TopologyConfig) -> MonitorSettings {
    let suffix = monitor.window.housekeeping_suffix.clone();
    MonitorSettings {
        topic_template: monitor.bus.topic_template.clone(),
        span_seconds: monitor.window.span_seconds,
        housekeeping_names: topology.housekeeping_names(&suffix),
        housekeeping_suffix: suffix,
        channels: topology.channels(),
    }
}

/// Replace `${name}` placeholders with values from `vars`
pub fn expand_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
