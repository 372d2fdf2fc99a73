// Synthetic telemetry source for running without instrument hardware
use crate::domain::lna::LnaStage;
use crate::domain::packet::SECONDS_PER_DAY;
use crate::domain::series::Plot;
use crate::infrastructure::config::expand_template;
use crate::infrastructure::local_bus::LocalBus;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;

/// MJD of the Unix epoch.
const MJD_UNIX_EPOCH: f64 = 40_587.0;

pub fn mjd(time: DateTime<Utc>) -> f64 {
    MJD_UNIX_EPOCH + time.timestamp_millis() as f64 / 1000.0 / SECONDS_PER_DAY
}

/// Publishes one power/demod and one bias packet per channel every tick.
pub struct Simulator {
    bus: LocalBus,
    channels: Vec<(String, String)>,
    housekeeping_suffix: String,
    tick: Duration,
}

impl Simulator {
    pub fn new(
        bus: LocalBus,
        channels: Vec<String>,
        topic_template: &str,
        housekeeping_suffix: String,
        tick: Duration,
    ) -> Self {
        let channels = channels
            .into_iter()
            .map(|pol| {
                let vars = HashMap::from([("pol".to_string(), pol.clone())]);
                let topic = expand_template(topic_template, &vars);
                (pol, topic)
            })
            .collect();
        Self {
            bus,
            channels,
            housekeeping_suffix,
            tick,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.tick);
            tracing::info!(channels = self.channels.len(), tick = ?self.tick, "simulator running");
            loop {
                interval.tick().await;
                self.publish_tick(mjd(Utc::now()));
            }
        })
    }

    fn publish_tick(&self, mjd: f64) {
        let mut rng = rand::thread_rng();
        for (pol, topic) in &self.channels {
            let power = power_demod_packet(pol, mjd, &mut rng);
            let bias = bias_packet(pol, mjd, &self.housekeeping_suffix, &mut rng);
            let delivered = self.bus.publish(topic, power) + self.bus.publish(topic, bias);
            tracing::trace!(pol = %pol, delivered, "simulated tick");
        }
    }
}

pub fn power_demod_packet(pol: &str, mjd: f64, rng: &mut impl Rng) -> Value {
    let mut fields = Map::new();
    fields.insert("pol".into(), json!(pol));
    fields.insert("mjd".into(), json!(mjd));
    for plot in Plot::POWER_DEMOD {
        fields.insert(plot.field().into(), json!(rng.gen_range(0.0..1.0)));
    }
    Value::Object(fields)
}

pub fn bias_packet(pol: &str, mjd: f64, suffix: &str, rng: &mut impl Rng) -> Value {
    let mut bias = Map::new();
    for stage in LnaStage::ALL {
        for plot in Plot::BIAS {
            let nominal = match plot {
                Plot::DrainVoltage => 1.2,
                Plot::GateVoltage => -0.3,
                Plot::DrainCurrent => 12.0,
                _ => 0.05,
            };
            let value = nominal * (1.0 + rng.gen_range(-0.02..0.02));
            bias.insert(plot.bias_field(stage, suffix), json!(value));
        }
    }
    json!({ "pol": pol, "mjd": mjd, "bias": bias })
}
