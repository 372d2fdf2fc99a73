// Telemetry packet domain model
use super::series::Plot;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Field whose presence marks a power/demodulation packet.
const PRIMARY_FIELD: &str = "PWRQ1";
const BIAS_FIELD: &str = "bias";

#[derive(Debug, Error, PartialEq)]
pub enum PacketError {
    #[error("malformed packet: {0}")]
    Malformed(String),
    #[error("power/demod packet for {pol} is missing {missing:?}")]
    IncompletePowerDemod { pol: String, missing: Vec<&'static str> },
}

/// Eight power/demodulation readings, in [`Plot::POWER_DEMOD`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerDemodReadings(pub [f64; 8]);

impl PowerDemodReadings {
    pub fn iter(&self) -> impl Iterator<Item = (Plot, f64)> + '_ {
        Plot::POWER_DEMOD.into_iter().zip(self.0.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    PowerDemod(PowerDemodReadings),
    /// Numeric bias scalars by field name. Non-numeric entries are dropped
    /// during parsing and listed in `rejected`.
    Bias {
        readings: BTreeMap<String, f64>,
        rejected: Vec<String>,
    },
    /// Neither a power/demod nor a bias packet.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryPacket {
    pub pol: String,
    /// Modified Julian Date, in days.
    pub mjd: f64,
    pub payload: Payload,
}

#[derive(Deserialize)]
struct WirePacket {
    pol: String,
    mjd: f64,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl TelemetryPacket {
    /// Parse the named fields delivered by the bus.
    pub fn from_value(value: Value) -> Result<Self, PacketError> {
        let wire: WirePacket =
            serde_json::from_value(value).map_err(|e| PacketError::Malformed(e.to_string()))?;

        let payload = if wire.fields.contains_key(PRIMARY_FIELD) {
            Payload::PowerDemod(Self::power_demod(&wire.pol, &wire.fields)?)
        } else if let Some(bias) = wire.fields.get(BIAS_FIELD).and_then(Value::as_object) {
            let mut readings = BTreeMap::new();
            let mut rejected = Vec::new();
            for (name, value) in bias {
                match value.as_f64() {
                    Some(v) => {
                        readings.insert(name.clone(), v);
                    }
                    None => rejected.push(name.clone()),
                }
            }
            Payload::Bias { readings, rejected }
        } else {
            Payload::Empty
        };

        Ok(Self {
            pol: wire.pol,
            mjd: wire.mjd,
            payload,
        })
    }

    /// Timestamp in seconds, the unit window spans are configured in.
    pub fn seconds(&self) -> f64 {
        self.mjd * SECONDS_PER_DAY
    }

    fn power_demod(
        pol: &str,
        fields: &Map<String, Value>,
    ) -> Result<PowerDemodReadings, PacketError> {
        let mut values = [0.0; 8];
        let mut missing = Vec::new();
        for (slot, plot) in values.iter_mut().zip(Plot::POWER_DEMOD) {
            match fields.get(plot.field()).and_then(Value::as_f64) {
                Some(v) => *slot = v,
                None => missing.push(plot.field()),
            }
        }
        if missing.is_empty() {
            Ok(PowerDemodReadings(values))
        } else {
            Err(PacketError::IncompletePowerDemod {
                pol: pol.to_string(),
                missing,
            })
        }
    }
}
