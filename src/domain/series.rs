// Plot and series domain models
use super::lna::LnaStage;
use serde::{Serialize, Serializer};
use std::fmt;

/// One physical measurement, rendered on its own plot sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Plot {
    PwrQ1,
    PwrQ2,
    PwrU1,
    PwrU2,
    DemQ1,
    DemQ2,
    DemU1,
    DemU2,
    DrainCurrent,
    GateCurrent,
    DrainVoltage,
    GateVoltage,
}

impl Plot {
    pub const ALL: [Plot; 12] = [
        Plot::PwrQ1,
        Plot::PwrQ2,
        Plot::PwrU1,
        Plot::PwrU2,
        Plot::DemQ1,
        Plot::DemQ2,
        Plot::DemU1,
        Plot::DemU2,
        Plot::DrainCurrent,
        Plot::GateCurrent,
        Plot::DrainVoltage,
        Plot::GateVoltage,
    ];

    /// Plots fed by power/demodulation packets, keyed by channel.
    pub const POWER_DEMOD: [Plot; 8] = [
        Plot::PwrQ1,
        Plot::PwrQ2,
        Plot::PwrU1,
        Plot::PwrU2,
        Plot::DemQ1,
        Plot::DemQ2,
        Plot::DemU1,
        Plot::DemU2,
    ];

    /// Plots fed by bias housekeeping, keyed by (channel, stage).
    pub const BIAS: [Plot; 4] = [
        Plot::DrainCurrent,
        Plot::GateCurrent,
        Plot::DrainVoltage,
        Plot::GateVoltage,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Plot::PwrQ1 | Plot::DemQ1 => "Q1",
            Plot::PwrQ2 | Plot::DemQ2 => "Q2",
            Plot::PwrU1 | Plot::DemU1 => "U1",
            Plot::PwrU2 | Plot::DemU2 => "U2",
            Plot::DrainCurrent => "ID",
            Plot::GateCurrent => "IG",
            Plot::DrainVoltage => "VD",
            Plot::GateVoltage => "VG",
        }
    }

    /// Name of the packet field feeding this plot. For bias plots this is the
    /// prefix the stage tag and housekeeping suffix are appended to.
    pub fn field(self) -> &'static str {
        match self {
            Plot::PwrQ1 => "PWRQ1",
            Plot::PwrQ2 => "PWRQ2",
            Plot::PwrU1 => "PWRU1",
            Plot::PwrU2 => "PWRU2",
            Plot::DemQ1 => "DEMQ1",
            Plot::DemQ2 => "DEMQ2",
            Plot::DemU1 => "DEMU1",
            Plot::DemU2 => "DEMU2",
            Plot::DrainCurrent => "ID",
            Plot::GateCurrent => "IG",
            Plot::DrainVoltage => "VD",
            Plot::GateVoltage => "VG",
        }
    }

    /// Housekeeping field carrying this bias measurement for `stage`,
    /// e.g. `VD4A_HK`.
    pub fn bias_field(self, stage: LnaStage, suffix: &str) -> String {
        format!("{}{}{}", self.field(), stage.field_tag(), suffix)
    }
}

/// Identity of one plotted line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesKey {
    /// Power/demodulation line of a channel.
    Channel(String),
    /// Bias line of one LNA stage of a channel.
    Bias { pol: String, stage: LnaStage },
}

impl SeriesKey {
    pub fn channel(pol: impl Into<String>) -> Self {
        SeriesKey::Channel(pol.into())
    }

    pub fn bias(pol: impl Into<String>, stage: LnaStage) -> Self {
        SeriesKey::Bias {
            pol: pol.into(),
            stage,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKey::Channel(pol) => f.write_str(pol),
            SeriesKey::Bias { pol, stage } => write!(f, "{}_{}", pol, stage),
        }
    }
}

impl Serialize for SeriesKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// RGB line color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
