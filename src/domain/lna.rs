// LNA stage domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the eight bias-monitoring points of a polarimeter channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LnaStage {
    Hk0,
    Hk1,
    Hk2,
    Hk3,
    Hk4,
    Hk5,
    Hk4a,
    Hk5a,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown LNA stage '{0}'")]
pub struct UnknownStage(pub String);

impl LnaStage {
    /// Stages in the order the board reports them.
    pub const ALL: [LnaStage; 8] = [
        LnaStage::Hk0,
        LnaStage::Hk1,
        LnaStage::Hk2,
        LnaStage::Hk3,
        LnaStage::Hk4,
        LnaStage::Hk5,
        LnaStage::Hk4a,
        LnaStage::Hk5a,
    ];

    /// Canonical identifier, used in series names ("hk4a").
    pub fn id(self) -> &'static str {
        match self {
            LnaStage::Hk0 => "hk0",
            LnaStage::Hk1 => "hk1",
            LnaStage::Hk2 => "hk2",
            LnaStage::Hk3 => "hk3",
            LnaStage::Hk4 => "hk4",
            LnaStage::Hk5 => "hk5",
            LnaStage::Hk4a => "hk4a",
            LnaStage::Hk5a => "hk5a",
        }
    }

    /// Tag used inside housekeeping field names, e.g. the "4A" in `VD4A_HK`.
    pub fn field_tag(self) -> &'static str {
        match self {
            LnaStage::Hk0 => "0",
            LnaStage::Hk1 => "1",
            LnaStage::Hk2 => "2",
            LnaStage::Hk3 => "3",
            LnaStage::Hk4 => "4",
            LnaStage::Hk5 => "5",
            LnaStage::Hk4a => "4A",
            LnaStage::Hk5a => "5A",
        }
    }
}

impl fmt::Display for LnaStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for LnaStage {
    type Err = UnknownStage;

    /// Accepts both the canonical id ("hk4a") and the bare tag ("4a", "4A").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let tag = lower.strip_prefix("hk").unwrap_or(&lower);
        LnaStage::ALL
            .into_iter()
            .find(|stage| stage.field_tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}
