// User selection events
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Check state reported by a tri-state channel checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Unchecked,
    PartiallyChecked,
    Checked,
}

/// An actionable selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("partially checked state carries no selection change")]
    PartiallyChecked,
    #[error("invalid check state code {0}")]
    InvalidCode(u8),
}

impl TryFrom<u8> for CheckState {
    type Error = SelectionError;

    /// Widget toolkits report 0 (unchecked), 1 (partial) and 2 (checked).
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CheckState::Unchecked),
            1 => Ok(CheckState::PartiallyChecked),
            2 => Ok(CheckState::Checked),
            other => Err(SelectionError::InvalidCode(other)),
        }
    }
}

impl TryFrom<CheckState> for Toggle {
    type Error = SelectionError;

    fn try_from(state: CheckState) -> Result<Self, Self::Error> {
        match state {
            CheckState::Checked => Ok(Toggle::On),
            CheckState::Unchecked => Ok(Toggle::Off),
            CheckState::PartiallyChecked => Err(SelectionError::PartiallyChecked),
        }
    }
}

impl From<bool> for Toggle {
    fn from(enabled: bool) -> Self {
        if enabled { Toggle::On } else { Toggle::Off }
    }
}

/// Whether a selection change altered any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Applied,
    Unchanged,
}

impl From<bool> for ToggleOutcome {
    fn from(changed: bool) -> Self {
        if changed {
            ToggleOutcome::Applied
        } else {
            ToggleOutcome::Unchanged
        }
    }
}
