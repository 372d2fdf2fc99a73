// Errors surfaced to callers of the monitor
use crate::application::bus::BusError;
use crate::domain::selection::SelectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Transport(#[from] BusError),
    #[error("unknown polarimeter '{0}'")]
    UnknownPolarimeter(String),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("monitor is not running")]
    Stopped,
}
