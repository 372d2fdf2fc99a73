// HTTP request handlers
use crate::application::error::MonitorError;
use crate::application::monitor_service::MonitorSnapshot;
use crate::domain::lna::LnaStage;
use crate::domain::selection::{CheckState, ToggleOutcome};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct PolarimeterRequest {
    pub state: CheckState,
}

#[derive(Deserialize)]
pub struct LnaRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub outcome: ToggleOutcome,
}

#[derive(Debug, Serialize)]
pub struct BoardView {
    pub name: String,
    pub pols: Vec<String>,
}

/// Error body returned with every non-2xx status
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
}

impl ApiError {
    fn new(status: StatusCode, error: impl ToString) -> Self {
        Self {
            status,
            error: error.to_string(),
        }
    }
}

impl From<MonitorError> for ApiError {
    fn from(e: MonitorError) -> Self {
        let status = match &e {
            MonitorError::UnknownPolarimeter(_) => StatusCode::NOT_FOUND,
            MonitorError::Selection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MonitorError::Transport(_) => StatusCode::BAD_GATEWAY,
            MonitorError::Stopped => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            tracing::error!(error = %e, "request failed");
        }
        Self::new(status, e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current selections, series and window averages
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MonitorSnapshot>, ApiError> {
    Ok(Json(state.monitor.snapshot().await?))
}

/// Boards and the channels they expose
pub async fn get_topology(State(state): State<Arc<AppState>>) -> Json<Vec<BoardView>> {
    let boards = state
        .topology
        .boards
        .iter()
        .map(|b| BoardView {
            name: b.name.clone(),
            pols: b.pols.clone(),
        })
        .collect();
    Json(boards)
}

/// Apply a channel checkbox change
pub async fn set_polarimeter(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<PolarimeterRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let outcome = state.monitor.set_polarimeter(&name, request.state).await?;
    Ok(Json(ToggleResponse { outcome }))
}

/// Apply an LNA stage checkbox change
pub async fn set_lna(
    Path(stage): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<LnaRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let stage: LnaStage = stage
        .parse()
        .map_err(|e| ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e))?;
    let outcome = state.monitor.set_lna(stage, request.enabled).await?;
    Ok(Json(ToggleResponse { outcome }))
}
