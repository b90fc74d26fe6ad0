//! API routes for the tierqa server

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AskError, StatusClass};
use crate::orchestrator::{AskResponse, Orchestrator};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Ask request
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Error body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: StatusClass,
    pub detail: String,
}

impl IntoResponse for AskError {
    fn into_response(self) -> Response {
        let class = self.class();
        let code = StatusCode::from_u16(class.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = ErrorResponse {
            status: class,
            detail: self.detail(),
        };
        (code, Json(body)).into_response()
    }
}

/// Answer a question
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AskError> {
    let Json(request) = payload.map_err(|e| AskError::InputInvalid(e.body_text()))?;
    let response = state.orchestrator.ask(&request.question).await?;
    Ok(Json(response))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.orchestrator.health().await;
    let code = StatusCode::from_u16(report.http_status_code())
        .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
    (code, Json(report))
}
