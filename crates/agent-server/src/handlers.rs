//! HTTP Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;

use trip_planner::{PlannerError, TripRequest, TripResponse};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
    pub docs_url: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub model_connected: bool,
}

type ApiError = (StatusCode, Json<TripResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(TripResponse::failure(message)))
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the trip planner API",
        docs_url: "/api/v1/health",
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        model_connected,
    })
}

/// Generate a trip plan
///
/// Missing credentials are reported before the body is looked at; a body
/// that does not parse is answered in the same error envelope.
pub async fn plan_trip(
    State(state): State<AppState>,
    payload: Result<Json<TripRequest>, JsonRejection>,
) -> Result<Json<TripResponse>, ApiError> {
    let missing = state.config.missing_credentials();
    let planner = match &state.planner {
        Some(planner) if missing.is_empty() => planner.clone(),
        _ => {
            let err = PlannerError::MissingCredentials(missing);
            tracing::error!("{}", err);
            return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()));
        }
    };

    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected plan-trip body");
        api_error(rejection.status(), rejection.body_text())
    })?;

    if let Err(e) = request.validate() {
        return Err(api_error(StatusCode::BAD_REQUEST, e.to_string()));
    }

    match planner.run(&request).await {
        Ok(output) => Ok(Json(TripResponse::success(output.raw))),
        Err(e) if e.is_rejection() => Err(api_error(StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => {
            tracing::error!(error = %e, "Trip planning failed");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate trip plan: {}", e),
            ))
        }
    }
}
