//! trip-crew HTTP Server
//!
//! Axum-based server exposing the trip planner as a REST API.

mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::{get, post}, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::LlmProvider;
use agent_runtime::{GeminiConfig, GeminiProvider};
use trip_planner::PlannerConfig;

use crate::handlers::{health_check, plan_trip, root};
use crate::state::AppState;

/// Planning runs make many model calls; the route gets a generous budget
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 900;

/// Plan-route timeout from `REQUEST_TIMEOUT_SECS`; a value that is set but
/// not a positive whole number stops startup
fn request_timeout(raw: Option<String>) -> anyhow::Result<Duration> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => anyhow::bail!("REQUEST_TIMEOUT_SECS must be a positive number of seconds, got '{}'", raw),
    }
}

fn router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/api/v1/health", get(health_check))
        .route(
            "/api/v1/plan-trip",
            post(plan_trip).layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = PlannerConfig::from_env()?;
    let plan_timeout = request_timeout(std::env::var("REQUEST_TIMEOUT_SECS").ok())?;
    tracing::debug!(?config, "Planner configuration");

    // Initialize LLM provider
    let mut gemini = GeminiConfig::new(config.gemini_key());
    gemini.base_url.clone_from(&config.gemini_url);
    gemini.model.clone_from(&config.model);
    let provider = Arc::new(GeminiProvider::from_config(gemini)?);

    match provider.health_check().await {
        Ok(true) => tracing::info!(model = %config.model, "✓ Connected to Gemini"),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Gemini not reachable - planning requests will fail");
        }
    }

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        tracing::warn!("⚠ Missing API keys: {} - plan-trip is disabled", missing.join(", "));
        tracing::warn!("  Set them in .env or the environment");
    }

    let state = AppState::new(config, provider)?;

    let app = router(state, plan_timeout);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 trip-crew server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /                  - Welcome");
    tracing::info!("  GET  /api/v1/health     - Health check");
    tracing::info!("  POST /api/v1/plan-trip  - Generate a trip plan");

    axum::serve(listener, app).await?;

    Ok(())
}
