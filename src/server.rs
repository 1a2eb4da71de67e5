//! Web server module for envprobe.
//!
//! Provides the admin HTTP API: trigger a reachability probe, read cached
//! infrastructure metadata, and a liveness endpoint. Authorization is the
//! host deployment's concern (reverse proxy / gateway); this service performs
//! no authentication itself.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::infra::InfrastructureInfo;
use crate::probe::{ProbeConfig, ProbeResult, ProbeRunner, ProbeTarget, TargetError};

/// Placeholder when the check produced no packet-transmission line.
const NO_STATISTICS: &str = "No statistics available";

/// Placeholder when the check produced no round-trip line.
const NO_RTT: &str = "No RTT data";

/// Shared application state.
pub struct AppState {
    pub runner: ProbeRunner,
    pub probe_defaults: ProbeConfig,
    pub infrastructure: Option<InfrastructureInfo>,
}

/// Request-level API errors. Probe failures are not errors - they come back
/// as a 200 with `success: false`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Neither an explicit target nor metadata fallback was available.
    #[error("No target IP provided and no infrastructure info available")]
    MissingTarget,

    /// The supplied target failed construction.
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] TargetError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingTarget | ApiError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
        };
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// Body of a validation request.
#[derive(Debug, Default, Deserialize)]
pub struct ValidateRequest {
    /// Explicit probe target; falls back to infrastructure metadata when
    /// absent or empty.
    #[serde(default)]
    pub target_ip: Option<String>,
}

/// Diagnostic details attached to a validation response.
#[derive(Debug, Serialize)]
struct ValidateDetails {
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rtt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_code: Option<i32>,
}

/// Validation response wire shape.
#[derive(Debug, Serialize)]
struct ValidateResponse {
    success: bool,
    target_ip: String,
    message: String,
    details: ValidateDetails,
}

impl From<ProbeResult> for ValidateResponse {
    fn from(result: ProbeResult) -> Self {
        let details = if result.success {
            ValidateDetails {
                target: result.target.clone(),
                statistics: Some(
                    result
                        .packet_summary
                        .unwrap_or_else(|| NO_STATISTICS.to_string()),
                ),
                rtt: Some(result.rtt_summary.unwrap_or_else(|| NO_RTT.to_string())),
                raw_output: result.raw_output,
                error: None,
                return_code: None,
            }
        } else {
            ValidateDetails {
                target: result.target.clone(),
                statistics: None,
                rtt: None,
                raw_output: None,
                error: result.error_detail,
                return_code: result.exit_code,
            }
        };

        Self {
            success: result.success,
            target_ip: result.target,
            message: result.message,
            details,
        }
    }
}

/// Infrastructure info response.
#[derive(Serialize)]
struct InfoResponse {
    infrastructure: Value,
    service_version: &'static str,
    generated_at: DateTime<Utc>,
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let app_state = Arc::new(state);

    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/api/validate", post(validate_handler))
        .route("/api/info", get(info_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Liveness probe.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Run a reachability probe against the requested or fallback target.
async fn validate_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let explicit = request
        .target_ip
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let host = explicit
        .or_else(|| {
            state
                .infrastructure
                .as_ref()
                .and_then(|info| info.fallback_target())
                .filter(|s| !s.is_empty())
        })
        .ok_or(ApiError::MissingTarget)?;

    let target = ProbeTarget::new(host)?;

    tracing::info!(target = %target, "Running reachability probe");
    let result = state.runner.probe(&target, &state.probe_defaults).await;
    tracing::info!(target = %target, success = result.success, "Probe finished");

    Ok(Json(ValidateResponse::from(result)))
}

/// Return cached infrastructure metadata.
async fn info_handler(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let infrastructure = state
        .infrastructure
        .as_ref()
        .map(|info| info.as_value().clone())
        .unwrap_or(Value::Null);

    Json(InfoResponse {
        infrastructure,
        service_version: env!("CARGO_PKG_VERSION"),
        generated_at: Utc::now(),
    })
}
