//! Health and version endpoints
//!
//! `/health` answers 200 whenever the process is up. `configured` tells
//! operators whether judgments can succeed at all.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::json_response;
use crate::server::AppState;

/// Liveness response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    /// 'online' with a model credential, 'degraded' without
    pub status: &'static str,
    pub version: &'static str,
    /// Seconds since the server started
    pub uptime: u64,
    pub timestamp: String,
    /// Whether a model credential is configured
    pub configured: bool,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Build-time version details
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    let configured = state.judge.is_configured();

    HealthResponse {
        healthy: true,
        status: if configured { "online" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        configured,
        provider: state.args.provider.to_string(),
        model: state.judge.model_id().map(str::to_string),
    }
}

/// Liveness probe
pub fn health_check(state: &AppState) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &build_health_response(state))
}

/// Version info for deployment verification
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "gauntlet-server",
    };

    json_response(StatusCode::OK, &response)
}
