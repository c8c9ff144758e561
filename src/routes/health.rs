//! Health check endpoints
//!
//! - `/` - bare liveness ping kept for existing clients (`{"test":"ok"}`)
//! - `/health` - liveness with session count and uptime
//! - `/version` - build information stamped by `build.rs`

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::response::json_response;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    /// Seconds since the server state was created
    pub uptime: u64,
    /// Sessions currently registered
    pub sessions: usize,
    /// Creation time of the longest-lived open session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_session: Option<String>,
    pub timestamp: String,
}

/// Handle `/`
pub fn root_ping() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({ "test": "ok" }))
}

/// Handle liveness probe (/health)
pub fn health_check(state: &AppState) -> Response<Full<Bytes>> {
    let response = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        sessions: state.registry.len(),
        oldest_session: state
            .registry
            .oldest_created_at()
            .map(|at| at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    json_response(StatusCode::OK, &response)
}

/// Build information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    /// Short git hash, `unknown` outside a checkout
    pub commit: &'static str,
    /// RFC 3339 build time
    pub built: &'static str,
}

/// Handle `/version`
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: env!("DOCPORT_COMMIT"),
        built: env!("DOCPORT_BUILT"),
    };

    json_response(StatusCode::OK, &response)
}
