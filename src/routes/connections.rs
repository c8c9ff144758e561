//! Connection lifecycle routes
//!
//! - `POST /api/testConnection` - open a session
//! - `DELETE /api/connections/{id}` - close it

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::warn;

use crate::routes::response::{error_response, json_response};
use crate::server::AppState;
use crate::session::ConnectParams;
use crate::types::GatewayError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OpenResponse {
    success: bool,
    message: &'static str,
    connection_id: String,
}

#[derive(Serialize)]
struct CloseResponse {
    success: bool,
    message: &'static str,
}

/// Open a session from a JSON body of connection parameters
pub async fn handle_open(state: &AppState, body: &[u8]) -> Response<Full<Bytes>> {
    let params: ConnectParams = match serde_json::from_slice(body) {
        Ok(params) => params,
        Err(e) => {
            warn!("Connect request body rejected: {}", e);
            return error_response(
                "Connection failed",
                &GatewayError::Connect(format!("Invalid request body: {}", e)),
            );
        }
    };

    match state.registry.open(params).await {
        Ok(connection_id) => json_response(
            StatusCode::OK,
            &OpenResponse {
                success: true,
                message: "Connection successful",
                connection_id,
            },
        ),
        Err(e) => error_response("Connection failed", &e),
    }
}

/// Close the session `id`
pub async fn handle_close(state: &AppState, id: &str) -> Response<Full<Bytes>> {
    match state.registry.close(id).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &CloseResponse {
                success: true,
                message: "Connection closed successfully",
            },
        ),
        Err(e) => error_response("Failed to close connection", &e),
    }
}
