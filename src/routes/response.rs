//! JSON response helpers shared by every route

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

use crate::types::GatewayError;

/// Body returned whenever a session id does not resolve
pub const SESSION_NOT_FOUND: &str = "Connection not found";

/// Serialize `body` as JSON with CORS headers
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let (status, json) = match serde_json::to_vec(body) {
        Ok(json) => (status, json),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"success":false,"message":"Internal serialization error"}"#.to_vec(),
            )
        }
    };

    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// Failure body: `{success: false, message, error}`, or the fixed
/// not-found body when the session is unknown
pub fn error_response(message: &str, err: &GatewayError) -> Response<Full<Bytes>> {
    if err.is_not_found() {
        return session_not_found();
    }

    json_response(
        err.status_code(),
        &serde_json::json!({
            "success": false,
            "message": message,
            "error": err.detail(),
        }),
    )
}

pub fn session_not_found() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "success": false,
            "message": SESSION_NOT_FOUND,
        }),
    )
}

/// CORS preflight response
pub fn preflight_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    response
}

/// Unknown route
pub fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "success": false,
            "message": "Not Found",
            "path": path,
        }),
    )
}

/// Bad request response
pub fn bad_request_response(message: &str) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::BAD_REQUEST,
        &serde_json::json!({
            "success": false,
            "message": "Bad Request",
            "error": message,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error_uses_fixed_body() {
        let response = error_response(
            "Failed to retrieve collections",
            &GatewayError::SessionNotFound("abc".into()),
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[test]
    fn test_query_error_status() {
        let response = error_response(
            "Failed to retrieve collections",
            &GatewayError::Query("connection closed".into()),
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_preflight_allows_delete() {
        let response = preflight_response();
        assert_eq!(response.status(), StatusCode::OK);
        let methods = response.headers().get("Access-Control-Allow-Methods").unwrap();
        assert!(methods.to_str().unwrap().contains("DELETE"));
    }
}
