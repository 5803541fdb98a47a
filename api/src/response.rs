//! Uniform response envelope for all dashboard endpoints.
//!
//! Every endpoint returns `{ success, data?, message? }`. Store failures
//! are converted here; nothing propagates past a handler as an unhandled
//! fault.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use shared::storage::StoreError;

/// The uniform response envelope.
///
/// `data` is present when `success` is true; `message` when it is false.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request produced a usable payload.
    pub success: bool,
    /// The metric-specific payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A successful envelope around the given payload.
    pub fn ok(data: T) -> Response {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
        .into_response()
    }
}

/// Converts a store failure into the `success:false` envelope.
///
/// The caller-facing frontend treats this as its "server offline" state
/// and does not retry.
pub fn store_failure(err: &StoreError) -> Response {
    tracing::error!(%err, "store access failed");
    let body = ApiResponse::<serde_json::Value> {
        success: false,
        data: None,
        message: Some(err.to_string()),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_shape() {
        let envelope = ApiResponse {
            success: true,
            data: Some(vec![1, 2, 3]),
            message: None,
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][2], 3);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_failure_envelope_shape() {
        let envelope = ApiResponse::<()> {
            success: false,
            data: None,
            message: Some("Storage error: unreachable".to_string()),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert!(json["message"].as_str().unwrap().contains("unreachable"));
    }
}
