//! Gateway error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Gateway error type
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    // Routing errors
    #[error("Malformed host header")]
    MalformedHost,
    #[error("No tenant found for {0}")]
    UnresolvedTenant(String),

    // Collaborator errors
    #[error("Tenant directory unavailable")]
    DirectoryUnavailable,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            GatewayError::MalformedHost => {
                (StatusCode::BAD_REQUEST, "MALFORMED_HOST", self.to_string())
            }
            GatewayError::UnresolvedTenant(_) => {
                (StatusCode::NOT_FOUND, "TENANT_NOT_FOUND", self.to_string())
            }
            GatewayError::DirectoryUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "DIRECTORY_UNAVAILABLE",
                self.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type alias for gateway handlers
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::MalformedHost.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::UnresolvedTenant("nope.example.com".into())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::DirectoryUnavailable.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
