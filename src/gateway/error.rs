use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upstream::UpstreamError;
use crate::upstream::types::ErrorEnvelope;

pub const MISSING_KEY: &str = "API key is required";
pub const MISSING_PROMPT: &str = "Prompt is required";
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Wire shape of every gateway error: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("API key is required")]
    MissingApiKey,
    #[error("Prompt is required")]
    MissingPrompt,
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingApiKey
            | GatewayError::MissingPrompt
            | GatewayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream { status, .. } => *status,
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        let (status, envelope_message) = match &err {
            UpstreamError::Api { status, detail } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                ErrorEnvelope::message_from(detail),
            ),
            UpstreamError::InvalidKey => (StatusCode::BAD_REQUEST, None),
            UpstreamError::Http(_) | UpstreamError::Json(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let message = normalize_error_message(envelope_message, Some(err.to_string()));
        GatewayError::Upstream { status, message }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Ranked fallback: upstream envelope message, then the transport error's
/// own message, then a generic string.
pub fn normalize_error_message(
    envelope_message: Option<String>,
    transport_message: Option<String>,
) -> String {
    [envelope_message, transport_message]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_message_is_preferred() {
        let msg = normalize_error_message(Some("rate limited".into()), Some("transport".into()));
        assert_eq!(msg, "rate limited");
    }

    #[test]
    fn transport_message_is_second() {
        let msg = normalize_error_message(None, Some("connection refused".into()));
        assert_eq!(msg, "connection refused");
    }

    #[test]
    fn generic_message_is_last() {
        assert_eq!(normalize_error_message(None, None), UNKNOWN_ERROR);
        assert_eq!(normalize_error_message(Some(" ".into()), Some(String::new())), UNKNOWN_ERROR);
    }

    #[test]
    fn api_error_keeps_upstream_status_and_message() {
        let err = GatewayError::from(UpstreamError::Api {
            status: 429,
            detail: r#"{"type":"error","error":{"type":"rate_limit_error","message":"rate limited"}}"#
                .into(),
        });
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.to_string(), "rate limited");
    }

    #[test]
    fn api_error_without_envelope_uses_status_text() {
        let err = GatewayError::from(UpstreamError::Api {
            status: 502,
            detail: "<html>bad gateway</html>".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Request failed with status code 502");
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(GatewayError::MissingApiKey.status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::MissingApiKey.to_string(), MISSING_KEY);
        assert_eq!(GatewayError::MissingPrompt.status(), StatusCode::BAD_REQUEST);
    }
}
