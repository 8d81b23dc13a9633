//! Relay request/response/error types shared across handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use fable_ai::ChatMessage;
use fable_dialogue::RelayError;

/// Error payload rendered as `{"error": {"type", "code", "message"}}`.
#[derive(Debug)]
pub(crate) struct RelayApiError {
    pub(crate) status: StatusCode,
    pub(crate) code: &'static str,
    pub(crate) message: String,
}

impl RelayApiError {
    pub(crate) fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub(crate) fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// Maps relay failures onto caller-visible statuses: transient
    /// exhaustion is a 502, a fatal upstream rejection passes the upstream
    /// status through.
    pub(crate) fn from_relay(error: RelayError) -> Self {
        match &error {
            RelayError::UpstreamUnavailable { .. } => Self::new(
                StatusCode::BAD_GATEWAY,
                "upstream_unavailable",
                error.to_string(),
            ),
            RelayError::UpstreamRejected { status, .. } => Self::new(
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "upstream_rejected",
                error.to_string(),
            ),
        }
    }
}

impl IntoResponse for RelayApiError {
    fn into_response(self) -> Response {
        let error_type = if self.status.is_client_error() {
            "invalid_request_error"
        } else {
            "server_error"
        };
        (
            self.status,
            Json(json!({
                "error": {
                    "type": error_type,
                    "code": self.code,
                    "message": self.message,
                }
            })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
/// Body of `POST /chat`.
pub(crate) struct ChatRequestBody {
    pub(crate) messages: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Deserialize)]
/// Body of `POST /summarize`. The front-end sends camelCase.
pub(crate) struct SummarizeRequestBody {
    pub(crate) messages: Option<Vec<ChatMessage>>,
    #[serde(rename = "existingSummary")]
    pub(crate) existing_summary: Option<String>,
}

pub(crate) fn parse_json_body<T: serde::de::DeserializeOwned>(
    body: &[u8],
) -> Result<T, RelayApiError> {
    serde_json::from_slice(body).map_err(|error| {
        RelayApiError::bad_request("invalid_json", format!("request body is not valid: {error}"))
    })
}
