use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Longest upstream body we keep in logs or error messages.
pub const MAX_BODY_CHARS: usize = 2000;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    /// A required credential or URL is missing. The detail is only logged.
    #[error("{0} is not configured")]
    Configuration(&'static str),

    #[error("upstream provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("unexpected upstream response: {0}")]
    UpstreamProtocol(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// The auth service or data store rejected the call.
    #[error("{message}")]
    Delegate { status: u16, message: String },
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl GatewayError {
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "invalid_request",
            GatewayError::Configuration(_) => "server_misconfigured",
            GatewayError::Upstream { .. } | GatewayError::UpstreamUnavailable(_) => "bad_gateway",
            GatewayError::UpstreamProtocol(_) => "internal_error",
            GatewayError::Unauthorized(_) => "unauthorized",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::Delegate { status, .. } if (400..500).contains(status) => {
                "request_rejected"
            }
            GatewayError::Delegate { .. } => "bad_gateway",
        }
    }

    /// The message the caller sees. Configuration and protocol failures stay generic.
    fn public_message(&self) -> String {
        match self {
            GatewayError::Configuration(_) => "internal error, server misconfigured".to_string(),
            GatewayError::UpstreamProtocol(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Configuration(_) | GatewayError::UpstreamProtocol(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Upstream { .. } | GatewayError::UpstreamUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Delegate { status, .. } => match StatusCode::from_u16(*status) {
                Ok(code) if code.is_client_error() => code,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.code(),
            message: self.public_message(),
        })
    }
}

/// Cuts `text` down to `MAX_BODY_CHARS` characters.
pub fn truncate_body(text: &str) -> String {
    match text.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
