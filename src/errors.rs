use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::models::ProviderId;

/// Failure of a single provider-native listing call.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request to {provider} failed: {message}")]
    Transport { provider: ProviderId, message: String },

    #[error("{provider} rejected the credentials (HTTP {status})")]
    Unauthorized { provider: ProviderId, status: u16 },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: ProviderId,
        status: u16,
        body: String,
    },

    #[error("could not parse {provider} model list: {message}")]
    Parse { provider: ProviderId, message: String },

    #[error("{provider} model listing is not available on this deployment")]
    UnsupportedEndpoint { provider: ProviderId },

    #[error("{option} is required to list {provider} models")]
    MissingOption {
        provider: ProviderId,
        option: &'static str,
    },
}

impl FetchError {
    /// Expected on some deployments; not worth a warning.
    pub fn is_expected(&self) -> bool {
        matches!(self, FetchError::UnsupportedEndpoint { .. })
    }
}

/// Resolution-level taxonomy. Every variant except `UnknownProvider` is
/// recoverable: the service degrades to the next tier and reports it in-band.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("an API key is required to list {0} models; showing built-in defaults")]
    CredentialMissing(ProviderId),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    UnsupportedEndpoint(String),

    #[error("{tier} tier returned no models for {provider}")]
    EmptyResult {
        provider: ProviderId,
        tier: &'static str,
    },

    #[error("universal model catalog has not been loaded")]
    CatalogUnavailable,

    #[error("unknown provider '{0}'")]
    UnknownProvider(String),
}

impl From<FetchError> for CatalogError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::UnsupportedEndpoint { .. } => CatalogError::UnsupportedEndpoint(e.to_string()),
            other => CatalogError::Transport(other.to_string()),
        }
    }
}

/// Errors surfaced by the HTTP API. Resolution degradation is never one of
/// these; it travels inside the response body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "bad_request",
                msg.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}
