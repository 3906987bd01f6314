//! `{code, data | message}` response envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::error::EvolutionError;
use crate::rpc::RpcError;

/// Envelope code of a successful response.
pub const CODE_OK: i32 = 0;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Successful envelope around `data`.
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        code: CODE_OK,
        data: Some(data),
        message: None,
    })
}

/// Failed request; the envelope code mirrors the HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<EvolutionError> for ApiError {
    fn from(e: EvolutionError) -> Self {
        let status = match &e {
            EvolutionError::NotFound { .. } => StatusCode::NOT_FOUND,
            EvolutionError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            EvolutionError::Rpc(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", e.format_detailed());
        }
        Self::new(status, e.to_string())
    }
}

impl From<RpcError> for ApiError {
    fn from(e: RpcError) -> Self {
        EvolutionError::from(e).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()> {
            code: i32::from(self.status.as_u16()),
            data: None,
            message: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Handler result.
pub type ApiResult<T> = std::result::Result<Json<Envelope<T>>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_has_no_message() {
        let Json(body) = ok(vec![1, 2]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"code": 0, "data": [1, 2]}));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from(EvolutionError::NotFound {
            entity: "user",
            id: 9,
        });
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(err.message.contains('9'));
    }

    #[test]
    fn test_rpc_error_maps_to_bad_gateway() {
        let err = ApiError::from(RpcError::Remote("down".to_string()));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }
}
