//! Central error type for the Fablya API
//!
//! Every handler and extractor returns `ApiError` so that failures map to a
//! structured JSON body instead of a process fault. The auth responses keep
//! the exact wording clients already match on.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// API error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing Authorization header")]
    Unauthorized,
    #[error("token or role rejected")]
    Forbidden,
    #[error("invalid object id: {0}")]
    InvalidId(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("token signing failed: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Wording matches what the frontend checks for.
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized Access".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden access".to_string()),
            ApiError::InvalidId(id) => (StatusCode::BAD_REQUEST, format!("invalid id: {id}")),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, errors.to_string()),
            ApiError::Database(err) => {
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::TokenSigning(err) => {
                tracing::error!("token signing failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_the_original_status_codes() {
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let response = ApiError::NotFound("product").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::InvalidId("xyz".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
