//! API error responses
//!
//! Every error is returned as `{"detail": message}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<pdyn_common::Error> for ApiError {
    fn from(err: pdyn_common::Error) -> Self {
        match err {
            pdyn_common::Error::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            pdyn_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

/// Parse a project id path segment
pub fn parse_project_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid project id: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_id() {
        assert_eq!(parse_project_id("42").unwrap(), 42);
        assert!(matches!(parse_project_id("abc"), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_project_id(""), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_common_error_mapping() {
        let not_found: ApiError = pdyn_common::Error::NotFound("Project 1".into()).into();
        assert!(matches!(not_found, ApiError::NotFound(_)));

        let config: ApiError = pdyn_common::Error::Config("bad".into()).into();
        assert_eq!(config.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
