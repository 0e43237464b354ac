//! HTTP error type for alp-api
//!
//! Every failure is rendered as `{"error": {"code": ..., "message": ...}}`.

use alp_common::api::ErrorResponse;
use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::services::llm::LlmError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or rejected bearer token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict (409) - e.g. translation already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Course references an asset code with no stored asset (422)
    #[error("Module {module_index} references unknown asset '{asset_code}'")]
    UnresolvedAssetReference {
        module_index: usize,
        asset_code: String,
    },

    /// AI client has no API key (503)
    #[error("AI service is not configured")]
    AiNotConfigured,

    /// AI upstream call failed (502)
    #[error("AI service error: {0}")]
    Upstream(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::UnresolvedAssetReference { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNRESOLVED_ASSET_REFERENCE",
            ),
            ApiError::AiNotConfigured => (StatusCode::SERVICE_UNAVAILABLE, "AI_NOT_CONFIGURED"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Client-facing message
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Upstream(msg)
            | ApiError::Internal(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(code, "{}", self);
        }

        let body = Json(ErrorResponse::new(code, self.message()));

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }
        (status, body).into_response()
    }
}

impl From<alp_common::Error> for ApiError {
    fn from(err: alp_common::Error) -> Self {
        use alp_common::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NotConfigured => ApiError::AiNotConfigured,
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

// Extractor rejections keep axum's description as the message
macro_rules! rejection_is_bad_request {
    ($($rejection:ty),+) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    ApiError::BadRequest(rejection.body_text())
                }
            }
        )+
    };
}

rejection_is_bad_request!(JsonRejection, FormRejection, QueryRejection, PathRejection);

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let (status, body) = render(ApiError::NotFound("Course abc not found".to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Course abc not found");
    }

    #[tokio::test]
    async fn test_unresolved_reference_is_unprocessable() {
        let (status, body) = render(ApiError::UnresolvedAssetReference {
            module_index: 1,
            asset_code: "X".to_string(),
        })
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNRESOLVED_ASSET_REFERENCE");
        assert_eq!(body["error"]["message"], "Module 1 references unknown asset 'X'");
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = ApiError::Unauthorized("Missing bearer token".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn test_llm_errors_map_to_gateway_statuses() {
        let (status, _) = ApiError::from(LlmError::NotConfigured).status_and_code();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = ApiError::from(LlmError::InvalidApiKey).status_and_code();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_common_errors_keep_their_meaning() {
        let err = ApiError::from(alp_common::Error::Conflict("dup".to_string()));
        assert!(matches!(err, ApiError::Conflict(_)));

        let err = ApiError::from(alp_common::Error::Internal("boom".to_string()));
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
