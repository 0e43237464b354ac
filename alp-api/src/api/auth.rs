//! Bearer token middleware
//!
//! Applied to protected routes only. The token format and verification live
//! in `alp_common::api::auth`.

use alp_common::api::{verify_authorization, ApiAuthError};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Rejects the request with 401 unless it carries a valid, unexpired bearer
/// token. No configured secret disables the check.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(secret) = state.token_secret.as_deref() else {
        return Ok(next.run(request).await);
    };

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str())
        .transpose()
        .map_err(|_| ApiError::Unauthorized("Authorization header is not valid ASCII".to_string()))?;

    match verify_authorization(header, secret) {
        Ok(claims) => {
            debug!(subject = %claims.subject, path = %request.uri().path(), "Request authenticated");
            Ok(next.run(request).await)
        }
        Err(e) => {
            if !matches!(e, ApiAuthError::MissingToken) {
                warn!(path = %request.uri().path(), "Rejected bearer token: {}", e);
            }
            Err(ApiError::Unauthorized(e.to_string()))
        }
    }
}
