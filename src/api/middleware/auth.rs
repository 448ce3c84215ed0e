//! Turns `Authorization: Bearer <jwt>` into a request-scoped [`Session`].
//!
//! [`Session`]: crate::domain::Session

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::errors::AppError;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_TOKEN_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

/// Every route behind this layer sees `Extension<Session>`; anything else is 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = {
        let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;
        state.auth_service.verify_token(token).map_err(|e| {
            tracing::debug!(path = %request.uri().path(), "rejected bearer token: {}", e);
            AppError::Unauthorized
        })?
    };

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
