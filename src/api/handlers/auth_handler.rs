//! Authentication handlers.

use axum::{extract::State, routing::get, routing::post, Extension, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::Session;
use crate::errors::AppResult;
use crate::services::TokenResponse;
use crate::types::ApiResponse;

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Authentication routes that need a session
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/session", get(current_session))
}

/// Login and get a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many login attempts")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.email.trim().to_lowercase(), payload.password)
        .await?;

    Ok(ApiResponse::success(token))
}

/// Claims of the current session
#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current session", body = Session),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn current_session(Extension(session): Extension<Session>) -> ApiResponse<Session> {
    ApiResponse::success(session)
}
