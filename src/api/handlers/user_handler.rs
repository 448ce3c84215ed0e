//! User management and directory handlers.

use axum::{
    extract::{Extension, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::extractors::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::api::AppState;
use crate::domain::{Department, DirectoryEntry, Role, Session, UserResponse};
use crate::errors::AppResult;
use crate::services::CreateUserInput;
use crate::types::{ApiResponse, Created, PaginationParams};

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message("Name must not be blank".into()))
    } else {
        Ok(())
    }
}

/// User creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1 to 100 characters"),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Grace Hopper")]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "grace@example.com")]
    pub email: String,
    pub department: Department,
    pub role: Role,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// Existing user who manages the new account
    pub manager_id: Option<Uuid>,
}

impl From<CreateUserRequest> for CreateUserInput {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_lowercase(),
            department: req.department,
            role: req.role,
            password: req.password,
            manager_id: req.manager_id,
        }
    }
}

/// Directory dropdown query
#[derive(Debug, Deserialize, IntoParams)]
pub struct DirectoryQuery {
    /// Case-insensitive match on name or email
    pub search: Option<String>,
}

/// Create user management routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/drop-downs", get(directory_dropdown))
        .route("/managers", get(list_managers))
        .route("/:id", get(get_user))
}

/// Paginated user list (ITSG only)
#[utoipa::path(
    get,
    path = "/api/user-management",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - ITSG only")
    )
)]
pub async fn list_users(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let page = state.user_service.list_users(&session, params).await?;
    Ok(ApiResponse::paginated(page))
}

/// Create a user (ITSG only)
#[utoipa::path(
    post,
    path = "/api/user-management",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - ITSG only"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_user(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state
        .user_service
        .create_user(&session, payload.into())
        .await?;
    Ok(Created(user))
}

/// Directory search scoped to the caller's department (unrestricted for ITSG)
#[utoipa::path(
    get,
    path = "/api/user-management/drop-downs",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(DirectoryQuery),
    responses(
        (status = 200, description = "Matching users", body = Vec<DirectoryEntry>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn directory_dropdown(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DirectoryQuery>,
) -> AppResult<ApiResponse<Vec<DirectoryEntry>>> {
    let entries = state
        .user_service
        .search_directory(&session, query.search)
        .await?;
    Ok(ApiResponse::success(entries))
}

/// Managers visible to the caller
#[utoipa::path(
    get,
    path = "/api/user-management/managers",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Managers", body = Vec<DirectoryEntry>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_managers(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<DirectoryEntry>>> {
    let managers = state.user_service.list_managers(&session).await?;
    Ok(ApiResponse::success(managers))
}

/// User detail (own record, or ITSG)
#[utoipa::path(
    get,
    path = "/api/user-management/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User with manager and added-by", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get_user(&session, id).await?;
    Ok(ApiResponse::success(user))
}
