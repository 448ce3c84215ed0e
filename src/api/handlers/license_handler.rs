//! License management handlers.

use axum::{
    extract::{Extension, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::api::AppState;
use crate::domain::{ActivityEntry, KeyStatus, LicenseDetail, LicenseKey, LicenseSeats, Session};
use crate::errors::AppResult;
use crate::services::{AddKeyInput, UpdateKeyStatusInput};
use crate::types::{ApiResponse, Created, NoContent, PaginationParams};

/// Password step-up request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyAccessRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Outcome of a password step-up
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyAccessResponse {
    pub success: bool,
}

/// New key for a license
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddKeyRequest {
    #[validate(length(min = 1, max = 512, message = "Key must be 1 to 512 characters"))]
    #[schema(example = "XXXX-YYYY-ZZZZ")]
    pub key: String,
    /// Defaults to AVAILABLE
    pub status: Option<KeyStatus>,
    pub assigned_to: Option<Uuid>,
}

/// Key status transition
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateKeyStatusRequest {
    pub status: KeyStatus,
    /// Required when moving to ASSIGNED
    pub assigned_to: Option<Uuid>,
}

/// Create license management routes
pub fn license_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_licenses))
        .route("/drop-downs", get(license_dropdowns))
        .route("/verify-access", post(verify_access))
        .route("/:id", get(get_license))
        .route("/:id/keys", post(add_key))
        .route("/:id/keys/:key_id", delete(remove_key))
        .route("/:id/keys/:key_id/status", patch(update_key_status))
}

/// Create license activity log routes
pub fn license_log_routes() -> Router<AppState> {
    Router::new().route("/:id", get(read_license_logs))
}

/// Paginated license list with seat counts
#[utoipa::path(
    get,
    path = "/api/license-management",
    tag = "Licenses",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of licenses", body = Vec<LicenseSeats>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_licenses(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<ApiResponse<Vec<LicenseSeats>>> {
    let page = state.license_service.list_licenses(&session, params).await?;
    Ok(ApiResponse::paginated(page))
}

/// Every license with its available seats
#[utoipa::path(
    get,
    path = "/api/license-management/drop-downs",
    tag = "Licenses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "License dropdown", body = Vec<LicenseSeats>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn license_dropdowns(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<LicenseSeats>>> {
    let licenses = state.license_service.dropdowns(&session).await?;
    Ok(ApiResponse::success(licenses))
}

/// Re-check the caller's password before revealing keys
#[utoipa::path(
    post,
    path = "/api/license-management/verify-access",
    tag = "Licenses",
    security(("bearer_auth" = [])),
    request_body = VerifyAccessRequest,
    responses(
        (status = 200, description = "`success` tells whether the password matched", body = VerifyAccessResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn verify_access(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyAccessRequest>,
) -> AppResult<Json<VerifyAccessResponse>> {
    let success = state
        .auth_service
        .verify_password(&session, payload.password)
        .await?;
    Ok(Json(VerifyAccessResponse { success }))
}

/// License detail with keys
#[utoipa::path(
    get,
    path = "/api/license-management/{id}",
    tag = "Licenses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "License ID")),
    responses(
        (status = 200, description = "License detail", body = LicenseDetail),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "License not found")
    )
)]
pub async fn get_license(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<ApiResponse<LicenseDetail>> {
    let license = state.license_service.get_license(&session, id).await?;
    Ok(ApiResponse::success(license))
}

/// Add a key to a license
#[utoipa::path(
    post,
    path = "/api/license-management/{id}/keys",
    tag = "Licenses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "License ID")),
    request_body = AddKeyRequest,
    responses(
        (status = 201, description = "Key added", body = LicenseKey),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "License not found"),
        (status = 409, description = "Duplicate key or no free seat")
    )
)]
pub async fn add_key(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddKeyRequest>,
) -> AppResult<Created<LicenseKey>> {
    let input = AddKeyInput {
        key: payload.key,
        status: payload.status,
        assigned_to: payload.assigned_to,
    };
    let key = state.license_service.add_key(&session, id, input).await?;
    Ok(Created(key))
}

/// Remove a key from a license
#[utoipa::path(
    delete,
    path = "/api/license-management/{id}/keys/{key_id}",
    tag = "Licenses",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "License ID"),
        ("key_id" = Uuid, Path, description = "Key ID")
    ),
    responses(
        (status = 204, description = "Key removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Key not found")
    )
)]
pub async fn remove_key(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedPath((id, key_id)): ValidatedPath<(Uuid, Uuid)>,
) -> AppResult<NoContent> {
    state.license_service.remove_key(&session, id, key_id).await?;
    Ok(NoContent)
}

/// Change a key's status
#[utoipa::path(
    patch,
    path = "/api/license-management/{id}/keys/{key_id}/status",
    tag = "Licenses",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "License ID"),
        ("key_id" = Uuid, Path, description = "Key ID")
    ),
    request_body = UpdateKeyStatusRequest,
    responses(
        (status = 200, description = "Key updated", body = LicenseKey),
        (status = 400, description = "Invalid transition"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Key not found"),
        (status = 409, description = "No free seat")
    )
)]
pub async fn update_key_status(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedPath((id, key_id)): ValidatedPath<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<UpdateKeyStatusRequest>,
) -> AppResult<ApiResponse<LicenseKey>> {
    let input = UpdateKeyStatusInput {
        status: payload.status,
        assigned_to: payload.assigned_to,
    };
    let key = state
        .license_service
        .update_key_status(&session, id, key_id, input)
        .await?;
    Ok(ApiResponse::success(key))
}

/// Activity log for one license, newest first
#[utoipa::path(
    get,
    path = "/api/license-logs/{id}",
    tag = "Licenses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "License ID")),
    responses(
        (status = 200, description = "Activity entries", body = Vec<ActivityEntry>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn read_license_logs(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<ApiResponse<Vec<ActivityEntry>>> {
    let entries = state.license_service.read_logs(&session, id).await?;
    Ok(ApiResponse::success(entries))
}
