//! Procurement handlers.

use axum::{
    extract::{Extension, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::extractors::ValidatedQuery;
use crate::api::AppState;
use crate::domain::{ProcurementView, Session};
use crate::errors::AppResult;
use crate::types::ApiResponse;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProcurementQuery {
    /// Show COMPLETED requests instead of active ones
    pub archived: Option<bool>,
}

pub fn procurement_routes() -> Router<AppState> {
    Router::new().route("/", get(list_procurement))
}

/// Procurement requests with license and people resolved
#[utoipa::path(
    get,
    path = "/api/procurement",
    tag = "Procurement",
    security(("bearer_auth" = [])),
    params(ProcurementQuery),
    responses(
        (status = 200, description = "Procurement requests", body = Vec<ProcurementView>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_procurement(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ProcurementQuery>,
) -> AppResult<ApiResponse<Vec<ProcurementView>>> {
    let requests = state
        .procurement_service
        .list(&session, query.archived.unwrap_or(false))
        .await?;
    Ok(ApiResponse::success(requests))
}
