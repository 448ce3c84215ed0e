//! Notification handlers.

use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{ValidatedJson, ValidatedPath};
use crate::api::AppState;
use crate::domain::{NewNotification, Notification, NotificationFeed, NotificationType, Session};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created};

/// Notification to send to a user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNotificationRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,
}

impl From<CreateNotificationRequest> for NewNotification {
    fn from(req: CreateNotificationRequest) -> Self {
        Self {
            user_id: req.user_id,
            title: req.title,
            message: req.message,
            kind: req.kind,
            url: req.url,
        }
    }
}

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications).post(create_notification))
        .route("/:id/read", post(mark_read))
}

/// The caller's notifications and unread count
#[utoipa::path(
    get,
    path = "/api/notification",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notification feed", body = NotificationFeed),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_notifications(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<NotificationFeed>> {
    let feed = state.notification_service.feed(&session).await?;
    Ok(ApiResponse::success(feed))
}

/// Send a notification (ITSG or ADMIN)
#[utoipa::path(
    post,
    path = "/api/notification",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created", body = Notification),
        (status = 400, description = "Validation error or unknown recipient"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create_notification(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateNotificationRequest>,
) -> AppResult<Created<Notification>> {
    let notification = state
        .notification_service
        .create(&session, payload.into())
        .await?;
    Ok(Created(notification))
}

/// Mark one of the caller's notifications as read
#[utoipa::path(
    post,
    path = "/api/notification/{id}/read",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Belongs to another user"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<ApiResponse<Notification>> {
    let notification = state.notification_service.mark_read(&session, id).await?;
    Ok(ApiResponse::success(notification))
}
