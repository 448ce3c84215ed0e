//! OpenAPI documentation served through Swagger UI.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, license_handler, notification_handler, procurement_handler, user_handler,
};
use crate::domain::{
    ActivityAction, ActivityEntry, Department, DirectoryEntry, KeyStatus, License, LicenseDetail,
    LicenseKey, LicenseRef, LicenseSeats, Notification, NotificationFeed, NotificationType,
    ProcurementStatus, ProcurementView, Role, Session, UserResponse, UserSummary,
};
use crate::services::TokenResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "License Admin API",
        version = "0.1.0",
        description = "Internal administration of software licenses, keys, users and procurement"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::login,
        auth_handler::current_session,
        license_handler::list_licenses,
        license_handler::license_dropdowns,
        license_handler::verify_access,
        license_handler::get_license,
        license_handler::add_key,
        license_handler::remove_key,
        license_handler::update_key_status,
        license_handler::read_license_logs,
        notification_handler::list_notifications,
        notification_handler::create_notification,
        notification_handler::mark_read,
        procurement_handler::list_procurement,
        user_handler::list_users,
        user_handler::create_user,
        user_handler::directory_dropdown,
        user_handler::list_managers,
        user_handler::get_user,
    ),
    components(
        schemas(
            Department,
            Role,
            Session,
            UserResponse,
            UserSummary,
            DirectoryEntry,
            KeyStatus,
            License,
            LicenseKey,
            LicenseDetail,
            LicenseSeats,
            ActivityAction,
            ActivityEntry,
            NotificationType,
            Notification,
            NotificationFeed,
            ProcurementStatus,
            LicenseRef,
            ProcurementView,
            TokenResponse,
            auth_handler::LoginRequest,
            license_handler::VerifyAccessRequest,
            license_handler::VerifyAccessResponse,
            license_handler::AddKeyRequest,
            license_handler::UpdateKeyStatusRequest,
            notification_handler::CreateNotificationRequest,
            user_handler::CreateUserRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and session"),
        (name = "Licenses", description = "Licenses, keys and the activity log"),
        (name = "Notifications", description = "Per-user notifications"),
        (name = "Procurement", description = "Procurement requests"),
        (name = "Users", description = "User management and directory")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}
