//! Router tests.
//!
//! The router is driven with `oneshot` over fake services, so neither a
//! database nor Redis is needed. Authorization in the fakes goes through the
//! real policy table.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use license_admin::api::{create_router, AppState};
use license_admin::domain::{
    ActivityEntry, Department, DirectoryEntry, KeyStatus, LicenseDetail, LicenseKey, LicenseSeats,
    NewNotification, Notification, NotificationFeed, ProcurementView, Role, Session, UserResponse,
};
use license_admin::errors::{AppError, AppResult};
use license_admin::policy::{self, Operation};
use license_admin::services::{
    AddKeyInput, AuthService, CreateUserInput, LicenseService, NotificationService,
    ProcurementService, TokenResponse, UpdateKeyStatusInput, UserService,
};
use license_admin::types::{Paginated, PaginationParams};

const ITSG_TOKEN: &str = "itsg-token";
const HR_TOKEN: &str = "hr-token";
const CORRECT_PASSWORD: &str = "correct-password";

// =============================================================================
// Fake services
// =============================================================================

struct FakeAuth;

fn session_for(token: &str) -> Option<Session> {
    let (role, department) = match token {
        ITSG_TOKEN => (Role::Admin, Department::Itsg),
        HR_TOKEN => (Role::Employee, Department::Hr),
        _ => return None,
    };
    Some(Session {
        user_id: Uuid::new_v4(),
        email: format!("{}@example.com", token),
        role: Some(role),
        department: Some(department),
    })
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        if password != CORRECT_PASSWORD {
            return Err(AppError::InvalidCredentials);
        }
        Ok(TokenResponse {
            access_token: format!("token-for-{}", email),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Session> {
        session_for(token).ok_or(AppError::Unauthorized)
    }

    async fn verify_password(&self, _session: &Session, password: String) -> AppResult<bool> {
        Ok(password == CORRECT_PASSWORD)
    }
}

/// Directory of fixed users, filtered by the caller's scope
struct FakeUsers {
    directory: Vec<DirectoryEntry>,
}

impl FakeUsers {
    fn new() -> Self {
        let entry = |name: &str, department| DirectoryEntry {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            department,
            role: Role::Employee,
        };
        Self {
            directory: vec![
                entry("Alice", Department::Hr),
                entry("Albert", Department::Sre),
                entry("Bob", Department::Hr),
            ],
        }
    }
}

#[async_trait]
impl UserService for FakeUsers {
    async fn create_user(&self, session: &Session, input: CreateUserInput) -> AppResult<UserResponse> {
        policy::authorize(session, Operation::CreateUser)?;
        let now = Utc::now();
        Ok(UserResponse {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            department: input.department,
            role: input.role,
            manager: None,
            added_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_user(&self, session: &Session, _id: Uuid) -> AppResult<UserResponse> {
        policy::authorize(session, Operation::ViewUser)?;
        Err(AppError::NotFound)
    }

    async fn list_users(
        &self,
        session: &Session,
        params: PaginationParams,
    ) -> AppResult<Paginated<UserResponse>> {
        policy::authorize(session, Operation::ListUsers)?;
        Ok(Paginated::new(vec![], &params, 0))
    }

    async fn search_directory(
        &self,
        session: &Session,
        search: Option<String>,
    ) -> AppResult<Vec<DirectoryEntry>> {
        let scope = policy::directory_scope(session)?;
        let term = search.unwrap_or_default().to_lowercase();
        Ok(self
            .directory
            .iter()
            .filter(|e| scope.department().map_or(true, |d| e.department == d))
            .filter(|e| e.name.to_lowercase().contains(&term))
            .cloned()
            .collect())
    }

    async fn list_managers(&self, session: &Session) -> AppResult<Vec<DirectoryEntry>> {
        policy::authorize(session, Operation::ListManagers)?;
        Ok(vec![])
    }
}

struct FakeLicenses;

#[async_trait]
impl LicenseService for FakeLicenses {
    async fn list_licenses(
        &self,
        session: &Session,
        params: PaginationParams,
    ) -> AppResult<Paginated<LicenseSeats>> {
        policy::authorize(session, Operation::ViewLicenses)?;
        Ok(Paginated::new(vec![], &params, 0))
    }

    async fn dropdowns(&self, session: &Session) -> AppResult<Vec<LicenseSeats>> {
        policy::authorize(session, Operation::ViewLicenseDropdowns)?;
        Ok(vec![])
    }

    async fn get_license(&self, session: &Session, _id: Uuid) -> AppResult<LicenseDetail> {
        policy::authorize(session, Operation::ViewLicenses)?;
        Err(AppError::NotFound)
    }

    async fn add_key(
        &self,
        session: &Session,
        license_id: Uuid,
        input: AddKeyInput,
    ) -> AppResult<LicenseKey> {
        policy::authorize(session, Operation::ManageLicenseKeys)?;
        let now = Utc::now();
        Ok(LicenseKey {
            id: Uuid::new_v4(),
            license_id,
            key: input.key,
            status: input.status.unwrap_or(KeyStatus::Available),
            assigned_to: input.assigned_to,
            created_at: now,
            updated_at: now,
        })
    }

    async fn remove_key(&self, session: &Session, _license_id: Uuid, _key_id: Uuid) -> AppResult<()> {
        policy::authorize(session, Operation::ManageLicenseKeys)
    }

    async fn update_key_status(
        &self,
        session: &Session,
        _license_id: Uuid,
        _key_id: Uuid,
        _input: UpdateKeyStatusInput,
    ) -> AppResult<LicenseKey> {
        policy::authorize(session, Operation::ManageLicenseKeys)?;
        Err(AppError::NotFound)
    }

    async fn read_logs(&self, session: &Session, _license_id: Uuid) -> AppResult<Vec<ActivityEntry>> {
        policy::authorize(session, Operation::ViewLicenseLogs)?;
        Ok(vec![])
    }
}

struct FakeProcurement;

#[async_trait]
impl ProcurementService for FakeProcurement {
    async fn list(&self, session: &Session, _archived: bool) -> AppResult<Vec<ProcurementView>> {
        policy::authorize(session, Operation::ViewProcurement)?;
        Ok(vec![])
    }
}

struct FakeNotifications;

#[async_trait]
impl NotificationService for FakeNotifications {
    async fn feed(&self, session: &Session) -> AppResult<NotificationFeed> {
        policy::authorize(session, Operation::ReadOwnNotifications)?;
        Ok(NotificationFeed {
            notifications: vec![],
            unread_count: 0,
        })
    }

    async fn mark_read(&self, session: &Session, _id: Uuid) -> AppResult<Notification> {
        policy::authorize(session, Operation::MarkNotificationRead)?;
        Err(AppError::NotFound)
    }

    async fn create(&self, session: &Session, notification: NewNotification) -> AppResult<Notification> {
        policy::authorize(session, Operation::CreateNotification)?;
        Ok(Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            url: notification.url,
            read: false,
            created_at: Utc::now(),
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn app() -> Router {
    create_router(AppState::new(
        Arc::new(FakeAuth),
        Arc::new(FakeUsers::new()),
        Arc::new(FakeLicenses),
        Arc::new(FakeProcurement),
        Arc::new(FakeNotifications),
    ))
}

async fn send(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn new_user_body() -> Value {
    json!({
        "name": "Grace Hopper",
        "email": "Grace@Example.com",
        "department": "SRE",
        "role": "EMPLOYEE",
        "password": "long-enough-password"
    })
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_protected_route_without_token_is_401() {
    let (status, body) = send(Method::GET, "/api/user-management/drop-downs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_is_401() {
    let (status, _) = send(Method::GET, "/api/notification", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_is_public() {
    let body = json!({ "email": "ada@example.com", "password": CORRECT_PASSWORD });
    let (status, body) = send(Method::POST, "/api/auth/login", None, Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["token_type"], "Bearer");
}

#[tokio::test]
async fn test_login_wrong_password_is_401() {
    let body = json!({ "email": "ada@example.com", "password": "nope" });
    let (status, body) = send(Method::POST, "/api/auth/login", None, Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_session_returns_claims() {
    let (status, body) = send(Method::GET, "/api/auth/session", Some(HR_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["department"], "HR");
    assert_eq!(body["data"]["role"], "EMPLOYEE");
}

// =============================================================================
// User management
// =============================================================================

#[tokio::test]
async fn test_create_user_outside_itsg_is_403() {
    let (status, body) = send(
        Method::POST,
        "/api/user-management",
        Some(HR_TOKEN),
        Some(new_user_body()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Forbidden: only ITSG may create users");
}

#[tokio::test]
async fn test_create_user_as_itsg_is_201() {
    let (status, body) = send(
        Method::POST,
        "/api/user-management",
        Some(ITSG_TOKEN),
        Some(new_user_body()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "grace@example.com");
    assert_eq!(body["data"]["department"], "SRE");
}

#[tokio::test]
async fn test_create_user_short_password_is_400() {
    let mut payload = new_user_body();
    payload["password"] = json!("short");
    let (status, body) = send(Method::POST, "/api/user-management", Some(ITSG_TOKEN), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_user_blank_name_is_400() {
    let mut payload = new_user_body();
    payload["name"] = json!("    ");
    let (status, body) = send(Method::POST, "/api/user-management", Some(ITSG_TOKEN), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Name must not be blank");
}

#[tokio::test]
async fn test_malformed_license_id_uses_error_envelope() {
    let (status, body) = send(Method::GET, "/api/license-management/not-a-uuid", Some(ITSG_TOKEN), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_key_id_uses_error_envelope() {
    let uri = format!("/api/license-management/{}/keys/42", Uuid::new_v4());
    let (status, body) = send(Method::DELETE, &uri, Some(ITSG_TOKEN), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_bad_query_value_uses_error_envelope() {
    let (status, body) = send(Method::GET, "/api/procurement?archived=maybe", Some(ITSG_TOKEN), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = send(Method::GET, "/api/user-management?page=first", Some(ITSG_TOKEN), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_directory_search_stays_in_department() {
    let (status, body) = send(
        Method::GET,
        "/api/user-management/drop-downs?search=al",
        Some(HR_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Alice");
    assert!(rows.iter().all(|r| r["department"] == "HR"));
}

#[tokio::test]
async fn test_directory_search_unrestricted_for_itsg() {
    let (status, body) = send(
        Method::GET,
        "/api/user-management/drop-downs?search=al",
        Some(ITSG_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_user_list_carries_pagination_meta() {
    let (status, body) = send(
        Method::GET,
        "/api/user-management?page=2&limit=5",
        Some(ITSG_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["page"], 2);
    assert_eq!(body["meta"]["limit"], 5);
}

// =============================================================================
// Licenses
// =============================================================================

#[tokio::test]
async fn test_verify_access_reports_match() {
    let (status, body) = send(
        Method::POST,
        "/api/license-management/verify-access",
        Some(HR_TOKEN),
        Some(json!({ "password": CORRECT_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = send(
        Method::POST,
        "/api/license-management/verify-access",
        Some(HR_TOKEN),
        Some(json!({ "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false }));
}

#[tokio::test]
async fn test_verify_access_without_session_is_401() {
    let (status, _) = send(
        Method::POST,
        "/api/license-management/verify-access",
        None,
        Some(json!({ "password": CORRECT_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_key_guarded_and_created() {
    let uri = format!("/api/license-management/{}/keys", Uuid::new_v4());
    let payload = json!({ "key": "AAAA-BBBB" });

    let (status, _) = send(Method::POST, &uri, Some(HR_TOKEN), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(Method::POST, &uri, Some(ITSG_TOKEN), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "AVAILABLE");
}

#[tokio::test]
async fn test_remove_key_is_204() {
    let uri = format!(
        "/api/license-management/{}/keys/{}",
        Uuid::new_v4(),
        Uuid::new_v4()
    );
    let (status, body) = send(Method::DELETE, &uri, Some(ITSG_TOKEN), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_license_logs_limited_to_license_staff() {
    let uri = format!("/api/license-logs/{}", Uuid::new_v4());
    let (status, _) = send(Method::GET, &uri, Some(HR_TOKEN), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(Method::GET, &uri, Some(ITSG_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

// =============================================================================
// Procurement and notifications
// =============================================================================

#[tokio::test]
async fn test_procurement_denied_for_employee() {
    let (status, _) = send(Method::GET, "/api/procurement?archived=true", Some(HR_TOKEN), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_notification_feed() {
    let (status, body) = send(Method::GET, "/api/notification", Some(HR_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unread_count"], 0);
}

#[tokio::test]
async fn test_create_notification_uses_type_field() {
    let payload = json!({
        "user_id": Uuid::new_v4(),
        "title": "Renewal",
        "message": "Your IDE seat renews next week",
        "type": "LICENSE_EXPIRING"
    });
    let (status, body) = send(Method::POST, "/api/notification", Some(ITSG_TOKEN), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["type"], "LICENSE_EXPIRING");
    assert_eq!(body["data"]["read"], false);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_without_infrastructure() {
    let (status, body) = send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
    assert_eq!(body["services"]["redis"]["status"], "disabled");
}
