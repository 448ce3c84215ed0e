//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    auth_routes, license_log_routes, license_routes, notification_routes, procurement_routes,
    session_routes, user_routes,
};
use super::middleware::{auth_middleware, rate_limit_login_middleware};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/auth", session_routes())
        .nest("/license-management", license_routes())
        .nest("/license-logs", license_log_routes())
        .nest("/notification", notification_routes())
        .nest("/procurement", procurement_routes())
        .nest("/user-management", user_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let public = Router::new().nest(
        "/auth",
        auth_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_login_middleware,
        )),
    );

    Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn healthy() -> Self {
        Self {
            status: "healthy",
            error: None,
        }
    }

    fn unhealthy(error: impl ToString) -> Self {
        Self {
            status: "unhealthy",
            error: Some(error.to_string()),
        }
    }

    fn disabled() -> Self {
        Self {
            status: "disabled",
            error: None,
        }
    }
}

/// Database and Redis connectivity. Redis is optional, so "disabled" is not a failure.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_status = match &state.database {
        Some(db) => match db.ping().await {
            Ok(()) => ServiceStatus::healthy(),
            Err(e) => ServiceStatus::unhealthy(e),
        },
        None => ServiceStatus::unhealthy("database not configured"),
    };

    let redis_status = match &state.cache {
        Some(cache) => match cache.ping().await {
            Ok(()) => ServiceStatus::healthy(),
            Err(e) => ServiceStatus::unhealthy(e),
        },
        None => ServiceStatus::disabled(),
    };

    let all_healthy = db_status.status == "healthy" && redis_status.status != "unhealthy";

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth {
            database: db_status,
            redis: redis_status,
        },
    };

    (status_code, Json(response))
}
