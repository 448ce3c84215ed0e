//! Per-client throttling of `POST /api/auth/login`.
//!
//! Without Redis the layer is a pass-through. With Redis configured but
//! failing it denies, so an outage cannot be used to brute-force passwords.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::net::SocketAddr;

use crate::api::AppState;
use crate::config::{RATE_LIMIT_AUTH_REQUESTS, RATE_LIMIT_AUTH_WINDOW_SECONDS};

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// 429 with `Retry-After`
#[derive(Debug)]
pub struct LoginThrottled {
    pub retry_after: u64,
}

impl IntoResponse for LoginThrottled {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": "RATE_LIMITED",
                "message": "Too many login attempts. Please try again later."
            }
        }));
        let headers = [
            (RETRY_AFTER, HeaderValue::from(self.retry_after)),
            (REMAINING_HEADER, HeaderValue::from(0u64)),
        ];

        (StatusCode::TOO_MANY_REQUESTS, headers, body).into_response()
    }
}

/// Address the login throttle counts against.
///
/// With `trust_proxy` the first hop of `X-Forwarded-For`, then `X-Real-IP`,
/// are preferred. Otherwise only the peer address is used, since any client
/// can set those headers.
fn client_address(request: &Request, trust_proxy: bool) -> String {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    };

    let forwarded = if trust_proxy {
        header("x-forwarded-for").or_else(|| header("x-real-ip"))
    } else {
        None
    };

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_owned())
}

pub async fn rate_limit_login_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, LoginThrottled> {
    let Some(cache) = state.cache.clone() else {
        return Ok(next.run(request).await);
    };

    let throttled = LoginThrottled {
        retry_after: RATE_LIMIT_AUTH_WINDOW_SECONDS,
    };
    let client = client_address(&request, state.trust_proxy_headers);

    let count = match cache
        .check_rate_limit(
            &format!("login:{}", client),
            RATE_LIMIT_AUTH_REQUESTS,
            RATE_LIMIT_AUTH_WINDOW_SECONDS,
        )
        .await
    {
        Ok((count, true)) => count,
        Ok((count, false)) => {
            tracing::warn!(%client, count, "login attempts exceeded");
            return Err(throttled);
        }
        Err(e) => {
            tracing::error!(%client, "login throttle unavailable, denying: {}", e);
            return Err(throttled);
        }
    };

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(LIMIT_HEADER, HeaderValue::from(RATE_LIMIT_AUTH_REQUESTS));
    headers.insert(
        REMAINING_HEADER,
        HeaderValue::from(RATE_LIMIT_AUTH_REQUESTS.saturating_sub(count)),
    );

    Ok(response)
}
