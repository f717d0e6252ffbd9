//! HTTP routes

pub mod events;
pub mod health;
pub mod members;
pub mod officers;
pub mod webhooks;


use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use ait_shared::RateLimitConfig;

use crate::{error::ApiError, state::AppState};

/// Short burst limit on the join form
pub const SIGNUP_RATE_LIMIT: RateLimitConfig = RateLimitConfig {
    name: "signup",
    max_requests: 5,
    window: Duration::from_secs(15 * 60),
    message: "Too many signup attempts. Please try again in 15 minutes.",
};

/// Hourly ceiling on the join form
pub const SIGNUP_HOURLY_RATE_LIMIT: RateLimitConfig = RateLimitConfig {
    name: "signup_hourly",
    max_requests: 20,
    window: Duration::from_secs(60 * 60),
    message: "You have exceeded the maximum number of signup attempts. Please try again later.",
};

pub fn create_router(state: AppState) -> Router {
    let signup = Router::new()
        .route("/members", post(members::create_member))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            signup_rate_limit,
        ));

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/officers", get(officers::list_officers))
        .route("/events", get(events::list_events))
        .route("/events/{id}", get(events::get_event))
        .route("/webhooks/stripe", post(webhooks::stripe_webhook))
        .merge(signup);

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" })))
}

fn first_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Client address for rate limiting. The socket peer is used unless the
/// deployment sits behind a proxy that sets forwarding headers.
pub fn client_ip(request: &Request, trust_proxy_headers: bool) -> String {
    let forwarded = if trust_proxy_headers {
        let headers = request.headers();
        first_header_value(headers, "x-forwarded-for")
            .or_else(|| first_header_value(headers, "x-real-ip"))
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
        .unwrap_or_else(|| "unknown".to_string())
}

/// Apply both signup limits; a request rejected by the first is not counted
/// against the second
pub async fn signup_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = client_ip(&request, state.config.trust_proxy_headers);

    for limit in [&SIGNUP_RATE_LIMIT, &SIGNUP_HOURLY_RATE_LIMIT] {
        let result = state.rate_limiter.check(limit, &ip).await;
        if !result.allowed {
            tracing::warn!(client_ip = %ip, limiter = limit.name, "Signup rate limit exceeded");
            return Err(ApiError::RateLimited {
                message: limit.message.to_string(),
                retry_after_seconds: result.retry_after_seconds.unwrap_or(1),
            });
        }
    }

    Ok(next.run(request).await)
}
