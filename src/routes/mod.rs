mod analysis;
mod auth;
mod health;
mod records;

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;

use crate::auth::{extract_token, verify_request_token, AuthUser};
use crate::db::DatabaseProxy;
use crate::middleware::rate_limit::{
    analysis_rate_limit_middleware, RateLimitConfig, SlidingWindowLimiter,
};
use crate::response::{json_error, AppError};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    // The limiter is constructed here, per router instance, and injected as
    // middleware state.
    let limiter = Arc::new(SlidingWindowLimiter::new(RateLimitConfig::from_env()));

    let analysis_routes = Router::new()
        .route("/api/analysis/summary", get(analysis::summary))
        .route("/api/analysis/trends", get(analysis::trends))
        .route("/api/analysis/comparisons", get(analysis::comparisons))
        .route("/api/analysis/insights", get(analysis::insights))
        .route(
            "/api/analysis/recommendations",
            get(analysis::recommendations),
        )
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            analysis_rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::live))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/emissions",
            get(records::list_records).post(records::create_record),
        )
        .route("/api/emissions/categories", get(records::categories))
        .route("/api/emissions/:id", axum::routing::delete(records::delete_record))
        .merge(analysis_routes)
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found")
}

/// Token, database, session, user — everything a data route needs before it
/// can run, or the error response that ends it early.
pub(crate) async fn require_auth(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(Arc<DatabaseProxy>, AuthUser), AppError> {
    let token = extract_token(headers)
        .ok_or_else(|| AppError::unauthorized("Missing authentication token"))?;

    let proxy = state
        .db_proxy()
        .ok_or_else(|| AppError::unavailable("Service unavailable"))?;

    let user = verify_request_token(proxy.as_ref(), &token)
        .await
        .map_err(|_| AppError::unauthorized("Authentication failed, please log in again"))?;

    Ok((proxy, user))
}
