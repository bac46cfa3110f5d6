pub mod analysis;
pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::state::AppState;

/// Router wired against whatever the environment provides; without a
/// database the app still serves health and auth-rejection responses.
pub async fn create_app() -> axum::Router {
    let config = Config::from_env();

    let db_proxy = match db::DatabaseProxy::from_env().await {
        Ok(proxy) => Some(proxy),
        Err(err) => {
            tracing::warn!(error = %err, "database not available, serving degraded");
            None
        }
    };

    let state = AppState::new(db_proxy, config.weekly_goal_kg);

    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
