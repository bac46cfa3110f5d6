use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use ecolog_backend::routes;
use ecolog_backend::state::AppState;

/// Router with no database behind it: data routes answer 503/401, health
/// and static routes work, and no environment is consulted.
pub async fn create_test_app() -> Router {
    routes::router(AppState::without_database())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
