use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::response::json_ok;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Response {
    let database = match state.db_proxy() {
        Some(proxy) => {
            if proxy.check_health().await {
                "up"
            } else {
                "down"
            }
        }
        None => "unconfigured",
    };

    let body = json!({
        "status": if database == "up" { "ok" } else { "degraded" },
        "database": database,
        "uptimeSeconds": state.uptime_seconds(),
    });

    if database == "up" {
        json_ok(body).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, json_ok(body)).into_response()
    }
}

pub async fn live() -> Response {
    json_ok(json!({ "status": "alive" })).into_response()
}
