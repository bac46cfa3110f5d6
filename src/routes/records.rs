use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::analysis::Category;
use crate::db::operations::emissions::RecordFilter;
use crate::response::{json_ok, AppError};
use crate::routes::require_auth;
use crate::services::record::{
    self, CreateEmissionInput, EmissionError, PaginationOptions,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmissionRequest {
    pub category: String,
    pub activity: String,
    pub value: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub category: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

pub async fn create_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateEmissionRequest>,
) -> Result<Response, AppError> {
    let (proxy, user) = require_auth(&state, &headers).await?;

    let input = CreateEmissionInput {
        category: payload.category,
        activity: payload.activity,
        value: payload.value,
        timestamp: payload.timestamp,
    };

    match record::create_record(proxy.as_ref(), &user.id, input).await {
        Ok(created) => {
            // A new record invalidates everything cached for this user.
            state.analysis_cache().clear(&user.id);
            Ok((StatusCode::CREATED, json_ok(created)).into_response())
        }
        Err(EmissionError::Validation(report)) => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "code": "VALIDATION_ERROR",
                "error": "validation failed",
                "validation": report,
            })),
        )
            .into_response()),
        Err(err) => {
            tracing::warn!(error = %err, "emission insert failed");
            Err(AppError::internal(err.to_string()))
        }
    }
}

pub async fn list_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let (proxy, user) = require_auth(&state, &headers).await?;

    let category = match query.category {
        Some(ref raw) => Some(
            Category::parse(raw)
                .ok_or_else(|| AppError::validation(format!("unknown category \"{raw}\"")))?
                .as_str()
                .to_string(),
        ),
        None => None,
    };

    let filter = RecordFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        category,
    };
    let options = PaginationOptions {
        page: query.page,
        page_size: query.page_size,
    };

    match record::list_records(proxy.as_ref(), &user.id, filter, options).await {
        Ok(result) => Ok(Json(json!({
            "success": true,
            "data": result.data,
            "pagination": result.pagination,
        }))
        .into_response()),
        Err(err) => {
            tracing::warn!(error = %err, "emission list failed");
            Err(AppError::internal(err.to_string()))
        }
    }
}

pub async fn delete_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(record_id): Path<String>,
) -> Result<Response, AppError> {
    let (proxy, user) = require_auth(&state, &headers).await?;

    match record::delete_record(proxy.as_ref(), &user.id, &record_id).await {
        Ok(()) => {
            state.analysis_cache().clear(&user.id);
            Ok(json_ok(json!({ "deleted": true })).into_response())
        }
        Err(EmissionError::NotFound) => Err(AppError::not_found("record not found")),
        Err(err) => {
            tracing::warn!(error = %err, "emission delete failed");
            Err(AppError::internal(err.to_string()))
        }
    }
}

pub async fn categories() -> Response {
    let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    json_ok(names).into_response()
}
