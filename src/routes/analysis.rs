use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;

use crate::response::{json_ok, AppError};
use crate::routes::require_auth;
use crate::services::analysis::{self, SummaryPeriod};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub period: Option<String>,
}

pub async fn summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, AppError> {
    let (proxy, user) = require_auth(&state, &headers).await?;
    let period = SummaryPeriod::parse(query.period.as_deref());

    analysis::summary(
        proxy.as_ref(),
        state.analysis_cache().as_ref(),
        &user.id,
        Utc::now(),
        period,
    )
    .await
    .map(|report| json_ok(report).into_response())
    .map_err(|err| {
        tracing::warn!(error = %err, "summary analysis failed");
        AppError::internal(err.to_string())
    })
}

pub async fn trends(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (proxy, user) = require_auth(&state, &headers).await?;

    analysis::trends(proxy.as_ref(), state.analysis_cache().as_ref(), &user.id)
        .await
        .map(|report| json_ok(report).into_response())
        .map_err(|err| {
            tracing::warn!(error = %err, "trend analysis failed");
            AppError::internal(err.to_string())
        })
}

pub async fn comparisons(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (proxy, user) = require_auth(&state, &headers).await?;

    analysis::comparisons(
        proxy.as_ref(),
        state.analysis_cache().as_ref(),
        &user.id,
        Utc::now(),
        state.weekly_goal_kg(),
    )
    .await
    .map(|report| json_ok(report).into_response())
    .map_err(|err| {
        tracing::warn!(error = %err, "comparison analysis failed");
        AppError::internal(err.to_string())
    })
}

pub async fn insights(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (proxy, user) = require_auth(&state, &headers).await?;

    analysis::insights(
        proxy.as_ref(),
        state.analysis_cache().as_ref(),
        &user.id,
        Utc::now(),
        state.weekly_goal_kg(),
    )
    .await
    .map(|report| json_ok(report).into_response())
    .map_err(|err| {
        tracing::warn!(error = %err, "insight analysis failed");
        AppError::internal(err.to_string())
    })
}

pub async fn recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (proxy, user) = require_auth(&state, &headers).await?;

    analysis::recommendations(
        proxy.as_ref(),
        state.analysis_cache().as_ref(),
        &user.id,
        Utc::now(),
        state.weekly_goal_kg(),
    )
    .await
    .map(|report| json_ok(report).into_response())
    .map_err(|err| {
        tracing::warn!(error = %err, "recommendation analysis failed");
        AppError::internal(err.to_string())
    })
}
