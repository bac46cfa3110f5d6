use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{extract_token, hash_token, sign_jwt_for_user};
use crate::db::operations::users;
use crate::response::{json_ok, AppError};
use crate::routes::require_auth;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let username = payload.username.trim();
    let email = payload.email.trim().to_lowercase();

    if username.is_empty() {
        return Err(AppError::validation("username is required"));
    }
    if !email.contains('@') {
        return Err(AppError::validation("email is not valid"));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let proxy = state
        .db_proxy()
        .ok_or_else(|| AppError::unavailable("Service unavailable"))?;

    let existing = users::find_user_by_email(proxy.as_ref(), &email)
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "register lookup failed");
            AppError::internal(err.to_string())
        })?;
    if existing.is_some() {
        return Err(AppError::conflict("email is already registered"));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|err| AppError::internal(err.to_string()))?;

    let user_id = Uuid::new_v4().to_string();
    users::insert_user(proxy.as_ref(), &user_id, username, &email, &password_hash)
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "register insert failed");
            AppError::internal(err.to_string())
        })?;

    let (token, expires_at) =
        sign_jwt_for_user(&user_id).map_err(|err| AppError::internal(err.to_string()))?;
    users::insert_session(proxy.as_ref(), &hash_token(&token), &user_id, expires_at)
        .await
        .map_err(|err| AppError::internal(err.to_string()))?;

    Ok(json_ok(json!({
        "token": token,
        "user": { "id": user_id, "username": username, "email": email },
    }))
    .into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = payload.email.trim().to_lowercase();

    let proxy = state
        .db_proxy()
        .ok_or_else(|| AppError::unavailable("Service unavailable"))?;

    let user = users::find_user_by_email(proxy.as_ref(), &email)
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "login lookup failed");
            AppError::internal(err.to_string())
        })?
        .ok_or_else(|| AppError::unauthorized("invalid email or password"))?;

    let valid = bcrypt::verify(&payload.password, &user.password_hash).unwrap_or(false);
    if !valid {
        return Err(AppError::unauthorized("invalid email or password"));
    }

    let (token, expires_at) =
        sign_jwt_for_user(&user.id).map_err(|err| AppError::internal(err.to_string()))?;
    users::insert_session(proxy.as_ref(), &hash_token(&token), &user.id, expires_at)
        .await
        .map_err(|err| AppError::internal(err.to_string()))?;

    Ok(json_ok(json!({
        "token": token,
        "user": { "id": user.id, "username": user.username, "email": user.email },
    }))
    .into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    if let (Some(token), Some(proxy)) = (extract_token(&headers), state.db_proxy()) {
        if let Err(err) = users::delete_session(proxy.as_ref(), &hash_token(&token)).await {
            tracing::warn!(error = %err, "logout session delete failed");
        }
    }

    Ok(json_ok(json!({ "loggedOut": true })).into_response())
}

pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let (_, user) = require_auth(&state, &headers).await?;
    Ok(json_ok(user).into_response())
}
