use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::Row;

use crate::db::DatabaseProxy;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub async fn find_user_by_email(
    proxy: &DatabaseProxy,
    email: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "id", "username", "email", "passwordHash", "createdAt"
           FROM "users" WHERE "email" = $1 LIMIT 1"#,
    )
    .bind(email)
    .fetch_optional(proxy.pool())
    .await?;

    Ok(row.map(map_user))
}

pub async fn find_user_by_id(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "id", "username", "email", "passwordHash", "createdAt"
           FROM "users" WHERE "id" = $1 LIMIT 1"#,
    )
    .bind(user_id)
    .fetch_optional(proxy.pool())
    .await?;

    Ok(row.map(map_user))
}

pub async fn insert_user(
    proxy: &DatabaseProxy,
    id: &str,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO "users" ("id", "username", "email", "passwordHash")
           VALUES ($1, $2, $3, $4)"#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn insert_session(
    proxy: &DatabaseProxy,
    token_hash: &str,
    user_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO "sessions" ("tokenHash", "userId", "expiresAt")
           VALUES ($1, $2, $3)
           ON CONFLICT ("tokenHash") DO UPDATE SET "expiresAt" = EXCLUDED."expiresAt""#,
    )
    .bind(token_hash)
    .bind(user_id)
    .bind(expires_at.naive_utc())
    .execute(proxy.pool())
    .await?;
    Ok(())
}

/// Returns the owning user id when the session exists and has not expired.
pub async fn find_live_session(
    proxy: &DatabaseProxy,
    token_hash: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar(
        r#"SELECT "userId" FROM "sessions"
           WHERE "tokenHash" = $1 AND "expiresAt" > NOW() LIMIT 1"#,
    )
    .bind(token_hash)
    .fetch_optional(proxy.pool())
    .await
}

pub async fn delete_session(proxy: &DatabaseProxy, token_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "sessions" WHERE "tokenHash" = $1"#)
        .bind(token_hash)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

fn map_user(row: sqlx::postgres::PgRow) -> UserRow {
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    UserRow {
        id: row.try_get("id").unwrap_or_default(),
        username: row.try_get("username").unwrap_or_default(),
        email: row.try_get("email").unwrap_or_default(),
        password_hash: row.try_get("passwordHash").unwrap_or_default(),
        created_at: DateTime::<Utc>::from_naive_utc_and_offset(created_at, Utc),
    }
}
