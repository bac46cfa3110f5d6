use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Row};

use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionRecordRow {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub activity: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Optional narrowing of a fetch; `start_date`/`end_date` form a half-open
/// `[start, end)` window.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

pub async fn insert_record(
    proxy: &DatabaseProxy,
    record: &EmissionRecordRow,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO "emission_records"
           ("id", "userId", "category", "activity", "value", "timestamp", "createdAt")
           VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
    )
    .bind(&record.id)
    .bind(&record.user_id)
    .bind(&record.category)
    .bind(&record.activity)
    .bind(record.value)
    .bind(record.timestamp.naive_utc())
    .bind(record.created_at.naive_utc())
    .execute(proxy.pool())
    .await?;
    Ok(())
}

/// A user's records, newest first.
pub async fn fetch_records(
    proxy: &DatabaseProxy,
    user_id: &str,
    filter: &RecordFilter,
) -> Result<Vec<EmissionRecordRow>, sqlx::Error> {
    let mut query = QueryBuilder::new(
        r#"SELECT "id", "userId", "category", "activity", "value", "timestamp", "createdAt"
           FROM "emission_records" WHERE "userId" = "#,
    );
    query.push_bind(user_id);

    if let Some(start) = filter.start_date {
        query.push(r#" AND "timestamp" >= "#);
        query.push_bind(start.naive_utc());
    }
    if let Some(end) = filter.end_date {
        query.push(r#" AND "timestamp" < "#);
        query.push_bind(end.naive_utc());
    }
    if let Some(ref category) = filter.category {
        query.push(r#" AND "category" = "#);
        query.push_bind(category);
    }
    query.push(r#" ORDER BY "timestamp" DESC"#);

    let rows = query.build().fetch_all(proxy.pool()).await?;
    Ok(rows.into_iter().map(map_record).collect())
}

pub async fn fetch_records_page(
    proxy: &DatabaseProxy,
    user_id: &str,
    filter: &RecordFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<EmissionRecordRow>, sqlx::Error> {
    let mut query = QueryBuilder::new(
        r#"SELECT "id", "userId", "category", "activity", "value", "timestamp", "createdAt"
           FROM "emission_records" WHERE "userId" = "#,
    );
    query.push_bind(user_id);

    if let Some(start) = filter.start_date {
        query.push(r#" AND "timestamp" >= "#);
        query.push_bind(start.naive_utc());
    }
    if let Some(end) = filter.end_date {
        query.push(r#" AND "timestamp" < "#);
        query.push_bind(end.naive_utc());
    }
    if let Some(ref category) = filter.category {
        query.push(r#" AND "category" = "#);
        query.push_bind(category);
    }
    query.push(r#" ORDER BY "timestamp" DESC LIMIT "#);
    query.push_bind(limit);
    query.push(r#" OFFSET "#);
    query.push_bind(offset);

    let rows = query.build().fetch_all(proxy.pool()).await?;
    Ok(rows.into_iter().map(map_record).collect())
}

pub async fn count_records(
    proxy: &DatabaseProxy,
    user_id: &str,
    filter: &RecordFilter,
) -> Result<i64, sqlx::Error> {
    let mut query =
        QueryBuilder::new(r#"SELECT COUNT(*) FROM "emission_records" WHERE "userId" = "#);
    query.push_bind(user_id);

    if let Some(start) = filter.start_date {
        query.push(r#" AND "timestamp" >= "#);
        query.push_bind(start.naive_utc());
    }
    if let Some(end) = filter.end_date {
        query.push(r#" AND "timestamp" < "#);
        query.push_bind(end.naive_utc());
    }
    if let Some(ref category) = filter.category {
        query.push(r#" AND "category" = "#);
        query.push_bind(category);
    }

    let count: i64 = query.build_query_scalar().fetch_one(proxy.pool()).await?;
    Ok(count)
}

/// Deletes the record when it belongs to `user_id`; reports whether a row
/// was removed.
pub async fn delete_record(
    proxy: &DatabaseProxy,
    user_id: &str,
    record_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"DELETE FROM "emission_records" WHERE "id" = $1 AND "userId" = $2"#,
    )
    .bind(record_id)
    .bind(user_id)
    .execute(proxy.pool())
    .await?;

    Ok(result.rows_affected() > 0)
}

fn map_record(row: sqlx::postgres::PgRow) -> EmissionRecordRow {
    let timestamp: NaiveDateTime = row
        .try_get("timestamp")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let created_at: NaiveDateTime = row
        .try_get("createdAt")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    EmissionRecordRow {
        id: row.try_get("id").unwrap_or_default(),
        user_id: row.try_get("userId").unwrap_or_default(),
        category: row.try_get("category").unwrap_or_default(),
        activity: row.try_get("activity").unwrap_or_default(),
        value: row.try_get("value").unwrap_or(0.0),
        timestamp: DateTime::<Utc>::from_naive_utc_and_offset(timestamp, Utc),
        created_at: DateTime::<Utc>::from_naive_utc_and_offset(created_at, Utc),
    }
}
