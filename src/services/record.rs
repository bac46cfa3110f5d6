use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::{Category, EmissionEntry};
use crate::db::operations::emissions::{self, EmissionRecordRow, RecordFilter};
use crate::db::DatabaseProxy;

const MAX_ACTIVITY_LEN: usize = 200;
const TIMESTAMP_FUTURE_LIMIT: i64 = 60 * 60; // seconds
const TIMESTAMP_PAST_LIMIT_DAYS: i64 = 366;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone)]
pub struct CreateEmissionInput {
    pub category: String,
    pub activity: String,
    pub value: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("validation failed")]
    Validation(ValidationReport),
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

/// Validation never throws: the caller receives the full list of problems.
pub fn validate_input(input: &CreateEmissionInput, now: DateTime<Utc>) -> ValidationReport {
    let mut errors = Vec::new();

    if input.category.trim().is_empty() {
        errors.push("category is required".to_string());
    } else if Category::parse(&input.category).is_none() {
        errors.push(format!("unknown category \"{}\"", input.category));
    }

    if input.activity.trim().is_empty() {
        errors.push("activity is required".to_string());
    } else if input.activity.len() > MAX_ACTIVITY_LEN {
        errors.push(format!("activity exceeds {MAX_ACTIVITY_LEN} characters"));
    }

    if !input.value.is_finite() {
        errors.push("value must be a finite number".to_string());
    } else if input.value < 0.0 {
        errors.push("value must not be negative".to_string());
    }

    if let Some(ts) = input.timestamp {
        if ts > now + Duration::seconds(TIMESTAMP_FUTURE_LIMIT) {
            errors.push("timestamp must not be in the future".to_string());
        }
        if ts < now - Duration::days(TIMESTAMP_PAST_LIMIT_DAYS) {
            errors.push("timestamp is older than one year".to_string());
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

pub async fn create_record(
    proxy: &DatabaseProxy,
    user_id: &str,
    input: CreateEmissionInput,
) -> Result<EmissionRecordRow, EmissionError> {
    let now = Utc::now();
    let report = validate_input(&input, now);
    let category = match Category::parse(&input.category) {
        Some(category) if report.is_valid => category,
        _ => return Err(EmissionError::Validation(report)),
    };
    let record = EmissionRecordRow {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        category: category.as_str().to_string(),
        activity: input.activity.trim().to_string(),
        value: input.value,
        timestamp: input.timestamp.unwrap_or(now),
        created_at: now,
    };

    emissions::insert_record(proxy, &record).await?;
    Ok(record)
}

#[derive(Debug, Clone)]
pub struct PaginationOptions {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedRecords {
    pub data: Vec<EmissionRecordRow>,
    pub pagination: Pagination,
}

pub async fn list_records(
    proxy: &DatabaseProxy,
    user_id: &str,
    filter: RecordFilter,
    options: PaginationOptions,
) -> Result<PaginatedRecords, EmissionError> {
    let page = options.page.unwrap_or(1).max(1);
    let page_size = options
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let total = emissions::count_records(proxy, user_id, &filter).await?;
    let data =
        emissions::fetch_records_page(proxy, user_id, &filter, page_size, (page - 1) * page_size)
            .await?;

    Ok(PaginatedRecords {
        data,
        pagination: Pagination {
            page,
            page_size,
            total,
            total_pages: (total + page_size - 1) / page_size.max(1),
        },
    })
}

pub async fn delete_record(
    proxy: &DatabaseProxy,
    user_id: &str,
    record_id: &str,
) -> Result<(), EmissionError> {
    if emissions::delete_record(proxy, user_id, record_id).await? {
        Ok(())
    } else {
        Err(EmissionError::NotFound)
    }
}

/// Reduces stored rows to the snapshot the analysis core consumes. Rows with
/// a category the parser no longer knows are skipped rather than failing the
/// whole request.
pub fn to_entries(rows: &[EmissionRecordRow]) -> Vec<EmissionEntry> {
    rows.iter()
        .filter_map(|row| {
            Category::parse(&row.category)
                .map(|category| EmissionEntry::new(category, row.value, row.timestamp))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateEmissionInput {
        CreateEmissionInput {
            category: "Transport".to_string(),
            activity: "Commute by car".to_string(),
            value: 4.2,
            timestamp: None,
        }
    }

    #[test]
    fn test_valid_input_passes() {
        let report = validate_input(&input(), Utc::now());
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut bad = input();
        bad.category = "Teleportation".to_string();
        let report = validate_input(&bad, Utc::now());
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("Teleportation"));
    }

    #[test]
    fn test_negative_value_rejected() {
        let mut bad = input();
        bad.value = -1.0;
        let report = validate_input(&bad, Utc::now());
        assert!(!report.is_valid);
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let now = Utc::now();
        let mut bad = input();
        bad.timestamp = Some(now + Duration::hours(2));
        assert!(!validate_input(&bad, now).is_valid);

        // Up to an hour of clock skew is tolerated.
        bad.timestamp = Some(now + Duration::minutes(30));
        assert!(validate_input(&bad, now).is_valid);
    }

    #[test]
    fn test_errors_accumulate() {
        let bad = CreateEmissionInput {
            category: String::new(),
            activity: String::new(),
            value: f64::NAN,
            timestamp: None,
        };
        let report = validate_input(&bad, Utc::now());
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn test_to_entries_skips_unknown_categories() {
        let now = Utc::now();
        let rows = vec![
            EmissionRecordRow {
                id: "a".into(),
                user_id: "u".into(),
                category: "Transport".into(),
                activity: "drive".into(),
                value: 1.0,
                timestamp: now,
                created_at: now,
            },
            EmissionRecordRow {
                id: "b".into(),
                user_id: "u".into(),
                category: "Mystery".into(),
                activity: "???".into(),
                value: 2.0,
                timestamp: now,
                created_at: now,
            },
        ];

        let entries = to_entries(&rows);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, Category::Transport);
    }
}
