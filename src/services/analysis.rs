use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::cache::AnalysisCache;
use crate::analysis::category::{aggregate_by_category, CategoryTotal};
use crate::analysis::insights::{
    compute_comparisons, compute_insights, ComparisonReport, InsightsReport,
};
use crate::analysis::recommend::{compute_recommendations, seasonal_tip, Recommendation};
use crate::analysis::stats::{calculate_stats, moving_average, percentile, SummaryStats};
use crate::analysis::trend::{detect_trend, TrendDescriptor};
use crate::analysis::window::{bucket_totals, filter_range, Bucket, PeriodBounds, PeriodTotal};
use crate::db::operations::emissions::RecordFilter;
use crate::db::{operations::emissions, DatabaseProxy};
use crate::services::record::to_entries;

const MOVING_AVERAGE_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryPeriod {
    Week,
    Month,
    Year,
}

impl SummaryPeriod {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("week") => Self::Week,
            Some("year") => Self::Year,
            _ => Self::Month,
        }
    }

    fn start(&self, bounds: &PeriodBounds) -> DateTime<Utc> {
        match self {
            Self::Week => bounds.week_start,
            Self::Month => bounds.month_start,
            Self::Year => bounds.year_start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryParams {
    period: SummaryPeriod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub period: SummaryPeriod,
    pub start: DateTime<Utc>,
    pub total: f64,
    pub stats: SummaryStats,
    /// Nearest-rank p90 over per-record values in the period.
    pub p90_value: f64,
    pub categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub series: Vec<PeriodTotal>,
    pub moving_average: Vec<f64>,
    pub trend: TrendDescriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationReport {
    pub recommendations: Vec<Recommendation>,
    pub seasonal_tip: String,
}

/// One snapshot per request: fetch everything the user logged, newest first,
/// and run the requested analysis over it in memory.
async fn fetch_entries(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Vec<crate::analysis::EmissionEntry>, sqlx::Error> {
    let rows = emissions::fetch_records(proxy, user_id, &RecordFilter::default()).await?;
    Ok(to_entries(&rows))
}

pub async fn insights(
    proxy: &DatabaseProxy,
    cache: &AnalysisCache,
    user_id: &str,
    now: DateTime<Utc>,
    weekly_goal: f64,
) -> Result<InsightsReport, sqlx::Error> {
    let params = serde_json::json!({});
    if let Some(cached) = cache.get::<InsightsReport, _>(user_id, "insights", &params) {
        return Ok(cached);
    }

    let entries = fetch_entries(proxy, user_id).await?;
    let report = compute_insights(&entries, now, weekly_goal);
    cache.set(user_id, "insights", &params, &report);
    Ok(report)
}

pub async fn comparisons(
    proxy: &DatabaseProxy,
    cache: &AnalysisCache,
    user_id: &str,
    now: DateTime<Utc>,
    weekly_goal: f64,
) -> Result<ComparisonReport, sqlx::Error> {
    let params = serde_json::json!({});
    if let Some(cached) = cache.get::<ComparisonReport, _>(user_id, "comparisons", &params) {
        return Ok(cached);
    }

    let entries = fetch_entries(proxy, user_id).await?;
    let report = compute_comparisons(&entries, now, weekly_goal);
    cache.set(user_id, "comparisons", &params, &report);
    Ok(report)
}

pub async fn recommendations(
    proxy: &DatabaseProxy,
    cache: &AnalysisCache,
    user_id: &str,
    now: DateTime<Utc>,
    weekly_goal: f64,
) -> Result<RecommendationReport, sqlx::Error> {
    let params = serde_json::json!({});
    if let Some(cached) = cache.get::<RecommendationReport, _>(user_id, "recommendations", &params)
    {
        return Ok(cached);
    }

    let entries = fetch_entries(proxy, user_id).await?;
    let report = RecommendationReport {
        recommendations: compute_recommendations(&entries, now, weekly_goal),
        seasonal_tip: seasonal_tip(now).to_string(),
    };
    cache.set(user_id, "recommendations", &params, &report);
    Ok(report)
}

pub async fn summary(
    proxy: &DatabaseProxy,
    cache: &AnalysisCache,
    user_id: &str,
    now: DateTime<Utc>,
    period: SummaryPeriod,
) -> Result<SummaryReport, sqlx::Error> {
    let params = SummaryParams { period };
    if let Some(cached) = cache.get::<SummaryReport, _>(user_id, "summary", &params) {
        return Ok(cached);
    }

    let entries = fetch_entries(proxy, user_id).await?;
    let bounds = PeriodBounds::for_now(now);
    let windowed = filter_range(&entries, period.start(&bounds), now);
    let values: Vec<f64> = windowed.iter().map(|e| e.value).collect();

    let report = SummaryReport {
        period,
        start: period.start(&bounds),
        total: values.iter().sum(),
        stats: calculate_stats(&values),
        p90_value: percentile(&values, 90.0),
        categories: aggregate_by_category(&windowed),
    };
    cache.set(user_id, "summary", &params, &report);
    Ok(report)
}

pub async fn trends(
    proxy: &DatabaseProxy,
    cache: &AnalysisCache,
    user_id: &str,
) -> Result<TrendReport, sqlx::Error> {
    let params = serde_json::json!({});
    if let Some(cached) = cache.get::<TrendReport, _>(user_id, "trends", &params) {
        return Ok(cached);
    }

    let entries = fetch_entries(proxy, user_id).await?;
    let series = bucket_totals(&entries, Bucket::Week);
    let values: Vec<f64> = series.iter().map(|p| p.total).collect();

    let report = TrendReport {
        moving_average: moving_average(&values, MOVING_AVERAGE_WINDOW),
        trend: detect_trend(&values),
        series,
    };
    cache.set(user_id, "trends", &params, &report);
    Ok(report)
}
