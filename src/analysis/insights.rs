use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::achievements::{compute_achievements, consecutive_days, Achievement};
use super::category::{top_categories, CategoryTotal};
use super::compare::{
    compare_goal, compare_month, compare_quarter, compare_week, GoalComparison, PeriodComparison,
};
use super::stats::{calculate_stats, SummaryStats};
use super::trend::{detect_trend, TrendDescriptor};
use super::window::{
    bucket_totals, filter_range, weekday_weekend_split, Bucket, PeriodTotal, WeekdaySplit,
};
use super::EmissionEntry;

const TOP_CATEGORY_COUNT: usize = 3;
const DAILY_STATS_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub week: PeriodComparison,
    pub month: PeriodComparison,
    pub quarter: PeriodComparison,
    pub weekly_goal: GoalComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub total_records: usize,
    pub total_emissions: f64,
    /// Stats over per-day totals for the trailing 30 days.
    pub daily_stats: SummaryStats,
    pub top_categories: Vec<CategoryTotal>,
    pub weekly_series: Vec<PeriodTotal>,
    pub trend: TrendDescriptor,
    pub comparisons: ComparisonReport,
    pub weekday_split: WeekdaySplit,
    pub streak_days: i64,
    pub achievements: Vec<Achievement>,
}

pub fn compute_comparisons(
    entries: &[EmissionEntry],
    now: DateTime<Utc>,
    weekly_goal: f64,
) -> ComparisonReport {
    let week = compare_week(entries, now);
    let weekly_goal = compare_goal(week.current_total, weekly_goal);

    ComparisonReport {
        week,
        month: compare_month(entries, now),
        quarter: compare_quarter(entries, now),
        weekly_goal,
    }
}

pub fn compute_insights(
    entries: &[EmissionEntry],
    now: DateTime<Utc>,
    weekly_goal: f64,
) -> InsightsReport {
    let recent = filter_range(entries, now - Duration::days(DAILY_STATS_WINDOW_DAYS), now);
    let daily_totals: Vec<f64> = bucket_totals(&recent, Bucket::Day)
        .iter()
        .map(|p| p.total)
        .collect();

    let weekly_series = bucket_totals(entries, Bucket::Week);
    let weekly_values: Vec<f64> = weekly_series.iter().map(|p| p.total).collect();

    InsightsReport {
        total_records: entries.len(),
        total_emissions: entries.iter().map(|e| e.value).sum(),
        daily_stats: calculate_stats(&daily_totals),
        top_categories: top_categories(entries, TOP_CATEGORY_COUNT),
        trend: detect_trend(&weekly_values),
        weekly_series,
        comparisons: compute_comparisons(entries, now, weekly_goal),
        weekday_split: weekday_weekend_split(entries),
        streak_days: consecutive_days(entries, now),
        achievements: compute_achievements(entries, now),
    }
}
