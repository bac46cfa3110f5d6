use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::window::filter_range;
use super::EmissionEntry;

const CLOSE_MARGIN: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    pub period: String,
    pub current_total: f64,
    pub previous_total: f64,
    pub change: f64,
    /// `None` means "new baseline": the previous window was empty while the
    /// current one is not, so a percentage would be meaningless.
    pub change_percentage: Option<f64>,
    pub trend: ChangeDirection,
}

/// Compare two adjacent half-open windows of `days` length ending at `now`:
/// current `[now - days, now)` against previous `[now - 2*days, now - days)`.
pub fn compare_windows(
    entries: &[EmissionEntry],
    now: DateTime<Utc>,
    period: &str,
    days: i64,
) -> PeriodComparison {
    let span = Duration::days(days);
    let current: f64 = filter_range(entries, now - span, now)
        .iter()
        .map(|e| e.value)
        .sum();
    let previous: f64 = filter_range(entries, now - span - span, now - span)
        .iter()
        .map(|e| e.value)
        .sum();

    let change = current - previous;
    let change_percentage = if previous == 0.0 {
        if current > 0.0 {
            None
        } else {
            Some(0.0)
        }
    } else {
        Some(change / previous * 100.0)
    };

    let trend = if change > 0.0 {
        ChangeDirection::Increasing
    } else if change < 0.0 {
        ChangeDirection::Decreasing
    } else {
        ChangeDirection::Stable
    };

    PeriodComparison {
        period: period.to_string(),
        current_total: current,
        previous_total: previous,
        change,
        change_percentage,
        trend,
    }
}

pub fn compare_week(entries: &[EmissionEntry], now: DateTime<Utc>) -> PeriodComparison {
    compare_windows(entries, now, "week", 7)
}

pub fn compare_month(entries: &[EmissionEntry], now: DateTime<Utc>) -> PeriodComparison {
    compare_windows(entries, now, "month", 30)
}

pub fn compare_quarter(entries: &[EmissionEntry], now: DateTime<Utc>) -> PeriodComparison {
    compare_windows(entries, now, "quarter", 90)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    OnTrack,
    Close,
    OverTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalComparison {
    pub target: f64,
    pub actual: f64,
    pub remaining: f64,
    pub status: GoalStatus,
}

pub fn compare_goal(actual: f64, target: f64) -> GoalComparison {
    let status = if actual <= target {
        GoalStatus::OnTrack
    } else if actual <= target * CLOSE_MARGIN {
        GoalStatus::Close
    } else {
        GoalStatus::OverTarget
    };

    GoalComparison {
        target,
        actual,
        remaining: (target - actual).max(0.0),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Category;
    use chrono::TimeZone;

    fn entry(value: f64, ts: DateTime<Utc>) -> EmissionEntry {
        EmissionEntry::new(Category::Transport, value, ts)
    }

    #[test]
    fn test_weekly_decrease() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        let entries = vec![
            entry(20.0, now - Duration::days(2)),
            entry(25.0, now - Duration::days(9)),
        ];

        let cmp = compare_week(&entries, now);
        assert!((cmp.current_total - 20.0).abs() < 1e-9);
        assert!((cmp.previous_total - 25.0).abs() < 1e-9);
        assert!((cmp.change_percentage.unwrap() + 20.0).abs() < 1e-9);
        assert_eq!(cmp.trend, ChangeDirection::Decreasing);
    }

    #[test]
    fn test_new_baseline_has_no_percentage() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        let entries = vec![entry(12.0, now - Duration::days(1))];

        let cmp = compare_week(&entries, now);
        assert_eq!(cmp.change_percentage, None);
        assert_eq!(cmp.trend, ChangeDirection::Increasing);
    }

    #[test]
    fn test_two_empty_windows_are_stable() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        let cmp = compare_week(&[], now);
        assert_eq!(cmp.change_percentage, Some(0.0));
        assert_eq!(cmp.trend, ChangeDirection::Stable);
    }

    #[test]
    fn test_window_boundaries_do_not_double_count() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        // now - 7d opens the current window; now - 14d opens the previous;
        // now itself falls outside both.
        let entries = vec![
            entry(9.0, now - Duration::days(7)),
            entry(4.0, now - Duration::days(14)),
            entry(100.0, now),
        ];

        let cmp = compare_week(&entries, now);
        assert!((cmp.current_total - 9.0).abs() < 1e-9);
        assert!((cmp.previous_total - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_goal_statuses() {
        assert_eq!(compare_goal(30.0, 35.0).status, GoalStatus::OnTrack);
        assert_eq!(compare_goal(35.0, 35.0).status, GoalStatus::OnTrack);
        assert_eq!(compare_goal(38.0, 35.0).status, GoalStatus::Close);
        assert_eq!(compare_goal(40.0, 35.0).status, GoalStatus::OverTarget);
    }

    #[test]
    fn test_goal_remaining_never_negative() {
        let goal = compare_goal(50.0, 35.0);
        assert_eq!(goal.remaining, 0.0);
    }
}
