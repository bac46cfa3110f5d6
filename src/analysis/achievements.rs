use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::compare::compare_month;
use super::EmissionEntry;

const STREAK_LOOKBACK_DAYS: i64 = 365;
const STREAK_TIERS: [(i64, i64); 4] = [(3, 10), (7, 25), (30, 100), (100, 300)];
const MILESTONES: [usize; 7] = [10, 25, 50, 100, 250, 500, 1000];
const REDUCTION_TIERS: [(f64, i64); 3] = [(30.0, 150), (15.0, 75), (5.0, 25)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub title: String,
    pub message: String,
    pub points: i64,
}

/// Days of uninterrupted logging ending today (or yesterday, so a streak is
/// not lost before the user logs today's activities). Capped at one year of
/// lookback.
pub fn consecutive_days(entries: &[EmissionEntry], now: DateTime<Utc>) -> i64 {
    let days: HashSet<NaiveDate> = entries.iter().map(|e| e.timestamp.date_naive()).collect();
    if days.is_empty() {
        return 0;
    }

    let today = now.date_naive();
    let mut cursor = if days.contains(&today) {
        today
    } else if days.contains(&(today - Duration::days(1))) {
        today - Duration::days(1)
    } else {
        return 0;
    };

    let mut streak = 0i64;
    while days.contains(&cursor) && streak < STREAK_LOOKBACK_DAYS {
        streak += 1;
        cursor = cursor - Duration::days(1);
    }
    streak
}

pub fn compute_achievements(entries: &[EmissionEntry], now: DateTime<Utc>) -> Vec<Achievement> {
    let mut achievements = Vec::new();

    let streak = consecutive_days(entries, now);
    if let Some((days, points)) = STREAK_TIERS.iter().rev().find(|(days, _)| streak >= *days) {
        achievements.push(Achievement {
            title: format!("{days}-day streak"),
            message: format!("You have logged activities {streak} days in a row."),
            points: *points,
        });
    }

    if let Some(&milestone) = MILESTONES.iter().rev().find(|&&m| entries.len() >= m) {
        achievements.push(Achievement {
            title: format!("{milestone} activities logged"),
            message: format!(
                "{} activities recorded so far. Keep the log going.",
                entries.len()
            ),
            points: milestone as i64,
        });
    }

    let monthly = compare_month(entries, now);
    if let Some(pct) = monthly.change_percentage {
        let reduction = -pct;
        if let Some((tier, points)) = REDUCTION_TIERS.iter().find(|(tier, _)| reduction >= *tier) {
            achievements.push(Achievement {
                title: format!("{tier:.0}% reduction"),
                message: format!(
                    "Your last 30 days came in {reduction:.1}% below the month before."
                ),
                points: *points,
            });
        }
    }

    achievements
}
