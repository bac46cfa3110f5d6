use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::EmissionEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    pub today: DateTime<Utc>,
    pub week_start: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
    pub year_start: DateTime<Utc>,
}

impl PeriodBounds {
    /// Boundaries relative to `now`; the week starts on the most recent
    /// Sunday, all boundaries are UTC midnights.
    pub fn for_now(now: DateTime<Utc>) -> Self {
        let date = now.date_naive();
        let week_start_date = date - Duration::days(date.weekday().num_days_from_sunday() as i64);
        let month_start_date = date.with_day(1).unwrap_or(date);
        let year_start_date = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);

        Self {
            today: midnight(date),
            week_start: midnight(week_start_date),
            month_start: midnight(month_start_date),
            year_start: midnight(year_start_date),
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

pub fn season_of(ts: DateTime<Utc>) -> Season {
    match ts.month() {
        12 | 1 | 2 => Season::Winter,
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        _ => Season::Autumn,
    }
}

pub fn day_key(ts: DateTime<Utc>) -> String {
    ts.date_naive().format("%Y-%m-%d").to_string()
}

/// Sunday-based week label for the week containing `ts`.
pub fn week_key(ts: DateTime<Utc>) -> String {
    let start = bucket_start(ts, Bucket::Week);
    format!("{}-W{:02}", start.year(), (start.ordinal() - 1) / 7 + 1)
}

pub fn month_key(ts: DateTime<Utc>) -> String {
    format!("{}-{}", ts.year(), ts.month())
}

pub fn bucket_start(ts: DateTime<Utc>, bucket: Bucket) -> NaiveDate {
    let date = ts.date_naive();
    match bucket {
        Bucket::Day => date,
        Bucket::Week => date - Duration::days(date.weekday().num_days_from_sunday() as i64),
        Bucket::Month => date.with_day(1).unwrap_or(date),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotal {
    pub key: String,
    pub start: NaiveDate,
    pub total: f64,
    pub count: usize,
}

/// Chronologically ordered per-bucket totals.
pub fn bucket_totals(entries: &[EmissionEntry], bucket: Bucket) -> Vec<PeriodTotal> {
    use std::collections::BTreeMap;

    let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for entry in entries {
        let slot = buckets
            .entry(bucket_start(entry.timestamp, bucket))
            .or_insert((0.0, 0));
        slot.0 += entry.value;
        slot.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(start, (total, count))| {
            let ts = midnight(start);
            let key = match bucket {
                Bucket::Day => day_key(ts),
                Bucket::Week => week_key(ts),
                Bucket::Month => month_key(ts),
            };
            PeriodTotal {
                key,
                start,
                total,
                count,
            }
        })
        .collect()
}

/// Half-open filter: `start <= timestamp < end`, so a record on a boundary
/// lands in exactly one window.
pub fn filter_range(
    entries: &[EmissionEntry],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<EmissionEntry> {
    entries
        .iter()
        .filter(|e| e.timestamp >= start && e.timestamp < end)
        .copied()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdaySplit {
    pub weekday_total: f64,
    pub weekday_count: usize,
    pub weekend_total: f64,
    pub weekend_count: usize,
}

pub fn weekday_weekend_split(entries: &[EmissionEntry]) -> WeekdaySplit {
    let mut split = WeekdaySplit::default();
    for entry in entries {
        match entry.timestamp.weekday() {
            Weekday::Sat | Weekday::Sun => {
                split.weekend_total += entry.value;
                split.weekend_count += 1;
            }
            _ => {
                split.weekday_total += entry.value;
                split.weekday_count += 1;
            }
        }
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Category;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn entry(value: f64, ts: DateTime<Utc>) -> EmissionEntry {
        EmissionEntry::new(Category::Transport, value, ts)
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 2025-06-18 is a Wednesday; the week began Sunday the 15th.
        let bounds = PeriodBounds::for_now(at(2025, 6, 18, 14));
        assert_eq!(bounds.week_start, at(2025, 6, 15, 0));
        assert_eq!(bounds.month_start, at(2025, 6, 1, 0));
        assert_eq!(bounds.year_start, at(2025, 1, 1, 0));
    }

    #[test]
    fn test_sunday_is_its_own_week_start() {
        let bounds = PeriodBounds::for_now(at(2025, 6, 15, 9));
        assert_eq!(bounds.week_start, at(2025, 6, 15, 0));
    }

    #[test]
    fn test_filter_range_is_half_open() {
        let start = at(2025, 6, 1, 0);
        let end = at(2025, 6, 8, 0);
        let entries = vec![
            entry(1.0, start),
            entry(2.0, at(2025, 6, 4, 12)),
            entry(3.0, end),
        ];

        let kept = filter_range(&entries, start, end);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|e| e.timestamp < end));
    }

    #[test]
    fn test_month_key_is_unpadded() {
        assert_eq!(month_key(at(2025, 3, 5, 0)), "2025-3");
        assert_eq!(month_key(at(2025, 11, 5, 0)), "2025-11");
    }

    #[test]
    fn test_bucket_totals_ordered_and_summed() {
        let entries = vec![
            entry(2.0, at(2025, 6, 4, 8)),
            entry(3.0, at(2025, 6, 4, 20)),
            entry(5.0, at(2025, 6, 2, 9)),
        ];

        let totals = bucket_totals(&entries, Bucket::Day);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].key, "2025-06-02");
        assert_eq!(totals[1].key, "2025-06-04");
        assert!((totals[1].total - 5.0).abs() < 1e-9);
        assert_eq!(totals[1].count, 2);
    }

    #[test]
    fn test_season_boundaries() {
        assert_eq!(season_of(at(2025, 12, 1, 0)), Season::Winter);
        assert_eq!(season_of(at(2025, 2, 28, 0)), Season::Winter);
        assert_eq!(season_of(at(2025, 5, 31, 0)), Season::Spring);
        assert_eq!(season_of(at(2025, 8, 15, 0)), Season::Summer);
        assert_eq!(season_of(at(2025, 9, 1, 0)), Season::Autumn);
    }

    #[test]
    fn test_weekday_weekend_split() {
        // 2025-06-14 is a Saturday, 2025-06-16 a Monday.
        let entries = vec![
            entry(4.0, at(2025, 6, 14, 10)),
            entry(6.0, at(2025, 6, 16, 10)),
        ];
        let split = weekday_weekend_split(&entries);
        assert!((split.weekend_total - 4.0).abs() < 1e-9);
        assert!((split.weekday_total - 6.0).abs() < 1e-9);
        assert_eq!(split.weekend_count, 1);
        assert_eq!(split.weekday_count, 1);
    }
}
