//! Property-Based Tests for the analysis primitives
//!
//! Tests the following invariants:
//! - calculate_stats: average == sum/count, min <= median <= max
//! - calculate_stats on empty input returns the all-zero result
//! - percentage_change(x, 0) follows the fixed zero-baseline convention
//! - top_categories never exceeds the grand total; full percentages sum to ~100
//! - detect_trend classifies steep arithmetic series as increasing
//! - cache set/get round-trips regardless of params field order

use proptest::prelude::*;

use chrono::{Duration, TimeZone, Utc};
use ecolog_backend::analysis::cache::AnalysisCache;
use ecolog_backend::analysis::category::{aggregate_by_category, top_categories};
use ecolog_backend::analysis::stats::{calculate_stats, percentage_change, SummaryStats};
use ecolog_backend::analysis::trend::{detect_trend, Trend};
use ecolog_backend::analysis::{Category, EmissionEntry};

fn arb_value() -> impl Strategy<Value = f64> {
    (0u64..=1_000_000u64).prop_map(|v| v as f64 / 100.0)
}

fn arb_category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

fn arb_entries(max: usize) -> impl Strategy<Value = Vec<EmissionEntry>> {
    prop::collection::vec((arb_category(), arb_value(), 0i64..365), 0..max).prop_map(|items| {
        let base = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        items
            .into_iter()
            .map(|(category, value, days_ago)| {
                EmissionEntry::new(category, value, base - Duration::days(days_ago))
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_average_is_sum_over_count(values in prop::collection::vec(arb_value(), 1..100)) {
        let stats = calculate_stats(&values);
        let expected = stats.sum / stats.count as f64;
        prop_assert!((stats.average - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_median_between_min_and_max(values in prop::collection::vec(arb_value(), 1..100)) {
        let stats = calculate_stats(&values);
        prop_assert!(stats.min <= stats.median + 1e-9);
        prop_assert!(stats.median <= stats.max + 1e-9);
    }

    #[test]
    fn prop_zero_baseline_change(x in arb_value()) {
        let change = percentage_change(x, 0.0);
        if x > 0.0 {
            prop_assert_eq!(change, 100.0);
        } else {
            prop_assert_eq!(change, 0.0);
        }
    }

    #[test]
    fn prop_top_categories_bounded_by_grand_total(entries in arb_entries(50), n in 1usize..5) {
        let grand_total: f64 = entries.iter().map(|e| e.value).sum();
        let top_sum: f64 = top_categories(&entries, n).iter().map(|c| c.total).sum();
        prop_assert!(top_sum <= grand_total + 1e-6);
    }

    #[test]
    fn prop_full_percentages_sum_to_hundred(entries in arb_entries(50)) {
        let all = aggregate_by_category(&entries);
        let grand_total: f64 = entries.iter().map(|e| e.value).sum();
        let pct_sum: f64 = all.iter().map(|c| c.percentage).sum();

        if grand_total > 0.0 {
            prop_assert!((pct_sum - 100.0).abs() < 1e-6);
        } else {
            prop_assert_eq!(pct_sum, 0.0);
        }
    }

    #[test]
    fn prop_steep_arithmetic_series_is_increasing(
        start in arb_value(),
        step in 1.0f64..50.0,
        len in 4usize..30,
    ) {
        let series: Vec<f64> = (0..len).map(|i| start + step * i as f64).collect();
        let descriptor = detect_trend(&series);
        prop_assert_eq!(descriptor.trend, Trend::Increasing);
        prop_assert!(descriptor.confidence > 99.0);
    }

    #[test]
    fn prop_cache_round_trip(user in "[a-z]{1,8}", marker in 0i64..1_000_000) {
        let cache = AnalysisCache::new(std::time::Duration::from_secs(60));
        let params = serde_json::json!({"period": "week", "n": marker});
        cache.set(&user, "pbt", &params, &marker);
        prop_assert_eq!(cache.get::<i64, _>(&user, "pbt", &params), Some(marker));
    }
}

#[test]
fn test_empty_stats_is_all_zero() {
    assert_eq!(calculate_stats(&[]), SummaryStats::default());
}
