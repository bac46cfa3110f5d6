use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub count: usize,
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub standard_deviation: f64,
}

pub fn calculate_stats(values: &[f64]) -> SummaryStats {
    if values.is_empty() {
        return SummaryStats::default();
    }

    let count = values.len();
    let sum: f64 = values.iter().sum();
    let average = sum / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let min = sorted[0];
    let max = sorted[count - 1];
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    // Population variance: divide by N, not N-1.
    let variance = values.iter().map(|v| (v - average).powi(2)).sum::<f64>() / count as f64;

    SummaryStats {
        count,
        sum,
        average,
        min,
        max,
        median,
        standard_deviation: variance.sqrt(),
    }
}

/// Nearest-rank percentile over a sorted copy. `p` is clamped to [0, 100].
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let p = p.clamp(0.0, 100.0);
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if values.is_empty() || window == 0 {
        return Vec::new();
    }

    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Percentage change from `previous` to `current`. A zero baseline reports
/// 100 for any positive current value and 0 otherwise.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    (current - previous) / previous * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = calculate_stats(&[]);
        assert_eq!(stats, SummaryStats::default());
    }

    #[test]
    fn test_average_and_sum() {
        let stats = calculate_stats(&[2.0, 4.0, 6.0]);
        assert_eq!(stats.count, 3);
        assert!((stats.sum - 12.0).abs() < 1e-9);
        assert!((stats.average - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_even_length_median_averages_middle_pair() {
        let stats = calculate_stats(&[1.0, 3.0, 5.0, 7.0]);
        assert!((stats.median - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_population_standard_deviation() {
        // Variance of [2, 4, 4, 4, 5, 5, 7, 9] is 4 with the N divisor.
        let stats = calculate_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.standard_deviation - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_bounds() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 5.0);
        assert_eq!(percentile(&values, 50.0), 3.0);
    }

    #[test]
    fn test_moving_average_warmup() {
        let out = moving_average(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out, vec![1.0, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_percentage_change_zero_baseline() {
        assert_eq!(percentage_change(5.0, 0.0), 100.0);
        assert_eq!(percentage_change(0.0, 0.0), 0.0);
        assert!((percentage_change(20.0, 25.0) + 20.0).abs() < 1e-9);
    }
}
