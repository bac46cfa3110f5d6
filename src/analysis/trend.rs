use serde::{Deserialize, Serialize};

const MIN_POINTS: usize = 4;
const STABLE_SLOPE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendDescriptor {
    pub trend: Trend,
    pub slope: f64,
    pub intercept: f64,
    /// `|Pearson r| * 100`, so 0 when either axis has no variance.
    pub confidence: f64,
}

impl TrendDescriptor {
    fn insufficient() -> Self {
        Self {
            trend: Trend::InsufficientData,
            slope: 0.0,
            intercept: 0.0,
            confidence: 0.0,
        }
    }
}

/// Least-squares fit of period totals against their 1-based index.
pub fn detect_trend(series: &[f64]) -> TrendDescriptor {
    if series.len() < MIN_POINTS {
        return TrendDescriptor::insufficient();
    }

    let n = series.len() as f64;
    let xs: Vec<f64> = (1..=series.len()).map(|i| i as f64).collect();

    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = series.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(series.iter()) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    // sxx is positive for any series of MIN_POINTS distinct indices.
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let correlation = if sxx == 0.0 || syy == 0.0 {
        0.0
    } else {
        sxy / (sxx.sqrt() * syy.sqrt())
    };

    let trend = if slope.abs() < STABLE_SLOPE {
        Trend::Stable
    } else if slope > 0.0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    };

    TrendDescriptor {
        trend,
        slope,
        intercept,
        confidence: correlation.abs() * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_series_is_insufficient() {
        assert_eq!(detect_trend(&[1.0, 2.0, 3.0]).trend, Trend::InsufficientData);
        assert_eq!(detect_trend(&[]).trend, Trend::InsufficientData);
    }

    #[test]
    fn test_arithmetic_series_is_increasing_with_full_confidence() {
        let d = detect_trend(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(d.trend, Trend::Increasing);
        assert!((d.slope - 1.0).abs() < 1e-9);
        assert!((d.confidence - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_series_is_stable_with_zero_confidence() {
        let d = detect_trend(&[5.0, 5.0, 5.0, 5.0]);
        assert_eq!(d.trend, Trend::Stable);
        assert_eq!(d.slope, 0.0);
        assert_eq!(d.confidence, 0.0);
    }

    #[test]
    fn test_decreasing_series() {
        let d = detect_trend(&[10.0, 8.0, 6.0, 4.0]);
        assert_eq!(d.trend, Trend::Decreasing);
        assert!(d.slope < 0.0);
    }

    #[test]
    fn test_small_slope_is_stable() {
        let d = detect_trend(&[10.0, 10.05, 10.1, 10.15]);
        assert_eq!(d.trend, Trend::Stable);
    }

    #[test]
    fn test_intercept_matches_fit() {
        // y = 2x + 1 exactly.
        let d = detect_trend(&[3.0, 5.0, 7.0, 9.0]);
        assert!((d.slope - 2.0).abs() < 1e-9);
        assert!((d.intercept - 1.0).abs() < 1e-9);
    }
}
