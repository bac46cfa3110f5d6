use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::category::aggregate_by_category;
use super::compare::{compare_goal, GoalStatus};
use super::trend::{detect_trend, Trend};
use super::window::{bucket_totals, filter_range, season_of, Bucket, Season};
use super::{Category, EmissionEntry};

const TREND_CONFIDENCE_FLOOR: f64 = 50.0;

/// Weekly kg-CO₂e thresholds per category: (high urgency, medium urgency).
const CATEGORY_THRESHOLDS: [(Category, f64, f64); 7] = [
    (Category::Transport, 20.0, 10.0),
    (Category::Food, 15.0, 8.0),
    (Category::Energy, 15.0, 8.0),
    (Category::Housing, 12.0, 6.0),
    (Category::Waste, 8.0, 4.0),
    (Category::Consumption, 10.0, 5.0),
    (Category::Digital, 5.0, 2.5),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: Option<Category>,
    pub priority: Priority,
    pub message: String,
}

pub fn compute_recommendations(
    entries: &[EmissionEntry],
    now: DateTime<Utc>,
    weekly_goal: f64,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let week = filter_range(entries, now - Duration::days(7), now);
    for cat in aggregate_by_category(&week) {
        let Some((_, high, medium)) = CATEGORY_THRESHOLDS
            .iter()
            .find(|(c, _, _)| *c == cat.category)
        else {
            continue;
        };

        if cat.total >= *high {
            recommendations.push(Recommendation {
                category: Some(cat.category),
                priority: Priority::High,
                message: category_advice(cat.category, cat.total),
            });
        } else if cat.total >= *medium {
            recommendations.push(Recommendation {
                category: Some(cat.category),
                priority: Priority::Medium,
                message: category_advice(cat.category, cat.total),
            });
        }
    }

    let weekly_series: Vec<f64> = bucket_totals(entries, Bucket::Week)
        .iter()
        .map(|p| p.total)
        .collect();
    let trend = detect_trend(&weekly_series);
    if trend.trend == Trend::Increasing && trend.confidence >= TREND_CONFIDENCE_FLOOR {
        recommendations.push(Recommendation {
            category: None,
            priority: Priority::High,
            message: format!(
                "Your weekly emissions have been rising steadily (+{:.1} kg/week). Review your top category for quick wins.",
                trend.slope
            ),
        });
    }

    let week_total: f64 = week.iter().map(|e| e.value).sum();
    let goal = compare_goal(week_total, weekly_goal);
    match goal.status {
        GoalStatus::OverTarget => recommendations.push(Recommendation {
            category: None,
            priority: Priority::High,
            message: format!(
                "This week is at {:.1} kg CO₂e, over your {:.0} kg target.",
                goal.actual, goal.target
            ),
        }),
        GoalStatus::Close => recommendations.push(Recommendation {
            category: None,
            priority: Priority::Medium,
            message: format!(
                "This week is at {:.1} kg CO₂e, close to your {:.0} kg target.",
                goal.actual, goal.target
            ),
        }),
        GoalStatus::OnTrack => {}
    }

    recommendations.push(Recommendation {
        category: None,
        priority: Priority::Low,
        message: seasonal_tip(now).to_string(),
    });

    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

fn category_advice(category: Category, total: f64) -> String {
    let hint = match category {
        Category::Transport => "try transit, cycling, or combining trips",
        Category::Food => "more plant-based meals make the biggest dent",
        Category::Energy => "heating and standby loads are the usual culprits",
        Category::Housing => "check insulation and water heating settings",
        Category::Waste => "composting and recycling cut landfill methane",
        Category::Consumption => "buying less and buying used both count",
        Category::Digital => "streaming quality and idle devices add up",
    };
    format!(
        "{} accounted for {:.1} kg CO₂e this week — {}.",
        category.as_str(),
        total,
        hint
    )
}

const WINTER_TIPS: [&str; 3] = [
    "Lowering the thermostat by 1°C saves roughly 5-10% of heating emissions.",
    "Seal window drafts before turning up the heat.",
    "Batch-cook while the oven is warm to use less energy per meal.",
];
const SPRING_TIPS: [&str; 3] = [
    "Milder weather is a good time to swap short drives for cycling.",
    "Dry laundry outside instead of using the dryer.",
    "Seasonal local produce carries a fraction of imported footprints.",
];
const SUMMER_TIPS: [&str; 3] = [
    "Shade and ventilation before air conditioning — each degree matters.",
    "Holiday nearby: one long-haul flight can exceed a year of driving.",
    "Cold meals and grilling beat running the oven in the heat.",
];
const AUTUMN_TIPS: [&str; 3] = [
    "Service your heating before winter; a tuned system burns less.",
    "Preserve seasonal produce instead of buying imports later.",
    "Layer up at home before reaching for the thermostat.",
];

/// Deterministic rotation through the current season's tip list, keyed by
/// day of year so every caller sees the same tip on the same day.
pub fn seasonal_tip(now: DateTime<Utc>) -> &'static str {
    let tips: &[&str] = match season_of(now) {
        Season::Winter => &WINTER_TIPS,
        Season::Spring => &SPRING_TIPS,
        Season::Summer => &SUMMER_TIPS,
        Season::Autumn => &AUTUMN_TIPS,
    };
    tips[now.ordinal() as usize % tips.len()]
}
