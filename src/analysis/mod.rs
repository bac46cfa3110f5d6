pub mod achievements;
pub mod cache;
pub mod category;
pub mod compare;
pub mod insights;
pub mod recommend;
pub mod stats;
pub mod trend;
pub mod window;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-facing activity groupings. Unknown strings are rejected at
/// validation time rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Transport,
    Food,
    Energy,
    Housing,
    Waste,
    Consumption,
    Digital,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Transport,
        Category::Food,
        Category::Energy,
        Category::Housing,
        Category::Waste,
        Category::Consumption,
        Category::Digital,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "transport" => Some(Self::Transport),
            "food" => Some(Self::Food),
            "energy" => Some(Self::Energy),
            "housing" => Some(Self::Housing),
            "waste" => Some(Self::Waste),
            "consumption" => Some(Self::Consumption),
            "digital" => Some(Self::Digital),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "Transport",
            Self::Food => "Food",
            Self::Energy => "Energy",
            Self::Housing => "Housing",
            Self::Waste => "Waste",
            Self::Consumption => "Consumption",
            Self::Digital => "Digital",
        }
    }
}

/// The per-request snapshot the analysis routines compute over: one logged
/// activity reduced to what the aggregations need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionEntry {
    pub category: Category,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl EmissionEntry {
    pub fn new(category: Category, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            category,
            value,
            timestamp,
        }
    }
}
