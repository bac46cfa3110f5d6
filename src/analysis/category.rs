use serde::{Deserialize, Serialize};

use super::{Category, EmissionEntry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
    pub count: usize,
    pub percentage: f64,
}

/// Per-category totals in descending order of total. Ties keep the order in
/// which categories first appear in `entries` (stable sort), and percentages
/// are taken against the grand total across all categories.
pub fn aggregate_by_category(entries: &[EmissionEntry]) -> Vec<CategoryTotal> {
    let mut order: Vec<Category> = Vec::new();
    let mut sums: Vec<(f64, usize)> = Vec::new();

    for entry in entries {
        match order.iter().position(|c| *c == entry.category) {
            Some(i) => {
                sums[i].0 += entry.value;
                sums[i].1 += 1;
            }
            None => {
                order.push(entry.category);
                sums.push((entry.value, 1));
            }
        }
    }

    let grand_total: f64 = sums.iter().map(|(total, _)| total).sum();

    let mut totals: Vec<CategoryTotal> = order
        .into_iter()
        .zip(sums)
        .map(|(category, (total, count))| CategoryTotal {
            category,
            total,
            count,
            percentage: if grand_total > 0.0 {
                total / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();

    totals.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));
    totals
}

pub fn top_categories(entries: &[EmissionEntry], n: usize) -> Vec<CategoryTotal> {
    let mut totals = aggregate_by_category(entries);
    totals.truncate(n);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(category: Category, value: f64) -> EmissionEntry {
        EmissionEntry::new(
            category,
            value,
            Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_totals_and_percentages() {
        let entries = vec![
            entry(Category::Transport, 10.0),
            entry(Category::Food, 5.0),
        ];

        let top = top_categories(&entries, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].category, Category::Transport);
        assert!((top[0].total - 10.0).abs() < 1e-9);
        assert!((top[0].percentage - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let entries = vec![
            entry(Category::Transport, 4.0),
            entry(Category::Food, 3.0),
            entry(Category::Energy, 3.0),
        ];

        let all = aggregate_by_category(&entries);
        let pct_sum: f64 = all.iter().map(|c| c.percentage).sum();
        assert!((pct_sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_ties_keep_first_appearance_order() {
        let entries = vec![
            entry(Category::Food, 5.0),
            entry(Category::Transport, 5.0),
        ];

        let all = aggregate_by_category(&entries);
        assert_eq!(all[0].category, Category::Food);
        assert_eq!(all[1].category, Category::Transport);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_by_category(&[]).is_empty());
        assert!(top_categories(&[], 3).is_empty());
    }

    #[test]
    fn test_counts_accumulate() {
        let entries = vec![
            entry(Category::Energy, 1.0),
            entry(Category::Energy, 2.0),
            entry(Category::Energy, 3.0),
        ];

        let all = aggregate_by_category(&entries);
        assert_eq!(all[0].count, 3);
        assert!((all[0].percentage - 100.0).abs() < 1e-9);
    }
}
