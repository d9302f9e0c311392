//! Aggregate metrics computed by the backend
//!
//! These are opaque server-side aggregates. The client never recomputes them
//! locally; a point change to a client record invalidates them instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// KPI card summary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_clients: u64,
    pub churn_risk_mean: f64,
    pub contacted: u64,
    pub conversion_rate: f64,
    pub at_risk_count: u64,
    pub potential_clients: u64,
    pub expected_conversion: f64,
    pub financial_opportunity: f64,
    pub contact_progress: f64,
}

/// One bar of the probability histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityBucket {
    pub range: String,
    pub no_contacted: u64,
    pub contacted: u64,
}

impl ProbabilityBucket {
    pub fn total(&self) -> u64 {
        self.no_contacted + self.contacted
    }
}

/// Probability histogram split by contact status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityDistribution {
    pub buckets: Vec<ProbabilityBucket>,
    /// Score above which a client is prioritized
    pub threshold: f64,
}

impl ProbabilityDistribution {
    pub fn threshold_percent(&self) -> f64 {
        self.threshold * 100.0
    }
}

/// Progress toward the monthly outreach target
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactProgress {
    pub total_contacted: u64,
    pub total_prioritized: u64,
    pub monthly_target: u64,
    pub contacted_this_month: u64,
    pub days_remaining: u32,
    pub daily_needed: f64,
    pub daily_expected: f64,
    pub difference: f64,
    pub remaining_contacts: u64,
    pub projection_message: String,
}

impl ContactProgress {
    /// Copy with a new monthly target; derived fields stay as the server sent them
    pub fn with_monthly_target(&self, monthly_target: u64) -> Self {
        Self {
            monthly_target,
            ..self.clone()
        }
    }

    /// Whether the current pace falls short of the target
    pub fn is_behind(&self) -> bool {
        self.difference < 0.0
    }
}

/// Metric plotted in heat map cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapMetric {
    #[default]
    Probability,
    Count,
}

impl HeatmapMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeatmapMetric::Probability => "probability",
            HeatmapMetric::Count => "count",
        }
    }
}

/// Heat map grid: `values[y][x]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub x_categories: Vec<String>,
    pub y_categories: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl Heatmap {
    /// Cell value, `None` outside the grid
    pub fn cell(&self, x: usize, y: usize) -> Option<f64> {
        self.values.get(y).and_then(|row| row.get(x)).copied()
    }
}

/// Variables the heat map can be pivoted on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapVariables {
    pub variables: Vec<String>,
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

impl HeatmapVariables {
    /// Variables offered as axes; `priority` is derived from the score and hidden.
    pub fn axis_choices(&self) -> Vec<&str> {
        self.variables
            .iter()
            .map(String::as_str)
            .filter(|v| *v != "priority")
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_deserializes() {
        let json = serde_json::json!({
            "total_clients": 1200,
            "churn_risk_mean": 0.31,
            "contacted": 340,
            "conversion_rate": 0.12,
            "at_risk_count": 87,
            "potential_clients": 410,
            "expected_conversion": 49.2,
            "financial_opportunity": 125000.0,
            "contact_progress": 0.68
        });
        let summary: MetricsSummary = serde_json::from_value(json).expect("valid summary");
        assert_eq!(summary.total_clients, 1200);
        assert_eq!(summary.at_risk_count, 87);
    }

    #[test]
    fn heatmap_cell_lookup() {
        let heatmap = Heatmap {
            x_categories: vec!["18-30".into(), "31-45".into()],
            y_categories: vec!["low".into()],
            values: vec![vec![0.2, 0.4]],
        };
        assert_eq!(heatmap.cell(1, 0), Some(0.4));
        assert_eq!(heatmap.cell(2, 0), None);
        assert_eq!(heatmap.cell(0, 1), None);
    }

    #[test]
    fn axis_choices_hide_priority() {
        let variables = HeatmapVariables {
            variables: vec!["age".into(), "priority".into(), "income_range".into()],
            categories: BTreeMap::new(),
        };
        assert_eq!(variables.axis_choices(), vec!["age", "income_range"]);
    }

    #[test]
    fn with_monthly_target_keeps_other_fields() {
        let progress = ContactProgress {
            total_contacted: 10,
            total_prioritized: 50,
            monthly_target: 40,
            contacted_this_month: 10,
            days_remaining: 12,
            daily_needed: 2.5,
            daily_expected: 1.5,
            difference: -12.0,
            remaining_contacts: 30,
            projection_message: "behind".into(),
        };
        let updated = progress.with_monthly_target(60);
        assert_eq!(updated.monthly_target, 60);
        assert_eq!(updated.remaining_contacts, 30);
        assert!(updated.is_behind());
    }
}
