//! Compliance report types

use serde::{Deserialize, Serialize};

/// Outcome of one scoring category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Partial,
    Fail,
}

impl Verdict {
    /// PASS at 75% of the weight or more, PARTIAL above zero, FAIL at zero
    pub fn from_points(points: u32, weight: u32) -> Self {
        if points == 0 {
            Verdict::Fail
        } else if points * 4 >= weight * 3 {
            Verdict::Pass
        } else {
            Verdict::Partial
        }
    }
}

/// Overall level derived from the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceLevel {
    Poor,
    NeedsImprovement,
    Satisfactory,
    Good,
    Excellent,
}

impl ComplianceLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 90 => ComplianceLevel::Excellent,
            80..=89 => ComplianceLevel::Good,
            70..=79 => ComplianceLevel::Satisfactory,
            60..=69 => ComplianceLevel::NeedsImprovement,
            _ => ComplianceLevel::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    pub name: String,
    pub points: u32,
    pub weight: u32,
    pub verdict: Verdict,
    pub message: String,
}

impl CategoryResult {
    pub fn new(name: &str, points: u32, weight: u32, message: String) -> Self {
        let points = points.min(weight);
        Self {
            name: name.to_string(),
            points,
            weight,
            verdict: Verdict::from_points(points, weight),
            message,
        }
    }
}

/// Cost-standard check of a single line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemFinding {
    pub code: String,
    pub name: String,
    pub proposed_amount: f64,
    /// Reference standard (e.g. `konsumsi_rapat`), `None` for unknown codes
    pub standard_code: Option<String>,
    pub standard_amount: Option<f64>,
    /// Percentage deviation from the standard amount
    pub variance_pct: Option<f64>,
    pub conforming: bool,
    /// 0 to 100
    pub score: f64,
    pub message: String,
}

/// Advisory compliance result. Never gates a workflow transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub ruleset_id: String,
    pub ruleset_version: u32,
    /// SHA-256 of the ruleset's canonical JSON
    pub ruleset_checksum: String,
    pub total_score: u32,
    pub level: ComplianceLevel,
    pub categories: Vec<CategoryResult>,
    pub recommendations: Vec<String>,
    pub line_items: Vec<LineItemFinding>,
}
