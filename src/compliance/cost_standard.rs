//! Unit-cost-standard (SBO) checks and the standard-rate budget estimator

use crate::compliance::report::{CategoryResult, LineItemFinding, Verdict};
use crate::compliance::ruleset::{CostStandardRules, StandardRates};
use crate::compliance::Assessment;
use crate::proposal::{LineItem, ProposalContent};
use serde::{Deserialize, Serialize};

pub const CONFORMANCE_WEIGHT: u32 = 100;

/// Lowest score an item inside the partial band can receive
const PARTIAL_FLOOR: f64 = 50.0;

/// Check one line item against the standard for its account code
pub fn check_line_item(item: &LineItem, rules: &CostStandardRules) -> LineItemFinding {
    let Some(standard) = rules.standards.get(&item.code) else {
        return LineItemFinding {
            code: item.code.clone(),
            name: item.name.clone(),
            proposed_amount: item.amount,
            standard_code: None,
            standard_amount: None,
            variance_pct: None,
            conforming: false,
            score: 0.0,
            message: format!("No SBO reference found for account {}", item.code),
        };
    };

    let (variance, score) = if standard.amount > 0.0 {
        let variance = (item.amount - standard.amount) / standard.amount * 100.0;
        let deviation = variance.abs();
        let score = if deviation <= rules.tolerance_pct {
            100.0
        } else if deviation <= rules.partial_band_pct {
            (100.0 - 2.0 * deviation).max(PARTIAL_FLOOR)
        } else {
            0.0
        };
        (variance, score)
    } else if item.amount == 0.0 {
        (0.0, 100.0)
    } else {
        // A zero standard admits no positive amount
        (f64::INFINITY, 0.0)
    };

    let conforming = variance.abs() <= rules.tolerance_pct;
    let message = if variance.is_finite() {
        format!("Variance: {:.1}% from SBO standard {}", variance, standard.code)
    } else {
        format!("SBO standard {} allows no spending", standard.code)
    };

    LineItemFinding {
        code: item.code.clone(),
        name: item.name.clone(),
        proposed_amount: item.amount,
        standard_code: Some(standard.code.clone()),
        standard_amount: Some(standard.amount),
        variance_pct: variance.is_finite().then_some(variance),
        conforming,
        score,
        message,
    }
}

pub(crate) fn assess(content: &ProposalContent, rules: &CostStandardRules) -> Assessment {
    let findings: Vec<LineItemFinding> = content
        .line_items
        .iter()
        .map(|item| check_line_item(item, rules))
        .collect();

    let points = if findings.is_empty() {
        0
    } else {
        let mean = findings.iter().map(|f| f.score).sum::<f64>() / findings.len() as f64;
        mean.round() as u32
    };
    let conforming = findings.iter().filter(|f| f.conforming).count();

    let category = CategoryResult::new(
        "Unit cost conformance",
        points,
        CONFORMANCE_WEIGHT,
        format!(
            "{} of {} line items within {:.0}% of the SBO standard",
            conforming,
            findings.len(),
            rules.tolerance_pct
        ),
    );

    let mut recommendations = Vec::new();
    if category.verdict != Verdict::Pass {
        recommendations.push(
            "Sesuaikan nilai anggaran per akun dengan Standar Biaya Operasional".to_string(),
        );
    }

    Assessment {
        categories: vec![category],
        recommendations,
        line_items: findings,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingPackage {
    #[default]
    Fullday,
    Halfday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    #[default]
    Domestic,
    Overseas,
}

fn one() -> u32 {
    1
}

/// Activity to estimate from standard rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "activity", rename_all = "snake_case")]
pub enum EstimateRequest {
    Meeting {
        participants: u32,
        #[serde(default = "one")]
        days: u32,
        #[serde(default)]
        package: MeetingPackage,
    },
    Travel {
        travellers: u32,
        #[serde(default = "one")]
        days: u32,
        #[serde(default)]
        destination: Destination,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateLine {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub breakdown: Vec<EstimateLine>,
    pub total: f64,
}

/// Budget for an activity at standard rates
pub fn estimate(request: &EstimateRequest, rates: &StandardRates) -> Estimate {
    let line = |label: &str, amount: f64| EstimateLine {
        label: label.to_string(),
        amount,
    };

    let breakdown = match *request {
        EstimateRequest::Meeting {
            participants,
            days,
            package,
        } => {
            let rate = match package {
                MeetingPackage::Fullday => rates.meeting_package_fullday,
                MeetingPackage::Halfday => rates.meeting_package_halfday,
            };
            vec![
                line("meeting_package", rate * participants as f64 * days as f64),
                line("equipment_rental", rates.meeting_equipment_rental),
                line("documentation", rates.documentation),
            ]
        }
        EstimateRequest::Travel {
            travellers,
            days,
            destination,
        } => {
            let rate = match destination {
                Destination::Domestic => rates.travel_domestic_per_day,
                Destination::Overseas => rates.travel_overseas_per_day,
            };
            vec![line("daily_allowance", rate * travellers as f64 * days as f64)]
        }
    };

    let total = breakdown.iter().map(|l| l.amount).sum();
    Estimate { breakdown, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::ruleset::{Rules, Ruleset};
    use crate::proposal::SupportingDocuments;
    use crate::test_support::content;
    use pretty_assertions::assert_eq;

    fn sbo() -> CostStandardRules {
        match Ruleset::sbo_2026().rules {
            Rules::CostStandard(rules) => rules,
            other => panic!("unexpected rules {:?}", other),
        }
    }

    fn item(code: &str, amount: f64) -> LineItem {
        LineItem {
            code: code.to_string(),
            name: format!("Item {}", code),
            amount,
            documents: SupportingDocuments::default(),
        }
    }

    #[test]
    fn test_item_within_tolerance_conforms() {
        let finding = check_line_item(&item("522111", 130_000.0), &sbo());
        assert!(finding.conforming);
        assert_eq!(finding.score, 100.0);
        assert_eq!(finding.standard_code.as_deref(), Some("konsumsi_rapat"));
        assert_eq!(finding.variance_pct, Some(4.0));
    }

    #[test]
    fn test_partial_band_scoring() {
        // +15% -> 100 - 30
        let finding = check_line_item(&item("522111", 143_750.0), &sbo());
        assert!(!finding.conforming);
        assert!((finding.score - 70.0).abs() < 1e-9);

        // -20% is still inside the band -> 60
        let finding = check_line_item(&item("522111", 100_000.0), &sbo());
        assert!((finding.score - 60.0).abs() < 1e-9);

        let finding = check_line_item(&item("522111", 200_000.0), &sbo());
        assert_eq!(finding.score, 0.0);
    }

    #[test]
    fn test_unknown_code_has_no_reference() {
        let finding = check_line_item(&item("599999", 1.0), &sbo());
        assert_eq!(finding.standard_code, None);
        assert_eq!(finding.variance_pct, None);
        assert_eq!(finding.score, 0.0);
        assert!(!finding.conforming);
    }

    #[test]
    fn test_report_averages_item_scores() {
        let mut c = content();
        c.line_items = vec![
            item("522111", 125_000.0),
            item("522113", 5_750_000.0),
            item("599999", 10.0),
        ];
        let assessment = assess(&c, &sbo());
        // (100 + 70 + 0) / 3 = 56.67
        assert_eq!(assessment.categories[0].points, 57);
        assert_eq!(assessment.categories[0].verdict, Verdict::Partial);
        assert_eq!(assessment.line_items.len(), 3);
        assert_eq!(assessment.line_items[2].code, "599999");
        assert_eq!(assessment.recommendations.len(), 1);
    }

    #[test]
    fn test_report_without_line_items_fails() {
        let assessment = assess(&content(), &sbo());
        assert_eq!(assessment.categories[0].points, 0);
        assert_eq!(assessment.categories[0].verdict, Verdict::Fail);
        assert!(assessment.line_items.is_empty());
    }

    #[test]
    fn test_meeting_estimate() {
        let request = EstimateRequest::Meeting {
            participants: 40,
            days: 2,
            package: MeetingPackage::Fullday,
        };
        let estimate = estimate(&request, &StandardRates::default());
        assert_eq!(estimate.breakdown[0].amount, 50_800_000.0);
        assert_eq!(estimate.total, 100_800_000.0);
    }

    #[test]
    fn test_travel_estimate_from_json() {
        let request: EstimateRequest = serde_json::from_value(serde_json::json!({
            "activity": "travel",
            "travellers": 3,
            "days": 4,
            "destination": "overseas"
        }))
        .unwrap();
        let estimate = estimate(&request, &StandardRates::default());
        assert_eq!(estimate.total, 36_000_000.0);
        assert_eq!(estimate.breakdown.len(), 1);
    }
}
