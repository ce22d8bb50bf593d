//! Compliance scoring
//!
//! Scores a proposal against a named ruleset. Scoring is read-only and
//! deterministic: the same proposal and ruleset always serialize to the same
//! report. Reports are advisory and never gate a transition.

mod cost_standard;
mod policy;
mod report;
mod ruleset;

pub use cost_standard::{
    check_line_item, estimate, Destination, Estimate, EstimateLine, EstimateRequest, MeetingPackage,
};
pub use report::{CategoryResult, ComplianceLevel, ComplianceReport, LineItemFinding, Verdict};
pub use ruleset::{
    CostStandardRules, PolicyRules, Rules, Ruleset, RulesetRegistry, RulesetSummary, StandardRates,
    UnitCost, KUP_2026, SBO_2026,
};

use crate::proposal::Proposal;
use tracing::debug;

/// Category results of one scorer, before they are totalled
#[derive(Debug, Default)]
pub(crate) struct Assessment {
    pub categories: Vec<CategoryResult>,
    pub recommendations: Vec<String>,
    pub line_items: Vec<LineItemFinding>,
}

/// Score a proposal against a ruleset
pub fn score(proposal: &Proposal, ruleset: &Ruleset) -> ComplianceReport {
    let assessment = match &ruleset.rules {
        Rules::Policy(rules) => policy::assess(&proposal.content, rules),
        Rules::CostStandard(rules) => cost_standard::assess(&proposal.content, rules),
    };

    let total_score = assessment
        .categories
        .iter()
        .map(|c| c.points)
        .sum::<u32>()
        .min(100);

    debug!(
        "Scored proposal {} against {} v{}: {}",
        proposal.id, ruleset.id, ruleset.version, total_score
    );

    ComplianceReport {
        ruleset_id: ruleset.id.clone(),
        ruleset_version: ruleset.version,
        ruleset_checksum: ruleset.checksum(),
        total_score,
        level: ComplianceLevel::from_score(total_score),
        categories: assessment.categories,
        recommendations: assessment.recommendations,
        line_items: assessment.line_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{LineItem, SupportingDocuments};
    use crate::test_support::{content, principal_ids};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn draft() -> Proposal {
        Proposal::draft(principal_ids().proposer, content(), Utc::now())
    }

    #[test]
    fn test_matching_theme_without_objectives_or_items_is_poor() {
        let report = score(&draft(), &Ruleset::kup_2026());

        let points: Vec<u32> = report.categories.iter().map(|c| c.points).collect();
        assert_eq!(points, vec![20, 0, 25, 0]);
        assert_eq!(report.total_score, 45);
        assert_eq!(report.level, ComplianceLevel::Poor);
        assert_eq!(report.ruleset_id, KUP_2026);
        assert_eq!(report.recommendations.len(), 2);
    }

    #[test]
    fn test_fully_compliant_proposal_is_excellent() {
        let mut proposal = draft();
        proposal.content.strategic_objectives = vec![
            "Pengembangan investasi haji".to_string(),
            "Penguatan tata kelola".to_string(),
        ];
        proposal.content.line_items = vec![LineItem {
            code: "522111".to_string(),
            name: "Konsumsi rapat".to_string(),
            amount: 125_000.0,
            documents: SupportingDocuments {
                justification: Some("kak.pdf".to_string()),
                cost_breakdown: Some("rab.xlsx".to_string()),
                timeline: Some("timeline.pdf".to_string()),
            },
        }];

        let report = score(&proposal, &Ruleset::kup_2026());
        assert_eq!(report.total_score, 100);
        assert_eq!(report.level, ComplianceLevel::Excellent);
        assert!(report.recommendations.is_empty());

        let sbo = score(&proposal, &Ruleset::sbo_2026());
        assert_eq!(sbo.total_score, 100);
        assert_eq!(sbo.line_items.len(), 1);
    }

    #[test]
    fn test_identical_inputs_serialize_identically() {
        let proposal = draft();
        let ruleset = Ruleset::kup_2026();
        let a = serde_json::to_vec(&score(&proposal, &ruleset)).unwrap();
        let b = serde_json::to_vec(&score(&proposal, &ruleset)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ruleset_without_theme_degrades_to_zero() {
        let ruleset = Ruleset {
            id: "kup-empty".to_string(),
            version: 1,
            name: "Empty".to_string(),
            rules: Rules::Policy(PolicyRules {
                themes: Default::default(),
                strategic_objectives: Vec::new(),
                stop_words: Vec::new(),
            }),
        };
        let report = score(&draft(), &ruleset);
        assert_eq!(report.categories[0].points, 0);
        assert_eq!(report.total_score, 25);
    }

    #[test]
    fn test_scoring_does_not_touch_proposal() {
        let proposal = draft();
        let before = proposal.clone();
        score(&proposal, &Ruleset::sbo_2026());
        assert_eq!(proposal, before);
    }
}
