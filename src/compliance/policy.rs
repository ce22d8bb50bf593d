//! Budgeting-policy (KUP) scoring
//!
//! Four fixed categories: theme alignment (20), strategic-objective
//! alignment (30), budget efficiency (25) and documentation completeness (25).

use crate::compliance::report::{CategoryResult, Verdict};
use crate::compliance::ruleset::PolicyRules;
use crate::compliance::Assessment;
use crate::proposal::{ProposalContent, SupportingDocuments};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

pub const THEME_WEIGHT: u32 = 20;
pub const OBJECTIVES_WEIGHT: u32 = 30;
pub const EFFICIENCY_WEIGHT: u32 = 25;
pub const DOCUMENTATION_WEIGHT: u32 = 25;

/// Points per declared objective that shares a keyword
const POINTS_PER_OBJECTIVE: u32 = 15;
/// Deducted when operational spending dominates the budget
const HIGH_OPERATIONAL_PENALTY: u32 = 10;
const HIGH_OPERATIONAL_RATIO: f64 = 0.7;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid regex"));

fn keywords(text: &str, stop_words: &HashSet<String>) -> HashSet<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| !stop_words.contains(w))
        .collect()
}

pub(crate) fn assess(content: &ProposalContent, rules: &PolicyRules) -> Assessment {
    let checks = [
        (theme_alignment(content, rules), theme_recommendation(content, rules)),
        (
            objective_alignment(content, rules),
            "Align strategic objectives with fokus pengembangan investasi dan penguatan kelembagaan".to_string(),
        ),
        (
            budget_efficiency(content),
            "Review budget allocation untuk meningkatkan efisiensi sesuai prinsip KUP".to_string(),
        ),
        (
            documentation_completeness(content),
            "Lengkapi dokumen pendukung: KAK, RAB, Timeline".to_string(),
        ),
    ];

    let mut assessment = Assessment::default();
    for (category, recommendation) in checks {
        if category.verdict != Verdict::Pass {
            assessment.recommendations.push(recommendation);
        }
        assessment.categories.push(category);
    }
    assessment
}

fn required_theme<'a>(content: &ProposalContent, rules: &'a PolicyRules) -> Option<&'a str> {
    rules
        .themes
        .get(&content.fiscal_year.to_string())
        .map(String::as_str)
}

fn theme_alignment(content: &ProposalContent, rules: &PolicyRules) -> CategoryResult {
    let (points, message) = match required_theme(content, rules) {
        Some(theme) if content.theme == theme => (
            THEME_WEIGHT,
            format!("Theme '{}' aligns with KUP {}", content.theme, content.fiscal_year),
        ),
        Some(theme) => (0, format!("Theme should be '{}'", theme)),
        None => (0, format!("No KUP theme defined for fiscal year {}", content.fiscal_year)),
    };
    CategoryResult::new("Theme alignment", points, THEME_WEIGHT, message)
}

fn theme_recommendation(content: &ProposalContent, rules: &PolicyRules) -> String {
    match required_theme(content, rules) {
        Some(theme) => format!(
            "Update RKAT theme to '{}' sesuai KUP {}",
            theme, content.fiscal_year
        ),
        None => format!("Tetapkan tema KUP untuk tahun anggaran {}", content.fiscal_year),
    }
}

fn objective_alignment(content: &ProposalContent, rules: &PolicyRules) -> CategoryResult {
    let stop_words: HashSet<String> = rules.stop_words.iter().map(|w| w.to_lowercase()).collect();
    let reference: Vec<HashSet<String>> = rules
        .strategic_objectives
        .iter()
        .map(|o| keywords(o, &stop_words))
        .collect();

    let aligned = content
        .strategic_objectives
        .iter()
        .filter(|objective| {
            let declared = keywords(objective, &stop_words);
            reference.iter().any(|r| !r.is_disjoint(&declared))
        })
        .count() as u32;

    let points = (aligned * POINTS_PER_OBJECTIVE).min(OBJECTIVES_WEIGHT);
    CategoryResult::new(
        "Strategic-objective alignment",
        points,
        OBJECTIVES_WEIGHT,
        format!(
            "{} of {} declared objectives align with KUP objectives ({}/{})",
            aligned,
            content.strategic_objectives.len(),
            points,
            OBJECTIVES_WEIGHT
        ),
    )
}

fn budget_efficiency(content: &ProposalContent) -> CategoryResult {
    let mut points = EFFICIENCY_WEIGHT;
    let mut message = format!("Budget efficiency score: {}/{}", points, EFFICIENCY_WEIGHT);

    if content.total_budget > 0.0 {
        let ratio = content.operational_budget / content.total_budget;
        if ratio > HIGH_OPERATIONAL_RATIO {
            points = points.saturating_sub(HIGH_OPERATIONAL_PENALTY);
            message = format!(
                "Operational budget is {:.1}% of total (above {:.0}%): {}/{}",
                ratio * 100.0,
                HIGH_OPERATIONAL_RATIO * 100.0,
                points,
                EFFICIENCY_WEIGHT
            );
        }
    }

    CategoryResult::new("Budget efficiency", points, EFFICIENCY_WEIGHT, message)
}

fn documentation_completeness(content: &ProposalContent) -> CategoryResult {
    let expected = content.line_items.len() * SupportingDocuments::REQUIRED;
    let present: usize = content
        .line_items
        .iter()
        .map(|item| item.documents.present_count())
        .sum();

    let points = if expected == 0 {
        0
    } else {
        (DOCUMENTATION_WEIGHT as f64 * present as f64 / expected as f64).round() as u32
    };

    CategoryResult::new(
        "Documentation completeness",
        points,
        DOCUMENTATION_WEIGHT,
        format!(
            "{} of {} supporting documents present ({}/{})",
            present, expected, points, DOCUMENTATION_WEIGHT
        ),
    )
}
