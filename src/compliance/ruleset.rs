//! Compliance rulesets
//!
//! A ruleset is named, versioned data. Two kinds exist: the budgeting policy
//! (KUP) and the unit-cost standard (SBO). Maps are ordered so the canonical
//! JSON, and therefore the checksum, is stable.

use crate::error::{not_found_error, ApiResult, AppError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

pub const KUP_2026: &str = "kup-2026";
pub const SBO_2026: &str = "sbo-2026";

/// Budgeting-policy rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRules {
    /// Required theme per fiscal year, keyed by the year as text
    #[serde(default)]
    pub themes: BTreeMap<String, String>,
    #[serde(default)]
    pub strategic_objectives: Vec<String>,
    /// Words that never count as a keyword match. Empty unless a ruleset
    /// file opts in.
    #[serde(default)]
    pub stop_words: Vec<String>,
}

/// Reference unit cost for one account code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCost {
    pub code: String,
    pub amount: f64,
}

/// Standard rates used by the budget estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardRates {
    pub meeting_package_fullday: f64,
    pub meeting_package_halfday: f64,
    pub meeting_equipment_rental: f64,
    pub documentation: f64,
    pub travel_domestic_per_day: f64,
    pub travel_overseas_per_day: f64,
}

impl Default for StandardRates {
    fn default() -> Self {
        Self {
            meeting_package_fullday: 635_000.0,
            meeting_package_halfday: 450_000.0,
            meeting_equipment_rental: 30_000_000.0,
            documentation: 20_000_000.0,
            travel_domestic_per_day: 1_500_000.0,
            travel_overseas_per_day: 3_000_000.0,
        }
    }
}

fn default_tolerance() -> f64 {
    10.0
}

fn default_partial_band() -> f64 {
    20.0
}

/// Unit-cost-standard rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostStandardRules {
    /// Account code -> reference standard
    #[serde(default)]
    pub standards: BTreeMap<String, UnitCost>,
    /// Variance (percent) still considered conforming
    #[serde(default = "default_tolerance")]
    pub tolerance_pct: f64,
    /// Variance (percent) that still earns partial credit
    #[serde(default = "default_partial_band")]
    pub partial_band_pct: f64,
    #[serde(default)]
    pub rates: StandardRates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rules {
    Policy(PolicyRules),
    CostStandard(CostStandardRules),
}

impl Rules {
    pub fn kind(&self) -> &'static str {
        match self {
            Rules::Policy(_) => "policy",
            Rules::CostStandard(_) => "cost_standard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ruleset {
    pub id: String,
    pub version: u32,
    pub name: String,
    pub rules: Rules,
}

impl Ruleset {
    /// SHA-256 over the canonical JSON form, hex encoded
    pub fn checksum(&self) -> String {
        // strings, numbers and string-keyed maps only; serialization cannot fail
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        format!("{:x}", hasher.finalize())
    }

    /// Budgeting policy for fiscal year 2026
    pub fn kup_2026() -> Self {
        let mut themes = BTreeMap::new();
        themes.insert("2026".to_string(), "Institutional Strengthening".to_string());

        Self {
            id: KUP_2026.to_string(),
            version: 1,
            name: "Kebijakan Umum Penganggaran 2026".to_string(),
            rules: Rules::Policy(PolicyRules {
                themes,
                strategic_objectives: vec![
                    "Pengembangan investasi pada ekosistem haji dan umroh".to_string(),
                    "Amandemen peraturan untuk penguatan kelembagaan dan tata kelola BPKH".to_string(),
                ],
                stop_words: Vec::new(),
            }),
        }
    }

    /// Unit-cost standards for fiscal year 2026
    pub fn sbo_2026() -> Self {
        let standards = [
            ("522111", "konsumsi_rapat", 125_000.0),
            ("522113", "atk", 5_000_000.0),
            ("522114", "dokumentasi", 20_000_000.0),
            ("522121", "jasa_konsultan", 500_000_000.0),
            ("522124", "honorarium_narasumber", 1_000_000.0),
            ("522512", "paket_meeting", 635_000.0),
            ("522514", "sewa_perlengkapan", 30_000_000.0),
            ("522515", "uang_saku", 250_000.0),
            ("522517", "uang_harian", 300_000.0),
        ]
        .into_iter()
        .map(|(account, code, amount)| {
            (
                account.to_string(),
                UnitCost {
                    code: code.to_string(),
                    amount,
                },
            )
        })
        .collect();

        Self {
            id: SBO_2026.to_string(),
            version: 1,
            name: "Standar Biaya Operasional 2026".to_string(),
            rules: Rules::CostStandard(CostStandardRules {
                standards,
                tolerance_pct: default_tolerance(),
                partial_band_pct: default_partial_band(),
                rates: StandardRates::default(),
            }),
        }
    }
}

/// Ruleset listing entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesetSummary {
    pub id: String,
    pub version: u32,
    pub name: String,
    pub kind: &'static str,
    pub checksum: String,
}

/// Rulesets available for scoring, keyed by id
#[derive(Debug, Clone, Default)]
pub struct RulesetRegistry {
    rulesets: BTreeMap<String, Ruleset>,
}

impl RulesetRegistry {
    /// Registry holding the built-in rulesets
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        registry.insert(Ruleset::kup_2026());
        registry.insert(Ruleset::sbo_2026());
        registry
    }

    /// Add or replace a ruleset; returns the replaced one
    pub fn insert(&mut self, ruleset: Ruleset) -> Option<Ruleset> {
        debug!("Registering ruleset {} v{}", ruleset.id, ruleset.version);
        self.rulesets.insert(ruleset.id.clone(), ruleset)
    }

    /// Merge rulesets from a JSON array
    pub fn merge_json(&mut self, json: &str) -> Result<usize, AppError> {
        let rulesets: Vec<Ruleset> = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("Invalid ruleset file: {}", e)))?;
        if rulesets.iter().any(|r| r.id.trim().is_empty()) {
            return Err(AppError::Config("Ruleset id must not be empty".to_string()));
        }
        let count = rulesets.len();
        for ruleset in rulesets {
            self.insert(ruleset);
        }
        Ok(count)
    }

    /// Merge rulesets from a JSON file on disk
    pub fn load_file(&mut self, path: &Path) -> Result<usize, AppError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read rulesets from {}: {}", path.display(), e))
        })?;
        let count = self.merge_json(&json)?;
        info!("📚 Loaded {} ruleset(s) from {}", count, path.display());
        Ok(count)
    }

    pub fn get(&self, id: &str) -> ApiResult<&Ruleset> {
        self.rulesets
            .get(id)
            .ok_or_else(|| not_found_error(format!("Ruleset '{}' not found", id)))
    }

    /// First cost-standard ruleset, used by the estimator when none is named
    pub fn default_cost_standard(&self) -> Option<&Ruleset> {
        self.rulesets
            .get(SBO_2026)
            .or_else(|| {
                self.rulesets
                    .values()
                    .find(|r| matches!(r.rules, Rules::CostStandard(_)))
            })
    }

    pub fn list(&self) -> Vec<RulesetSummary> {
        self.rulesets
            .values()
            .map(|r| RulesetSummary {
                id: r.id.clone(),
                version: r.version,
                name: r.name.clone(),
                kind: r.rules.kind(),
                checksum: r.checksum(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rulesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rulesets.is_empty()
    }
}
