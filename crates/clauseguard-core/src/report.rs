//! Aggregate analysis result and derived summary.
//!
//! The summary's `risk_level` is computed here from the finding list and is
//! deliberately independent of the service-reported `overall_risk`: the
//! generation service is not trusted to keep its verdict consistent with its
//! own findings. Both values are reported; neither corrects the other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::finding::{Category, Finding, RiskTier};

/// Overall severity verdict computed from finding counts.
///
/// Distinct from [`RiskTier`]: it adds `VeryLow` for documents where nothing
/// meaningful was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::VeryLow => "🟢",
            Self::Low => "✅",
            Self::Medium => "⚠️",
            Self::High => "🚨",
        }
    }

    /// Fixed scoring rule over per-tier finding counts.
    pub fn from_counts(high: usize, medium: usize, low: usize) -> Self {
        if high > 0 {
            Self::High
        } else if medium > 1 {
            Self::Medium
        } else if medium > 0 || low > 2 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived tallies over a finding list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_findings: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    /// Finding count per category; categories with no findings are omitted.
    pub by_category: BTreeMap<Category, usize>,
    pub has_risky_clauses: bool,
    /// Independently computed verdict (see [`RiskLevel::from_counts`]).
    pub risk_level: RiskLevel,
}

impl Summary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let high = findings.iter().filter(|f| f.risk == RiskTier::High).count();
        let medium = findings
            .iter()
            .filter(|f| f.risk == RiskTier::Medium)
            .count();
        let low = findings.iter().filter(|f| f.risk == RiskTier::Low).count();

        let mut by_category = BTreeMap::new();
        for f in findings {
            *by_category.entry(f.category).or_insert(0) += 1;
        }

        Summary {
            total_findings: findings.len(),
            high_risk: high,
            medium_risk: medium,
            low_risk: low,
            by_category,
            has_risky_clauses: !findings.is_empty(),
            risk_level: RiskLevel::from_counts(high, medium, low),
        }
    }
}

/// Complete result of one analysis call.
///
/// Findings keep the generation service's order; that order carries no
/// guaranteed meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub findings: Vec<Finding>,
    /// Service-reported overall risk, as-is.
    pub overall_risk: RiskTier,
    /// Service-reported prose assessment.
    pub verdict: String,
    pub summary: Summary,
    /// Length of the analyzed text, in chars.
    pub input_chars: usize,
    /// RFC 3339 timestamp of when the analysis completed.
    pub analyzed_at: String,
}

impl Analysis {
    /// Assemble a result, computing the derived summary.
    pub fn new(
        findings: Vec<Finding>,
        overall_risk: RiskTier,
        verdict: String,
        input_chars: usize,
    ) -> Self {
        let summary = Summary::from_findings(&findings);
        Analysis {
            findings,
            overall_risk,
            verdict,
            summary,
            input_chars,
            analyzed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
