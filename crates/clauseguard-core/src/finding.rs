//! Clause taxonomy and per-finding types.
//!
//! Category and risk-tier spellings match the generation service's JSON
//! vocabulary exactly; parsing is tolerant (case-insensitive, trimmed)
//! because the service is not trusted to reproduce them faithfully.

use serde::{Deserialize, Serialize};

/// Fixed taxonomy of clause categories the analyzer detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Auto-Renewals")]
    AutoRenewals,
    #[serde(rename = "Data Privacy / Data Selling")]
    DataPrivacy,
    #[serde(rename = "Cancellation Fees or Penalties")]
    CancellationFees,
    #[serde(rename = "Unilateral Changes")]
    UnilateralChanges,
    #[serde(rename = "Arbitration / No Class Action")]
    Arbitration,
    #[serde(rename = "Limitation of Liability")]
    LiabilityLimits,
    #[serde(rename = "Jurisdiction & Governing Law")]
    Jurisdiction,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 7] = [
        Category::AutoRenewals,
        Category::DataPrivacy,
        Category::CancellationFees,
        Category::UnilateralChanges,
        Category::Arbitration,
        Category::LiabilityLimits,
        Category::Jurisdiction,
    ];

    /// Canonical display/wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoRenewals => "Auto-Renewals",
            Self::DataPrivacy => "Data Privacy / Data Selling",
            Self::CancellationFees => "Cancellation Fees or Penalties",
            Self::UnilateralChanges => "Unilateral Changes",
            Self::Arbitration => "Arbitration / No Class Action",
            Self::LiabilityLimits => "Limitation of Liability",
            Self::Jurisdiction => "Jurisdiction & Governing Law",
        }
    }

    /// Tolerant parse of a service-reported category string.
    ///
    /// Returns `None` for anything outside the fixed taxonomy.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }

    /// Icon for terminal/report display.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::AutoRenewals => "🔄",
            Self::DataPrivacy => "🔒",
            Self::CancellationFees => "💰",
            Self::UnilateralChanges => "📝",
            Self::Arbitration => "⚖️",
            Self::LiabilityLimits => "🛡️",
            Self::Jurisdiction => "🌍",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-finding severity as reported by the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Tolerant parse; unknown or missing tiers default to `Low` at call sites.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Low => "✅",
            Self::Medium => "⚠️",
            Self::High => "🚨",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected risky clause.
///
/// `snippet` is grounded: the normalizer guarantees it is either a verbatim
/// substring of the analyzed text or the deterministic fallback slice, never
/// an unverified quote from the generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub risk: RiskTier,
    /// Plain-English summary, at most two sentences.
    pub summary: String,
    /// Consequence for the user.
    pub why_it_matters: String,
    /// Verbatim evidence from the source text.
    pub snippet: String,
}
