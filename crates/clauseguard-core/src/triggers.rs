//! Category trigger phrases for evidence re-derivation.
//!
//! When the generation service omits a snippet or quotes text that is not
//! actually present in the source, the normalizer falls back to scanning the
//! source for these phrases. One canonical table; matching is lowercase.

use crate::finding::Category;

/// Trigger phrases for a category, all lowercase.
pub fn trigger_phrases(category: Category) -> &'static [&'static str] {
    match category {
        Category::AutoRenewals => &[
            "auto-renew",
            "automatic renewal",
            "renews automatically",
            "renewal date",
            "cancel before",
        ],
        Category::DataPrivacy => &[
            "share your data",
            "sell your data",
            "third parties",
            "marketing partners",
            "affiliates",
            "personal data",
        ],
        Category::CancellationFees => &[
            "cancellation fee",
            "early termination fee",
            "penalty",
            "forfeit",
            "non-refundable",
        ],
        Category::UnilateralChanges => &[
            "we reserve the right to modify",
            "change these terms",
            "at any time without",
            "amend",
            "modify at our discretion",
        ],
        Category::Arbitration => &[
            "arbitration",
            "class action",
            "jury trial waiver",
            "binding arbitration",
            "dispute resolution",
        ],
        Category::LiabilityLimits => &[
            "limitation of liability",
            "not liable",
            "no liability",
            "indirect",
            "consequential",
            "punitive damages",
        ],
        Category::Jurisdiction => &[
            "governing law",
            "jurisdiction",
            "venue",
            "courts of",
            "state of",
        ],
    }
}

/// Whether `text` (any case) contains a trigger phrase for `category`.
pub fn matches_category(text: &str, category: Category) -> bool {
    let lc = text.to_lowercase();
    trigger_phrases(category).iter().any(|p| lc.contains(p))
}
