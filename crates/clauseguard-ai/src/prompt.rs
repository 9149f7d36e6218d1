//! Analysis prompt construction.
//!
//! The prompt embeds the fixed category taxonomy, the JSON-only output
//! rules, and the contract text after [`CONTRACT_MARKER`]. The marker is
//! load-bearing: the normalizer locates it in the prompt to recover the
//! original text for snippet verification.

/// Delimiter between the instruction block and the contract text.
pub const CONTRACT_MARKER: &str = "Contract Text to Analyze:\n";

/// Build the single instruction string sent as the user message.
///
/// Pure function; no failure mode.
pub fn build_analysis_prompt(contract_text: &str) -> String {
    format!(
        r#"You are a legal language analyst. Analyze the provided Terms text and detect clauses that could be harmful, misleading, or expensive for the user.

Categories to detect (non-exhaustive): Auto-Renewals; Data Privacy / Data Selling; Cancellation Fees or Penalties; Unilateral Changes; Arbitration / No Class Action; Limitation of Liability; Jurisdiction & Governing Law.

Rules:
- Return ONLY valid JSON. No prose before or after.
- Include up to 10 clauses if present (not just one).
- For each clause, the field "snippet" MUST be a verbatim substring copied from the provided contract text. Prefer a single sentence or the smallest span (<= 240 chars) that evidences the clause.
- Keep summaries concise (<= 2 sentences). Risk: Low/Medium/High.

JSON schema:
{{
  "clauses": [
    {{
      "category": "Auto-Renewals | Data Privacy / Data Selling | Cancellation Fees or Penalties | Unilateral Changes | Arbitration / No Class Action | Limitation of Liability | Jurisdiction & Governing Law",
      "summary": "Plain English summary",
      "risk": "Low|Medium|High",
      "whyItMatters": "Brief reason",
      "snippet": "verbatim substring from the input"
    }}
  ],
  "overallRisk": "Low|Medium|High",
  "totalClauses": 0,
  "summary": "Overall assessment"
}}

{CONTRACT_MARKER}{contract_text}"#
    )
}

/// Recover the contract text that a prompt was built from.
///
/// Returns `None` when the marker is absent (the prompt did not come from
/// [`build_analysis_prompt`]).
pub fn recover_contract_text(prompt: &str) -> Option<&str> {
    prompt
        .find(CONTRACT_MARKER)
        .map(|idx| &prompt[idx + CONTRACT_MARKER.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_ends_with_contract_text() {
        let prompt = build_analysis_prompt("The quick brown contract.");
        assert!(prompt.ends_with("The quick brown contract."));
        assert!(prompt.contains(CONTRACT_MARKER));
    }

    #[test]
    fn prompt_names_every_category() {
        let prompt = build_analysis_prompt("x");
        for cat in clauseguard_core::Category::ALL {
            assert!(prompt.contains(cat.as_str()), "missing {cat}");
        }
    }

    #[test]
    fn recover_round_trips() {
        let text = "Clause one. Clause two.";
        let prompt = build_analysis_prompt(text);
        assert_eq!(recover_contract_text(&prompt), Some(text));
    }

    #[test]
    fn recover_rejects_foreign_prompt() {
        assert_eq!(recover_contract_text("no marker here"), None);
    }
}
