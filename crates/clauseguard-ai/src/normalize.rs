//! Best-effort normalization of raw generation-service output.
//!
//! The service is untrusted for factual grounding: its quoted snippets are
//! verified against the source text and re-derived deterministically when
//! verification fails, so a hallucinated quote never reaches the caller as
//! verbatim evidence.
//!
//! Parsing runs an ordered strategy chain, each step returning
//! success-or-next-strategy: strict JSON parse, then the first-`{`/last-`}`
//! slice (handles prose wrapped around the payload), then a trigger-phrase
//! scan of the raw text. The chain never fails; the worst case is an empty
//! Low-risk result.

use serde::Deserialize;

use clauseguard_core::{Category, Finding, RiskTier, trigger_phrases};

use crate::prompt::recover_contract_text;

/// Snippets longer than this are truncated with a trailing ellipsis.
const MAX_SNIPPET_CHARS: usize = 240;

/// Generic fallback slice length when no trigger phrase matches.
const FALLBACK_SNIPPET_CHARS: usize = 200;

/// Normalizer output; the orchestrator attaches the derived summary.
#[derive(Debug)]
pub struct Normalized {
    pub findings: Vec<Finding>,
    pub overall_risk: RiskTier,
    pub verdict: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    clauses: Option<Vec<RawClause>>,
    #[serde(default)]
    overall_risk: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClause {
    #[serde(default)]
    category: String,
    #[serde(default)]
    risk: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    why_it_matters: String,
    #[serde(default)]
    snippet: String,
}

/// Turn raw service output into grounded findings.
///
/// `prompt` is the prompt the response answers; the contract text is
/// recovered from it for snippet verification. Never fails.
pub fn normalize_response(raw: &str, prompt: &str) -> Normalized {
    let contract = recover_contract_text(prompt).unwrap_or("");

    let parsed = parse_strict(raw)
        .or_else(|| parse_embedded(raw))
        .unwrap_or_else(|| scan_heuristic(raw));

    let mut findings = Vec::new();
    for clause in parsed.clauses.unwrap_or_default() {
        // Categories outside the fixed taxonomy are dropped rather than
        // guessed at.
        let Some(category) = Category::parse(&clause.category) else {
            continue;
        };
        let risk = RiskTier::parse(&clause.risk).unwrap_or(RiskTier::Low);
        let snippet = ground_snippet(&clause.snippet, contract, category);
        findings.push(Finding {
            category,
            risk,
            summary: clause.summary,
            why_it_matters: clause.why_it_matters,
            snippet,
        });
    }

    let overall_risk = parsed
        .overall_risk
        .as_deref()
        .and_then(RiskTier::parse)
        .unwrap_or(RiskTier::Low);
    let verdict = parsed
        .summary
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "Analysis completed".to_string());

    Normalized {
        findings,
        overall_risk,
        verdict,
    }
}

// ── Parse strategies ──

/// Strategy 1: the whole response is the JSON payload.
fn parse_strict(raw: &str) -> Option<RawAnalysis> {
    serde_json::from_str::<RawAnalysis>(raw)
        .ok()
        .filter(|p| p.clauses.is_some())
}

/// Strategy 2: JSON payload wrapped in prose; parse the outermost braces.
fn parse_embedded(raw: &str) -> Option<RawAnalysis> {
    let first = raw.find('{')?;
    let last = raw.rfind('}')?;
    if last <= first {
        return None;
    }
    serde_json::from_str::<RawAnalysis>(&raw[first..=last])
        .ok()
        .filter(|p| p.clauses.is_some())
}

/// Strategy 3: no payload at all; scan the text for category trigger
/// phrases and synthesize at most one generic Low finding per match. The
/// snippet is left empty here and backfilled by grounding, so this path
/// never invents a quote.
fn scan_heuristic(raw: &str) -> RawAnalysis {
    let lc = raw.to_lowercase();
    let clauses = Category::ALL
        .iter()
        .filter(|cat| trigger_phrases(**cat).iter().any(|p| lc.contains(p)))
        .map(|cat| RawClause {
            category: cat.as_str().to_string(),
            risk: "Low".to_string(),
            summary: format!("The response mentions {cat} language."),
            why_it_matters: "Detected by keyword scan only; review the quoted text directly."
                .to_string(),
            snippet: String::new(),
        })
        .collect();

    RawAnalysis {
        clauses: Some(clauses),
        overall_risk: Some("Low".to_string()),
        summary: Some("Analysis completed (text parsing)".to_string()),
    }
}

// ── Snippet grounding ──

/// Verify a reported snippet against the source, re-deriving on failure.
fn ground_snippet(reported: &str, contract: &str, category: Category) -> String {
    let trimmed = reported.trim();
    if !trimmed.is_empty() && contract.contains(trimmed) {
        return truncate_snippet(trimmed);
    }
    derive_snippet(contract, category)
}

/// Deterministic snippet: first sentence containing a trigger phrase for
/// the category, else the first [`FALLBACK_SNIPPET_CHARS`] chars of the
/// source.
pub fn derive_snippet(contract: &str, category: Category) -> String {
    for sentence in split_sentences(contract) {
        let lc = sentence.to_lowercase();
        if trigger_phrases(category).iter().any(|p| lc.contains(p)) {
            return truncate_snippet(sentence);
        }
    }
    take_chars(contract, FALLBACK_SNIPPET_CHARS)
}

/// Split on sentence-ending punctuation followed by whitespace.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, ch)) = iter.next() {
        if matches!(ch, '.' | '!' | '?')
            && let Some((_, next)) = iter.peek()
            && next.is_whitespace()
        {
            let end = idx + ch.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

fn truncate_snippet(snippet: &str) -> String {
    if snippet.chars().count() <= MAX_SNIPPET_CHARS {
        snippet.to_string()
    } else {
        let mut out = take_chars(snippet, MAX_SNIPPET_CHARS - 3);
        out.push_str("...");
        out
    }
}

fn take_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::build_analysis_prompt;

    const RENEWAL_TEXT: &str = "Welcome to the service. Your subscription will \
automatically renew unless canceled 30 days before the renewal date. \
Disputes go to binding arbitration in Delaware.";

    fn clause_json(category: &str, risk: &str, snippet: &str) -> String {
        format!(
            r#"{{"category":"{category}","risk":"{risk}","summary":"s","whyItMatters":"w","snippet":"{snippet}"}}"#
        )
    }

    #[test]
    fn strict_parse_accepts_clean_json() {
        let raw = format!(
            r#"{{"clauses":[{}],"overallRisk":"High","summary":"bad"}}"#,
            clause_json("Auto-Renewals", "High", "")
        );
        let prompt = build_analysis_prompt(RENEWAL_TEXT);
        let out = normalize_response(&raw, &prompt);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.overall_risk, RiskTier::High);
        assert_eq!(out.verdict, "bad");
    }

    #[test]
    fn embedded_parse_strips_surrounding_prose() {
        let raw = r#"Here you go: {"clauses":[],"overallRisk":"Low"} thanks"#;
        let prompt = build_analysis_prompt(RENEWAL_TEXT);
        let out = normalize_response(raw, &prompt);
        assert!(out.findings.is_empty());
        assert_eq!(out.overall_risk, RiskTier::Low);
    }

    #[test]
    fn heuristic_scan_synthesizes_from_trigger_phrases() {
        let raw = "The document includes binding arbitration and an automatic renewal clause.";
        let prompt = build_analysis_prompt(RENEWAL_TEXT);
        let out = normalize_response(raw, &prompt);

        let cats: Vec<Category> = out.findings.iter().map(|f| f.category).collect();
        assert!(cats.contains(&Category::Arbitration));
        assert!(cats.contains(&Category::AutoRenewals));
        assert!(out.findings.iter().all(|f| f.risk == RiskTier::Low));
        assert_eq!(out.overall_risk, RiskTier::Low);
    }

    #[test]
    fn garbage_yields_empty_low_result() {
        let out = normalize_response("no payload here", &build_analysis_prompt("irrelevant text"));
        assert!(out.findings.is_empty());
        assert_eq!(out.overall_risk, RiskTier::Low);
    }

    #[test]
    fn verified_snippet_is_kept() {
        let raw = format!(
            r#"{{"clauses":[{}],"overallRisk":"Low"}}"#,
            clause_json(
                "Arbitration / No Class Action",
                "Medium",
                "binding arbitration in Delaware"
            )
        );
        let out = normalize_response(&raw, &build_analysis_prompt(RENEWAL_TEXT));
        assert_eq!(out.findings[0].snippet, "binding arbitration in Delaware");
    }

    #[test]
    fn fabricated_snippet_is_rederived_from_source() {
        // The reported quote is not in the contract; the grounded snippet
        // must be the sentence containing the category's trigger phrase.
        let raw = format!(
            r#"{{"clauses":[{}],"overallRisk":"Low"}}"#,
            clause_json("Auto-Renewals", "High", "invented quote about renewals")
        );
        let out = normalize_response(&raw, &build_analysis_prompt(RENEWAL_TEXT));
        assert_eq!(
            out.findings[0].snippet,
            "Your subscription will automatically renew unless canceled 30 days before the renewal date."
        );
    }

    #[test]
    fn missing_snippet_is_rederived_from_source() {
        let raw = format!(
            r#"{{"clauses":[{}],"overallRisk":"Low"}}"#,
            clause_json("Auto-Renewals", "High", "")
        );
        let out = normalize_response(&raw, &build_analysis_prompt(RENEWAL_TEXT));
        assert_eq!(
            out.findings[0].snippet,
            "Your subscription will automatically renew unless canceled 30 days before the renewal date."
        );
    }

    #[test]
    fn no_trigger_match_falls_back_to_head_slice() {
        let text = "Short plain document with nothing notable in it at all.";
        let raw = format!(
            r#"{{"clauses":[{}],"overallRisk":"Low"}}"#,
            clause_json("Auto-Renewals", "Low", "not present")
        );
        let out = normalize_response(&raw, &build_analysis_prompt(text));
        assert_eq!(out.findings[0].snippet, text);
    }

    #[test]
    fn every_snippet_is_grounded_in_source() {
        let raw = format!(
            r#"{{"clauses":[{},{},{}],"overallRisk":"High"}}"#,
            clause_json(
                "Arbitration / No Class Action",
                "High",
                "binding arbitration in Delaware"
            ),
            clause_json("Auto-Renewals", "Medium", "made-up words"),
            clause_json("Limitation of Liability", "Low", "")
        );
        let out = normalize_response(&raw, &build_analysis_prompt(RENEWAL_TEXT));
        assert_eq!(out.findings.len(), 3);
        for f in &out.findings {
            let base = f.snippet.trim_end_matches("...");
            assert!(
                RENEWAL_TEXT.contains(base),
                "snippet not grounded: {:?}",
                f.snippet
            );
        }
    }

    #[test]
    fn unknown_category_is_dropped() {
        let raw = format!(
            r#"{{"clauses":[{},{}],"overallRisk":"Low"}}"#,
            clause_json("Hidden Fees", "High", ""),
            clause_json("Auto-Renewals", "Low", "")
        );
        let out = normalize_response(&raw, &build_analysis_prompt(RENEWAL_TEXT));
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].category, Category::AutoRenewals);
    }

    #[test]
    fn unknown_risk_defaults_to_low() {
        let raw = format!(
            r#"{{"clauses":[{}],"overallRisk":"catastrophic"}}"#,
            clause_json("Auto-Renewals", "severe", "")
        );
        let out = normalize_response(&raw, &build_analysis_prompt(RENEWAL_TEXT));
        assert_eq!(out.findings[0].risk, RiskTier::Low);
        assert_eq!(out.overall_risk, RiskTier::Low);
    }

    #[test]
    fn overlong_snippet_gets_ellipsis() {
        let long_sentence = format!("This clause about binding arbitration {}.", "x".repeat(300));
        let raw = format!(
            r#"{{"clauses":[{}],"overallRisk":"Low"}}"#,
            clause_json("Arbitration / No Class Action", "Low", "")
        );
        let out = normalize_response(&raw, &build_analysis_prompt(&long_sentence));
        assert_eq!(out.findings[0].snippet.chars().count(), MAX_SNIPPET_CHARS);
        assert!(out.findings[0].snippet.ends_with("..."));
    }

    #[test]
    fn split_sentences_honors_terminators() {
        let s = split_sentences("One. Two! Three? Four");
        assert_eq!(s, vec!["One.", "Two!", "Three?", "Four"]);
    }

    #[test]
    fn split_sentences_keeps_inline_dots() {
        // A dot not followed by whitespace is not a boundary.
        let s = split_sentences("Visit example.com now. Then leave.");
        assert_eq!(s, vec!["Visit example.com now.", "Then leave."]);
    }
}
