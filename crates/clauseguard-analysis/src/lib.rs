//! Analysis orchestrator.
//!
//! Composes text acquisition, prompt building, the generation client, and
//! the response normalizer into the two public operations, then attaches
//! the derived summary. Upstream failures are re-signaled under one stable
//! error surface with the original cause preserved for diagnostics.

use thiserror::Error;
use tracing::info;

use clauseguard_ai::{GenerationClient, GenerationError, build_analysis_prompt, normalize_response};
use clauseguard_core::Analysis;
use clauseguard_fetch::{FetchError, PageFetcher};

/// Stable top-level failure for both analysis operations.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("analysis failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("analysis failed: {0}")]
    Acquisition(#[from] FetchError),
}

/// Entry point for contract analysis.
///
/// Owns its generation client and page fetcher; construct one per
/// configuration and pass it around explicitly.
pub struct Analyzer {
    client: GenerationClient,
    fetcher: PageFetcher,
}

impl Analyzer {
    pub fn new(client: GenerationClient, fetcher: PageFetcher) -> Self {
        Analyzer { client, fetcher }
    }

    /// Analyze pasted contract text.
    ///
    /// Identical input analyzed twice makes two independent service calls;
    /// results are never cached.
    pub async fn analyze_text(&self, contract_text: &str) -> Result<Analysis, AnalysisError> {
        let prompt = build_analysis_prompt(contract_text);
        let raw = self.client.complete(&prompt).await?;
        let normalized = normalize_response(&raw, &prompt);

        info!(
            findings = normalized.findings.len(),
            overall = %normalized.overall_risk,
            "analysis complete"
        );
        Ok(Analysis::new(
            normalized.findings,
            normalized.overall_risk,
            normalized.verdict,
            contract_text.chars().count(),
        ))
    }

    /// Fetch a terms page and analyze its text.
    ///
    /// An acquisition failure short-circuits before any generation call.
    pub async fn analyze_url(&self, url: &str) -> Result<Analysis, AnalysisError> {
        let text = self.fetcher.fetch_terms(url).await?;
        self.analyze_text(&text).await
    }
}
