//! Terminal card rendering for analysis results.

use clauseguard_core::{Analysis, Category};

/// Print an analysis as a grouped, human-readable card.
pub fn print_analysis_card(analysis: &Analysis) {
    let s = &analysis.summary;

    println!("=== Contract Risk Analysis ===");
    println!(
        "{} Computed risk level: {}",
        s.risk_level.icon(),
        s.risk_level
    );
    println!(
        "{} Service-reported overall risk: {}",
        analysis.overall_risk.icon(),
        analysis.overall_risk
    );
    println!("{}", analysis.verdict);
    println!();

    println!("Summary");
    println!("  {:<22} {}", "findings", s.total_findings);
    println!("  {:<22} {}", "high risk", s.high_risk);
    println!("  {:<22} {}", "medium risk", s.medium_risk);
    println!("  {:<22} {}", "low risk", s.low_risk);
    println!("  {:<22} {}", "input chars", analysis.input_chars);
    println!("  {:<22} {}", "analyzed at", analysis.analyzed_at);
    println!();

    if !s.by_category.is_empty() {
        println!("Categories");
        for cat in Category::ALL {
            if let Some(count) = s.by_category.get(&cat) {
                println!("  {} {:<34} {count}", cat.icon(), cat.as_str());
            }
        }
        println!();
    }

    if analysis.findings.is_empty() {
        println!("No risky clauses detected in this contract.");
        return;
    }

    for (i, f) in analysis.findings.iter().enumerate() {
        println!(
            "{}. {} {} [{} {}]",
            i + 1,
            f.category.icon(),
            f.category,
            f.risk.icon(),
            f.risk
        );
        println!("   {}", f.summary);
        if !f.why_it_matters.is_empty() {
            println!("   Why it matters: {}", f.why_it_matters);
        }
        println!("   > {}", f.snippet);
        println!();
    }
}
