pub mod finding;
pub mod report;
pub mod triggers;

pub use finding::{Category, Finding, RiskTier};
pub use report::{Analysis, RiskLevel, Summary};
pub use triggers::{matches_category, trigger_phrases};
