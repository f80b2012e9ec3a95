use serde::{Deserialize, Serialize};
use std::fmt;

/// Ranking formula applied to normalized results.
///
/// Both formulas are kept side by side; neither replaces the other.
///
/// Example YAML:
/// ```yaml
/// strategy: form
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    /// "Performance Score": points x 2 + position delta
    #[default]
    Performance,
    /// "Form Coefficient": (points + 1) / finish position
    Form,
}

impl ScoringStrategy {
    pub fn display_name(&self) -> &'static str {
        match self {
            ScoringStrategy::Performance => "Performance Score",
            ScoringStrategy::Form => "Form Coefficient",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ScoringStrategy::Performance => ScoringStrategy::Form,
            ScoringStrategy::Form => ScoringStrategy::Performance,
        }
    }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringStrategy::Performance => write!(f, "performance"),
            ScoringStrategy::Form => write!(f, "form"),
        }
    }
}
