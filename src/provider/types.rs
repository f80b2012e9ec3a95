use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One round of a season calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceEvent {
    pub season: u16,
    pub round: u32,
    pub event_name: String,
    pub date: Option<NaiveDate>,
    pub url: Option<String>, // race report page, when the provider has one
}

impl RaceEvent {
    /// Short label in the format "R05 Miami Grand Prix"
    pub fn label(&self) -> String {
        format!("R{:02} {}", self.round, self.event_name)
    }
}

/// Raw per-competitor result as supplied by the provider.
///
/// Grid and finish positions are kept as the provider's tokens: numbers for
/// classified entries, markers such as "R" (retired) or "D" (disqualified)
/// otherwise. Coercion happens in the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub abbreviation: String, // 3-letter code, unique within a race
    pub full_name: String,
    pub team_name: String,
    pub grid_position: Option<String>,
    pub finish_position: Option<String>,
    pub points: f64,
}

/// Which session of a race weekend to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Race,
    Sprint,
}

impl SessionKind {
    /// Path segment used by the Ergast-style API
    pub fn endpoint(&self) -> &'static str {
        match self {
            SessionKind::Race => "results",
            SessionKind::Sprint => "sprint",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SessionKind::Race => SessionKind::Sprint,
            SessionKind::Sprint => SessionKind::Race,
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Race => write!(f, "race"),
            SessionKind::Sprint => write!(f, "sprint"),
        }
    }
}
