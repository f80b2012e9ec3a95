use crate::provider::ProviderError;

/// Failures of one analysis run. Each maps to a user-facing message; none of
/// them should take the whole process down.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Could not load the {season} calendar: {source}")]
    CalendarFetch {
        season: u16,
        #[source]
        source: ProviderError,
    },

    #[error("Could not load results for {event} {season}: {source}")]
    ResultsFetch {
        season: u16,
        event: String,
        #[source]
        source: ProviderError,
    },

    #[error("No classified results for {event}")]
    EmptyResultSet { event: String },

    #[error("No driver named '{name}' in these results")]
    ComparisonNotFound { name: String },
}

impl AnalysisError {
    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            AnalysisError::CalendarFetch { .. } | AnalysisError::ResultsFetch { .. } => {
                crate::EXIT_NETWORK
            }
            AnalysisError::EmptyResultSet { .. } | AnalysisError::ComparisonNotFound { .. } => {
                crate::EXIT_ANALYSIS
            }
        }
    }
}
