use crate::analysis::{self, DerivedResultRow, HeadToHead};
use crate::error::AnalysisError;
use crate::provider::{RaceEvent, SessionKind, SessionProvider};
use crate::scoring::{self, ScoredResult, ScoringStrategy};

/// What one analysis run should look at.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub season: u16,
    pub event: String,
    pub session: SessionKind,
    pub strategy: ScoringStrategy,
}

/// Everything derived from one session's results.
///
/// Computed fresh per request and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceAnalysis {
    pub event: RaceEvent,
    pub session: SessionKind,
    pub strategy: ScoringStrategy,
    /// Classified rows in provider order, scored under `strategy`
    pub rows: Vec<ScoredResult>,
    pub best: ScoredResult,
    /// Rows removed by the normalizer (DNF, DSQ, pit-lane starts, ...)
    pub dropped: usize,
}

impl RaceAnalysis {
    fn from_rows(
        event: RaceEvent,
        session: SessionKind,
        strategy: ScoringStrategy,
        rows: &[DerivedResultRow],
        dropped: usize,
    ) -> Result<Self, AnalysisError> {
        let scored = scoring::score(rows, strategy);
        let best = scoring::pick_best(&scored)
            .cloned()
            .ok_or_else(|| AnalysisError::EmptyResultSet {
                event: event.event_name.clone(),
            })?;

        Ok(Self {
            event,
            session,
            strategy,
            rows: scored,
            best,
            dropped,
        })
    }

    /// Re-score the same normalized rows under another strategy, no fetch.
    pub fn with_strategy(&self, strategy: ScoringStrategy) -> Result<Self, AnalysisError> {
        let rows: Vec<DerivedResultRow> = self.rows.iter().map(|s| s.row.clone()).collect();
        Self::from_rows(self.event.clone(), self.session, strategy, &rows, self.dropped)
    }

    pub fn compare(&self, name_a: &str, name_b: &str) -> Result<HeadToHead, AnalysisError> {
        analysis::compare(&self.rows, name_a, name_b)
    }

    /// Rows in ranking order under the active strategy
    pub fn ranked(&self) -> Vec<&ScoredResult> {
        scoring::rank(&self.rows)
    }
}

/// Load a season calendar, surfacing failures as `CalendarFetch`.
pub async fn load_calendar<P: SessionProvider>(
    provider: &P,
    season: u16,
) -> Result<Vec<RaceEvent>, AnalysisError> {
    provider
        .calendar(season)
        .await
        .map_err(|source| AnalysisError::CalendarFetch { season, source })
}

/// Fetch, normalize and score one session.
///
/// No partial result: any failure aborts the run with a single error.
pub async fn analyze_race<P: SessionProvider>(
    provider: &P,
    request: &AnalysisRequest,
) -> Result<RaceAnalysis, AnalysisError> {
    let (event, raw) = provider
        .race_results(request.season, &request.event, request.session)
        .await
        .map_err(|source| AnalysisError::ResultsFetch {
            season: request.season,
            event: request.event.clone(),
            source,
        })?;

    let normalized = analysis::normalize(&raw);
    tracing::debug!(
        "{}: {} classified, {} dropped",
        event.event_name,
        normalized.rows.len(),
        normalized.dropped
    );

    RaceAnalysis::from_rows(
        event,
        request.session,
        request.strategy,
        &normalized.rows,
        normalized.dropped,
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::provider::{ProviderError, RaceEvent, ResultRow, SessionKind, SessionProvider};

    /// In-memory provider with one 2024 event and a fixed result set.
    pub struct FakeProvider {
        pub calendar_fails: bool,
        pub rows: Vec<ResultRow>,
    }

    pub fn raw_row(name: &str, code: &str, grid: &str, finish: &str, points: f64) -> ResultRow {
        ResultRow {
            abbreviation: code.to_string(),
            full_name: name.to_string(),
            team_name: "Team".to_string(),
            grid_position: Some(grid.to_string()),
            finish_position: Some(finish.to_string()),
            points,
        }
    }

    pub fn bahrain() -> RaceEvent {
        RaceEvent {
            season: 2024,
            round: 1,
            event_name: "Bahrain Grand Prix".to_string(),
            date: None,
            url: None,
        }
    }

    impl FakeProvider {
        pub fn with_rows(rows: Vec<ResultRow>) -> Self {
            Self {
                calendar_fails: false,
                rows,
            }
        }

        pub fn standard() -> Self {
            Self::with_rows(vec![
                raw_row("Max Verstappen", "VER", "1", "1", 26.0),
                raw_row("Sergio Perez", "PER", "5", "2", 18.0),
                raw_row("Carlos Sainz", "SAI", "4", "3", 15.0),
                raw_row("Lewis Hamilton", "HAM", "3", "R", 0.0),
            ])
        }
    }

    impl SessionProvider for FakeProvider {
        async fn calendar(&self, season: u16) -> Result<Vec<RaceEvent>, ProviderError> {
            if self.calendar_fails {
                return Err(ProviderError::Http {
                    status: 502,
                    url: format!("fake://{}", season),
                });
            }
            Ok(vec![bahrain()])
        }

        async fn race_results(
            &self,
            season: u16,
            event_name: &str,
            session: SessionKind,
        ) -> Result<(RaceEvent, Vec<ResultRow>), ProviderError> {
            let events = self.calendar(season).await?;
            let event = crate::provider::resolve_event(&events, event_name)
                .cloned()
                .ok_or_else(|| ProviderError::UnknownEvent {
                    season,
                    name: event_name.to_string(),
                })?;
            if session == SessionKind::Sprint {
                return Err(ProviderError::SessionNotAvailable {
                    event: event.event_name,
                    session,
                });
            }
            Ok((event, self.rows.clone()))
        }
    }
}
