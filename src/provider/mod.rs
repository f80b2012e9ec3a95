pub mod api;
pub mod cache;
pub mod client;
pub mod types;

pub use cache::{CacheConfig, ResponseCache};
pub use client::JolpicaClient;
pub use types::{RaceEvent, ResultRow, SessionKind};

use std::future::Future;

/// Failures surfaced by a session data provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("could not decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no event named '{name}' in the {season} calendar")]
    UnknownEvent { season: u16, name: String },

    #[error("{session} results for {event} are not available yet (session not yet run)")]
    SessionNotAvailable { event: String, session: SessionKind },
}

/// Source of race calendars and results.
pub trait SessionProvider {
    /// Season calendar, restricted to rounds with a positive round number.
    fn calendar(&self, season: u16) -> impl Future<Output = Result<Vec<RaceEvent>, ProviderError>>;

    /// Results of one session, in the provider's order (normally finish order),
    /// together with the calendar entry the event name resolved to.
    fn race_results(
        &self,
        season: u16,
        event_name: &str,
        session: SessionKind,
    ) -> impl Future<Output = Result<(RaceEvent, Vec<ResultRow>), ProviderError>>;
}

/// Find an event in a calendar.
///
/// Exact name match wins, then an ASCII case-insensitive match, then a bare
/// round number ("5").
pub fn resolve_event<'a>(events: &'a [RaceEvent], query: &str) -> Option<&'a RaceEvent> {
    let query = query.trim();
    events
        .iter()
        .find(|e| e.event_name == query)
        .or_else(|| events.iter().find(|e| e.event_name.eq_ignore_ascii_case(query)))
        .or_else(|| {
            let round: u32 = query.parse().ok()?;
            events.iter().find(|e| e.round == round)
        })
}
