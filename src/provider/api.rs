//! Wire format of the Ergast-compatible Jolpica API.
//!
//! Every response is wrapped in `MRData`; calendar and result queries both
//! return a `RaceTable` whose `Races` carry either no results (calendar),
//! `Results` (race) or `SprintResults` (sprint). All numbers arrive as strings.

use chrono::NaiveDate;
use serde::Deserialize;

use super::types::{RaceEvent, ResultRow, SessionKind};

/// Maximum page size accepted by the API; a season or a grid never exceeds it.
pub const PAGE_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "MRData")]
    mr_data: MrData,
}

#[derive(Debug, Deserialize)]
struct MrData {
    #[serde(rename = "RaceTable")]
    race_table: RaceTable,
}

#[derive(Debug, Deserialize)]
struct RaceTable {
    #[serde(rename = "Races", default)]
    races: Vec<ApiRace>,
}

#[derive(Debug, Deserialize)]
struct ApiRace {
    season: String,
    round: String,
    #[serde(rename = "raceName")]
    race_name: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(rename = "Results", default)]
    results: Vec<ApiResult>,
    #[serde(rename = "SprintResults", default)]
    sprint_results: Vec<ApiResult>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    #[serde(rename = "positionText", default)]
    position_text: Option<String>,
    #[serde(default)]
    points: Option<String>,
    #[serde(default)]
    grid: Option<String>,
    #[serde(rename = "Driver")]
    driver: ApiDriver,
    #[serde(rename = "Constructor", default)]
    constructor: Option<ApiConstructor>,
}

#[derive(Debug, Deserialize)]
struct ApiDriver {
    #[serde(default)]
    code: Option<String>,
    #[serde(rename = "givenName")]
    given_name: String,
    #[serde(rename = "familyName")]
    family_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiConstructor {
    name: String,
}

pub fn calendar_url(base_url: &str, season: u16) -> String {
    format!("{}/{}.json?limit={}", base_url.trim_end_matches('/'), season, PAGE_LIMIT)
}

pub fn results_url(base_url: &str, season: u16, round: u32, session: SessionKind) -> String {
    format!(
        "{}/{}/{}/{}.json?limit={}",
        base_url.trim_end_matches('/'),
        season,
        round,
        session.endpoint(),
        PAGE_LIMIT
    )
}

/// Decode a calendar response. Testing rounds (round 0) and rounds with an
/// unreadable round number are dropped.
pub fn decode_calendar(body: &[u8]) -> Result<Vec<RaceEvent>, serde_json::Error> {
    let envelope: Envelope = serde_json::from_slice(body)?;

    let events = envelope
        .mr_data
        .race_table
        .races
        .into_iter()
        .filter_map(|race| {
            let round: u32 = race.round.trim().parse().ok()?;
            if round == 0 {
                return None;
            }
            let season = match race.season.trim().parse() {
                Ok(s) => s,
                Err(_) => {
                    tracing::warn!("skipping round {} with unreadable season '{}'", round, race.season);
                    return None;
                }
            };
            Some(RaceEvent {
                season,
                round,
                event_name: race.race_name,
                date: race
                    .date
                    .as_deref()
                    .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
                url: race.url,
            })
        })
        .collect();

    Ok(events)
}

/// Decode a results response into raw rows, in the provider's order.
/// A response without a race (session not run yet) yields no rows.
pub fn decode_results(body: &[u8], session: SessionKind) -> Result<Vec<ResultRow>, serde_json::Error> {
    let envelope: Envelope = serde_json::from_slice(body)?;

    let Some(race) = envelope.mr_data.race_table.races.into_iter().next() else {
        return Ok(Vec::new());
    };

    let results = match session {
        SessionKind::Race => race.results,
        SessionKind::Sprint => race.sprint_results,
    };

    Ok(results.into_iter().map(into_result_row).collect())
}

fn into_result_row(result: ApiResult) -> ResultRow {
    let driver = result.driver;
    let abbreviation = driver
        .code
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| {
            driver
                .family_name
                .chars()
                .filter(|c| c.is_alphabetic())
                .take(3)
                .collect::<String>()
                .to_uppercase()
        });

    let points = match result.points.as_deref().map(str::trim) {
        Some(p) => p.parse::<f64>().unwrap_or_else(|_| {
            tracing::warn!("unreadable points '{}' for {}, using 0", p, abbreviation);
            0.0
        }),
        None => 0.0,
    };

    ResultRow {
        full_name: format!("{} {}", driver.given_name, driver.family_name),
        abbreviation,
        team_name: result.constructor.map(|c| c.name).unwrap_or_default(),
        grid_position: result.grid,
        finish_position: result.position_text,
        points: points.max(0.0),
    }
}
