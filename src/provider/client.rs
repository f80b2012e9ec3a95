use std::time::Duration;

use super::api;
use super::cache::{self, ResponseCache};
use super::types::{RaceEvent, ResultRow, SessionKind};
use super::{resolve_event, ProviderError, SessionProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.jolpi.ca/ergast/f1";

/// HTTP client for the Jolpica (Ergast-compatible) results API.
///
/// The response cache is injected at construction; without one every call
/// goes to the network.
#[derive(Clone)]
pub struct JolpicaClient {
    http: reqwest::Client,
    base_url: String,
    cache: Option<ResponseCache>,
}

impl JolpicaClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        cache: Option<ResponseCache>,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("paddock/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            cache,
        })
    }

    async fn fetch_body(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Read-through fetch: decode a cached body if there is one, otherwise
    /// fetch, decode and store. Only values accepted by `keep` are stored.
    async fn read_through<T>(
        &self,
        key: &str,
        url: &str,
        decode: impl Fn(&[u8]) -> Result<T, serde_json::Error>,
        keep: impl Fn(&T) -> bool,
    ) -> Result<T, ProviderError> {
        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(key) {
                match decode(&body) {
                    Ok(value) => return Ok(value),
                    Err(e) => tracing::warn!("ignoring unreadable cache entry {}: {}", key, e),
                }
            } else {
                tracing::debug!("cache miss: {}", key);
            }
        }

        let body = self.fetch_body(url).await?;
        let value = decode(&body)?;

        if let Some(cache) = &self.cache {
            if keep(&value) {
                cache.put(key, &body);
            }
        }

        Ok(value)
    }
}

impl SessionProvider for JolpicaClient {
    async fn calendar(&self, season: u16) -> Result<Vec<RaceEvent>, ProviderError> {
        let url = api::calendar_url(&self.base_url, season);
        let keep = |events: &Vec<RaceEvent>| !events.is_empty();
        let events = self
            .read_through(&cache::calendar_key(season), &url, api::decode_calendar, keep)
            .await?;
        tracing::debug!("{} rounds in the {} calendar", events.len(), season);
        Ok(events)
    }

    async fn race_results(
        &self,
        season: u16,
        event_name: &str,
        session: SessionKind,
    ) -> Result<(RaceEvent, Vec<ResultRow>), ProviderError> {
        let calendar = self.calendar(season).await?;
        let event = resolve_event(&calendar, event_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownEvent {
                season,
                name: event_name.to_string(),
            })?;

        let url = api::results_url(&self.base_url, season, event.round, session);
        let key = cache::results_key(season, event.round, session);
        let decode = |body: &[u8]| api::decode_results(body, session);
        let keep = |rows: &Vec<ResultRow>| !rows.is_empty();
        let rows = self.read_through(&key, &url, decode, keep).await?;

        if rows.is_empty() {
            return Err(ProviderError::SessionNotAvailable {
                event: event.event_name,
                session,
            });
        }

        tracing::debug!("{} result rows for {} ({})", rows.len(), event.event_name, session);
        Ok((event, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::api::fixtures::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, cache: Option<ResponseCache>) -> JolpicaClient {
        JolpicaClient::new(server.uri(), Duration::from_secs(5), cache).unwrap()
    }

    async fn mount_calendar(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/2024.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CALENDAR_2024))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_calendar_fetch() {
        let server = MockServer::start().await;
        mount_calendar(&server).await;

        let events = client_for(&server, None).calendar(2024).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_name, "Saudi Arabian Grand Prix");
    }

    #[tokio::test]
    async fn test_race_results_resolves_event_name() {
        let server = MockServer::start().await;
        mount_calendar(&server).await;
        Mock::given(method("GET"))
            .and(path("/2024/1/results.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_2024_1))
            .mount(&server)
            .await;

        let (event, rows) = client_for(&server, None)
            .race_results(2024, "Bahrain Grand Prix", SessionKind::Race)
            .await
            .unwrap();
        assert_eq!(event.round, 1);
        assert_eq!(rows.len(), 6);
    }

    #[tokio::test]
    async fn test_unknown_event() {
        let server = MockServer::start().await;
        mount_calendar(&server).await;

        let err = client_for(&server, None)
            .race_results(2024, "Monaco Grand Prix", SessionKind::Race)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownEvent { season: 2024, .. }));
    }

    #[tokio::test]
    async fn test_session_not_yet_run() {
        let server = MockServer::start().await;
        mount_calendar(&server).await;
        Mock::given(method("GET"))
            .and(path("/2024/2/results.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RACE_TABLE))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .race_results(2024, "Saudi Arabian Grand Prix", SessionKind::Race)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::SessionNotAvailable { .. }));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2024.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server, None).calendar(2024).await.unwrap_err();
        assert!(matches!(err, ProviderError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2024.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server, None).calendar(2024).await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn test_cache_read_through_fetches_once() {
        let dir = std::env::temp_dir().join("paddock_test_client_read_through");
        let _ = std::fs::remove_dir_all(&dir);

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2024.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CALENDAR_2024))
            .expect(1)
            .mount(&server)
            .await;

        let cache = ResponseCache::open(dir.clone()).unwrap();
        let client = client_for(&server, Some(cache.clone()));
        let first = client.calendar(2024).await.unwrap();

        // Disk layer answers once the memory layer is gone
        cache.clear_memory();
        let second = client.calendar(2024).await.unwrap();
        assert_eq!(first, second);

        server.verify().await;
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_empty_results_are_not_cached() {
        let dir = std::env::temp_dir().join("paddock_test_client_empty_not_cached");
        let _ = std::fs::remove_dir_all(&dir);

        let server = MockServer::start().await;
        mount_calendar(&server).await;
        Mock::given(method("GET"))
            .and(path("/2024/2/results.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RACE_TABLE))
            .expect(2)
            .mount(&server)
            .await;

        let cache = ResponseCache::open(dir.clone()).unwrap();
        let client = client_for(&server, Some(cache));
        for _ in 0..2 {
            let result = client
                .race_results(2024, "Saudi Arabian Grand Prix", SessionKind::Race)
                .await;
            assert!(result.is_err());
        }

        server.verify().await;
        let _ = std::fs::remove_dir_all(&dir);
    }
}
