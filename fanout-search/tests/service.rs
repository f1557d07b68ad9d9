//! Full-pipeline tests for `SearchService`.
//!
//! Most tests run against a scripted adapter under paused tokio time, so
//! retry back-off and deadlines elapse instantly. The last test drives the
//! real HTTP adapters against a mock server.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fanout_search::orchestrator::fallback::{SYSTEM_SOURCE, UNAVAILABLE_TITLE};
use fanout_search::registry::SourceDescriptor;
use fanout_search::{
    format_for_consumption, ContentKind, DomainTag, Enricher, OutcomeStatus, SearchConfig,
    SearchError, SearchItem, SearchOptions, SearchService, SourceAdapter,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Scripted sources ───────────────────────────────────────────────────────

#[derive(Default)]
struct Script {
    failing: HashSet<&'static str>,
    hanging: HashSet<&'static str>,
    /// Every source hangs on its first call and answers afterwards.
    hang_first_call: bool,
    calls: Mutex<HashMap<String, usize>>,
}

impl Script {
    fn record(&self, name: &str) -> usize {
        let mut calls = self.calls.lock().unwrap();
        let count = calls.entry(name.to_owned()).or_default();
        *count += 1;
        *count
    }

    fn calls_to(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

struct Scripted(Arc<Script>);

impl SourceAdapter for Scripted {
    async fn execute(
        &self,
        source: &SourceDescriptor,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchItem>, SearchError> {
        let call = self.0.record(&source.name);
        if self.0.hanging.contains(source.name.as_str()) || (self.0.hang_first_call && call == 1) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.0.failing.contains(source.name.as_str()) {
            return Err(SearchError::Http(format!("{} unavailable", source.name)));
        }
        Ok((0..max_results.min(2))
            .map(|i| {
                SearchItem::new(
                    format!("{} result {i}", source.name),
                    format!("About {query}"),
                    format!("https://example.com/{}/{i}", source.name),
                    source.name.as_str(),
                    ContentKind::General,
                )
            })
            .collect())
    }
}

fn service_with(script: Script, config: SearchConfig) -> (SearchService<Scripted>, Arc<Script>) {
    let script = Arc::new(script);
    let service =
        SearchService::with_adapter(config, Scripted(Arc::clone(&script))).expect("service");
    (service, script)
}

fn service(script: Script) -> (SearchService<Scripted>, Arc<Script>) {
    service_with(script, SearchConfig::default())
}

fn options() -> SearchOptions {
    SearchOptions::default()
}

// "rust" classifies as general: DuckDuckGo, Wikipedia and both meta-search
// instances are selected.
const GENERAL_SOURCES: usize = 4;

// ── Caching ────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn repeated_query_is_served_from_cache() {
    let (svc, script) = service(Script::default());

    let first = svc.search("rust", &options()).await;
    assert_eq!(script.total_calls(), GENERAL_SOURCES);
    assert_eq!(first.metadata.successful_sources, GENERAL_SOURCES);

    let second = svc.search("  RUST ", &options()).await;
    assert_eq!(script.total_calls(), GENERAL_SOURCES);
    assert_eq!(second.items, first.items);
    assert_eq!(svc.stats().await.cache_size, 1);
}

#[tokio::test(start_paused = true)]
async fn result_limit_is_part_of_the_cache_key() {
    let (svc, script) = service(Script::default());
    svc.search("rust", &options()).await;
    let limited = SearchOptions {
        max_results: 1,
        ..options()
    };
    let response = svc.search("rust", &limited).await;
    assert_eq!(script.total_calls(), 2 * GENERAL_SOURCES);
    assert_eq!(response.items.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn force_refresh_bypasses_cache() {
    let (svc, script) = service(Script::default());
    svc.search("rust", &options()).await;
    let refresh = SearchOptions {
        force_refresh: true,
        ..options()
    };
    svc.search("rust", &refresh).await;
    assert_eq!(script.total_calls(), 2 * GENERAL_SOURCES);

    // The refreshed response replaced the entry; a plain read hits it.
    svc.search("rust", &options()).await;
    assert_eq!(script.total_calls(), 2 * GENERAL_SOURCES);
}

#[tokio::test(start_paused = true)]
async fn cached_response_expires_after_ttl() {
    let (svc, script) = service(Script::default());
    svc.search("rust", &options()).await;

    tokio::time::advance(Duration::from_secs(299)).await;
    svc.search("rust", &options()).await;
    assert_eq!(script.total_calls(), GENERAL_SOURCES);

    tokio::time::advance(Duration::from_secs(2)).await;
    svc.search("rust", &options()).await;
    assert_eq!(script.total_calls(), 2 * GENERAL_SOURCES);
}

#[tokio::test(start_paused = true)]
async fn clear_cache_forces_new_fan_out() {
    let (svc, script) = service(Script::default());
    svc.search("rust", &options()).await;
    svc.clear_cache();
    svc.search("rust", &options()).await;
    assert_eq!(script.total_calls(), 2 * GENERAL_SOURCES);
}

#[tokio::test(start_paused = true)]
async fn zero_ttl_never_caches() {
    let config = SearchConfig {
        cache_ttl_seconds: 0,
        ..Default::default()
    };
    let (svc, script) = service_with(Script::default(), config);
    svc.search("rust", &options()).await;
    svc.search("rust", &options()).await;
    assert_eq!(script.total_calls(), 2 * GENERAL_SOURCES);
}

// ── Source health ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn exhausted_source_is_skipped_until_reset() {
    let script = Script {
        failing: HashSet::from(["DuckDuckGo"]),
        ..Default::default()
    };
    let (svc, script) = service(script);

    let response = svc.search("rust", &options()).await;
    // One attempt plus three retries.
    assert_eq!(script.calls_to("DuckDuckGo"), 4);
    assert_eq!(response.metadata.successful_sources, GENERAL_SOURCES - 1);
    let report = response
        .metadata
        .sources
        .iter()
        .find(|s| s.name == "DuckDuckGo")
        .expect("report");
    assert_eq!(report.status, OutcomeStatus::Failed);
    assert!(report.error.as_deref().unwrap_or_default().contains("unavailable"));
    assert!(!svc.registry().is_working("DuckDuckGo"));

    let refresh = SearchOptions {
        force_refresh: true,
        ..options()
    };
    let response = svc.search("rust", &refresh).await;
    assert_eq!(script.calls_to("DuckDuckGo"), 4);
    assert_eq!(response.metadata.total_sources, GENERAL_SOURCES - 1);

    svc.reset_sources();
    svc.search("rust", &refresh).await;
    assert_eq!(script.calls_to("DuckDuckGo"), 8);
}

#[tokio::test(start_paused = true)]
async fn all_sources_failing_yields_empty_uncached_response() {
    let config = SearchConfig {
        max_retries: 0,
        ..Default::default()
    };
    let script = Script {
        failing: HashSet::from([
            "DuckDuckGo",
            "Wikipedia",
            "SearXNG (searx.tiekoetter.com)",
            "SearXNG (search.bus-hit.me)",
        ]),
        ..Default::default()
    };
    let (svc, script) = service_with(script, config);

    let response = svc.search("rust", &options()).await;
    assert!(response.is_empty());
    assert!(!response.is_fallback);
    assert_eq!(response.metadata.successful_sources, 0);
    assert_eq!(response.metadata.total_sources, GENERAL_SOURCES);

    svc.reset_sources();
    svc.search("rust", &options()).await;
    assert_eq!(script.total_calls(), 2 * GENERAL_SOURCES);
    assert_eq!(svc.stats().await.cache_size, 0);
}

// ── Deadlines and fallback ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn slow_source_is_reported_as_timed_out() {
    let script = Script {
        hanging: HashSet::from(["Wikipedia"]),
        ..Default::default()
    };
    let (svc, _script) = service(script);
    let start = tokio::time::Instant::now();

    let response = svc.search("rust", &options()).await;
    let deadline = SearchConfig::default().timeout();
    assert!(start.elapsed() >= deadline);
    assert!(start.elapsed() < deadline + Duration::from_secs(1));
    assert!(!response.is_fallback);
    assert_eq!(response.metadata.successful_sources, GENERAL_SOURCES - 1);
    let report = response
        .metadata
        .sources
        .iter()
        .find(|s| s.name == "Wikipedia")
        .expect("report");
    assert_eq!(report.status, OutcomeStatus::TimedOut);
    // A timeout is not a failure.
    assert!(svc.registry().is_working("Wikipedia"));
}

#[tokio::test(start_paused = true)]
async fn whole_fan_out_timeout_falls_back_to_encyclopedia() {
    let script = Script {
        hang_first_call: true,
        ..Default::default()
    };
    let (svc, script) = service(script);
    let quick = SearchOptions {
        timeout: Some(Duration::from_secs(2)),
        ..options()
    };

    let response = svc.search("rust", &quick).await;
    assert!(response.is_fallback);
    assert_eq!(response.fallback_source.as_deref(), Some("Fallback (Wikipedia)"));
    assert!(response
        .notice
        .as_deref()
        .unwrap_or_default()
        .starts_with("advanced search failed"));
    assert!(response.items.iter().all(|i| i.source == "Wikipedia"));
    assert_eq!(script.calls_to("Wikipedia"), 2);
    assert!(format_for_consumption(&response).contains("fallback search"));

    // Fallback responses are not cached.
    let response = svc.search("rust", &quick).await;
    assert!(!response.is_fallback);
    assert_eq!(response.metadata.successful_sources, GENERAL_SOURCES);
}

#[tokio::test(start_paused = true)]
async fn unreachable_everything_yields_system_message() {
    let script = Script {
        hanging: HashSet::from([
            "DuckDuckGo",
            "Wikipedia",
            "SearXNG (searx.tiekoetter.com)",
            "SearXNG (search.bus-hit.me)",
        ]),
        ..Default::default()
    };
    let (svc, _script) = service(script);

    let response = svc.search("rust", &options()).await;
    assert!(response.is_fallback);
    assert_eq!(response.fallback_source.as_deref(), Some("System Message"));
    assert_eq!(response.items.len(), 1);
    assert_eq!(response.items[0].title, UNAVAILABLE_TITLE);
    assert_eq!(response.items[0].source, SYSTEM_SOURCE);
    assert_eq!(response.items[0].kind, ContentKind::System);
    assert!(response.items[0].content.contains("\"rust\""));
}

// ── Shaping ────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn result_list_is_capped() {
    let (svc, _script) = service(Script::default());
    let capped = SearchOptions {
        max_results: 3,
        ..options()
    };
    let response = svc.search("rust", &capped).await;
    assert_eq!(response.items.len(), 3);
}

struct Marker;

impl Enricher for Marker {
    fn enrich(&self, item: &SearchItem) -> Option<String> {
        Some(format!("more about {}", item.title))
    }
}

#[tokio::test(start_paused = true)]
async fn enrichment_touches_top_items_only() {
    let (svc, _script) = service(Script::default());
    let svc = svc.with_enricher(Arc::new(Marker));

    let response = svc.search("rust", &options()).await;
    assert!(response.items.len() > 3);
    assert!(response.items[..3].iter().all(|i| i.enrichment.is_some()));
    assert!(response.items[3..].iter().all(|i| i.enrichment.is_none()));

    let plain = SearchOptions {
        include_detailed: false,
        force_refresh: true,
        ..options()
    };
    let response = svc.search("rust", &plain).await;
    assert!(response.items.iter().all(|i| i.enrichment.is_none()));
}

#[tokio::test(start_paused = true)]
async fn stats_track_last_query_and_toggle() {
    let (svc, script) = service(Script::default());
    svc.search("Rust async", &options()).await;

    let stats = svc.stats().await;
    assert_eq!(stats.last_query.as_deref(), Some("Rust async"));
    assert_eq!(stats.cache_size, 1);
    assert!(stats.enabled);

    assert!(!svc.toggle_search_enabled());
    let response = svc.search("Rust async", &options()).await;
    assert!(response.is_empty());
    assert!(!svc.stats().await.enabled);
    assert_eq!(script.total_calls(), GENERAL_SOURCES);
}

#[tokio::test(start_paused = true)]
async fn blank_query_makes_no_calls() {
    let (svc, script) = service(Script::default());
    let response = svc.search(" \t ", &options()).await;
    assert!(response.is_empty());
    assert_eq!(format_for_consumption(&response), fanout_search::format::NO_RESULTS_TEXT);
    assert_eq!(script.total_calls(), 0);
}

// ── End to end over HTTP ───────────────────────────────────────────────────

#[tokio::test]
async fn weather_query_ranks_forecast_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "35.6768601", "lon": "139.7638947", "display_name": "Tokyo, Japan"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current_units": {"temperature_2m": "°C"},
            "current": {"temperature_2m": 18.4, "relative_humidity_2m": 62, "wind_speed_10m": 11.2, "precipitation": 0.0, "weather_code": 0},
            "daily": {
                "time": ["2026-10-18", "2026-10-19", "2026-10-20"],
                "temperature_2m_max": [21.0, 19.5, 17.2],
                "temperature_2m_min": [14.1, 13.0, 12.2],
                "precipitation_sum": [0.0, 3.4, 12.8],
                "weather_code": [0, 61, 95]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ia"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "RelatedTopics": [
                {"Text": "Tokyo - capital of Japan", "FirstURL": "https://duckduckgo.com/Tokyo"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"search": [{"title": "Tokyo", "snippet": "Capital of Japan"}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/summary/Tokyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "extract": "Tokyo is the capital of Japan."
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let mut config = SearchConfig {
        max_retries: 0,
        user_agent: Some("fanout-test/1.0".into()),
        ..Default::default()
    };
    config.endpoints.geocode = format!("{uri}/geocode");
    config.endpoints.forecast = format!("{uri}/forecast");
    config.endpoints.instant_answer = format!("{uri}/ia");
    config.endpoints.encyclopedia_search = format!("{uri}/w/api.php");
    config.endpoints.encyclopedia_summary = format!("{uri}/summary/");

    let svc = SearchService::new(config).expect("service");
    let response = svc.search("weather in Tokyo", &options()).await;

    assert_eq!(response.metadata.tags, vec![DomainTag::Weather]);
    assert_eq!(response.metadata.total_sources, 3);
    assert_eq!(response.metadata.successful_sources, 3);
    assert_eq!(response.items[0].title, "Weather for Tokyo, Japan");
    assert_eq!(response.items[0].source, "Open-Meteo");
    assert_eq!(response.items.len(), 3);

    let digest = format_for_consumption(&response);
    assert!(digest.contains("[1] Weather for Tokyo, Japan\nSource: Open-Meteo\n"));
    assert!(digest.contains("Query Types: weather\n"));
}
