//! Weather adapter: geocode a place name, then fetch a coordinate forecast.
//!
//! The location is pulled out of the query text with an ordered list of
//! patterns: direct forms ("weather in X") first, inverted forms
//! ("X weather") second, then a fixed list of major cities. Queries naming
//! no place use the configured default location.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::SourceAdapter;
use crate::error::SearchError;
use crate::http;
use crate::registry::SourceDescriptor;
use crate::types::{ContentKind, SearchItem};

/// Attribution link attached to weather items.
const FORECAST_ATTRIBUTION: &str = "https://open-meteo.com/";

/// Number of forecast days requested and rendered.
const FORECAST_DAYS: usize = 3;

const DIRECT_PATTERNS: &[&str] = &[
    r"weather\s+(?:in|at|for)\s+([a-z\s,]+)(?:$|\?|\.|,)",
    r"(?:temperature|forecast|climate|conditions|rain|snow|humidity|wind)\s+(?:in|at|for)\s+([a-z\s,]+)(?:$|\?|\.|,)",
    r"(?:how's|what's|hows|whats)\s+(?:the\s+)?(?:weather|temperature|forecast)\s+(?:in|at|for)\s+([a-z\s,]+)(?:$|\?|\.|,)",
    r"(?:is\s+it|will\s+it\s+be)\s+(?:raining|snowing|cold|hot|sunny|cloudy|warm)\s+(?:in|at)\s+([a-z\s,]+)(?:$|\?|\.|,)",
];

const INVERTED_PATTERNS: &[&str] =
    &[r"([a-z\s,]+?)\s+(?:weather|temperature|forecast|climate|conditions)"];

/// Words the inverted pattern can capture that are not places.
const NOT_A_PLACE: &[&str] = &["current", "today", "tomorrow", "tonight", "now", "the"];

const MAJOR_CITIES: &[&str] = &[
    "london", "new york", "paris", "tokyo", "beijing", "sydney", "moscow", "berlin", "rome",
    "madrid", "delhi", "chicago", "toronto", "dubai",
];

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

fn direct_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile_all(DIRECT_PATTERNS))
}

fn inverted_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile_all(INVERTED_PATTERNS))
}

/// Extract a place name from a weather query, lowercased.
///
/// Returns `None` when no pattern or known city matches.
pub fn extract_location(query: &str) -> Option<String> {
    let query = query.to_lowercase();

    for pattern in direct_patterns() {
        if let Some(place) = first_capture(pattern, &query) {
            return Some(place);
        }
    }

    for pattern in inverted_patterns() {
        if let Some(place) = first_capture(pattern, &query) {
            if !NOT_A_PLACE.contains(&place.as_str()) {
                return Some(place);
            }
        }
    }

    MAJOR_CITIES
        .iter()
        .find(|city| query.contains(*city))
        .map(|city| (*city).to_owned())
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    let place = pattern.captures(text)?.get(1)?.as_str().trim();
    (!place.is_empty()).then(|| place.to_owned())
}

/// Human-readable phrase for a WMO weather interpretation code.
pub fn describe_weather_code(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown conditions",
    }
}

/// A resolved place from the geocoding service.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

/// Parse a geocoding response (a JSON array of candidates) into its first
/// candidate.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the body is not a JSON array.
pub fn parse_geocode(body: &str) -> Result<Option<Place>, SearchError> {
    let hits: Vec<Value> = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid geocode response: {e}")))?;

    Ok(hits.first().and_then(|hit| {
        Some(Place {
            lat: coordinate(hit.get("lat")?)?,
            lon: coordinate(hit.get("lon")?)?,
            display_name: hit.get("display_name")?.as_str()?.to_owned(),
        })
    }))
}

/// Coordinates arrive as strings from some geocoders and numbers from others.
fn coordinate(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
struct Forecast {
    current: Option<Current>,
    #[serde(default)]
    current_units: HashMap<String, String>,
    daily: Option<Daily>,
    #[serde(default)]
    daily_units: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Current {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    precipitation: Option<f64>,
    weather_code: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Daily {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    weather_code: Vec<Option<i64>>,
}

fn reading(value: Option<f64>, units: &HashMap<String, String>, key: &str, default_unit: &str) -> String {
    let unit = units.get(key).map_or(default_unit, String::as_str);
    match value {
        Some(v) => format!("{v}{unit}"),
        None => "n/a".to_owned(),
    }
}

fn daily_reading(
    values: &[Option<f64>],
    day: usize,
    units: &HashMap<String, String>,
    key: &str,
    default_unit: &str,
) -> String {
    reading(values.get(day).copied().flatten(), units, key, default_unit)
}

fn forecast_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%a, %b %-d").to_string())
        .unwrap_or_else(|_| raw.to_owned())
}

/// Render current conditions plus the multi-day forecast.
///
/// Returns `None` when the payload carries no current-conditions block.
fn render_forecast(place: &str, forecast: &Forecast) -> Option<String> {
    let current = forecast.current.as_ref()?;
    let units = &forecast.current_units;
    let description = current
        .weather_code
        .map_or("Unknown conditions", describe_weather_code);

    let mut text = format!(
        "Current Weather in {place}: {description}, Temperature: {}, Humidity: {}, Wind Speed: {}, Precipitation: {}.",
        reading(current.temperature_2m, units, "temperature_2m", "°C"),
        reading(current.relative_humidity_2m, units, "relative_humidity_2m", "%"),
        reading(current.wind_speed_10m, units, "wind_speed_10m", "km/h"),
        reading(current.precipitation, units, "precipitation", "mm"),
    );

    if let Some(daily) = &forecast.daily {
        let units = &forecast.daily_units;
        text.push_str("\n\nForecast: ");
        for (day, date) in daily.time.iter().take(FORECAST_DAYS).enumerate() {
            let description = daily
                .weather_code
                .get(day)
                .copied()
                .flatten()
                .map_or("Unknown conditions", describe_weather_code);
            text.push_str(&format!(
                "\n{}: {description}, High: {}, Low: {}, Precipitation: {}.",
                forecast_date(date),
                daily_reading(&daily.temperature_2m_max, day, units, "temperature_2m_max", "°C"),
                daily_reading(&daily.temperature_2m_min, day, units, "temperature_2m_min", "°C"),
                daily_reading(&daily.precipitation_sum, day, units, "precipitation_sum", "mm"),
            ));
        }
    }

    Some(text)
}

/// Build the weather item for a resolved place from a raw forecast body.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the body is not a forecast object.
pub fn parse_forecast(body: &str, place: &str, source_name: &str) -> Result<SearchItem, SearchError> {
    let raw: Value = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid forecast response: {e}")))?;
    let forecast: Forecast = serde_json::from_value(raw.clone())
        .map_err(|e| SearchError::Parse(format!("unexpected forecast shape: {e}")))?;

    let title = format!("Weather for {place}");
    let item = match render_forecast(place, &forecast) {
        Some(content) => SearchItem::new(title, content, FORECAST_ATTRIBUTION, source_name, ContentKind::Weather)
            .detailed(true)
            .with_data(raw),
        None => SearchItem::new(
            title,
            format!("Weather information is temporarily unavailable for {place}."),
            FORECAST_ATTRIBUTION,
            source_name,
            ContentKind::Weather,
        ),
    };
    Ok(item)
}

/// The item returned when the geocoder has no candidate for `location`.
pub fn unresolved_location(location: &str, source_name: &str) -> SearchItem {
    SearchItem::new(
        format!("Weather information for {location}"),
        format!(
            "Could not find accurate location data for \"{location}\". Please try a more specific location name."
        ),
        FORECAST_ATTRIBUTION,
        source_name,
        ContentKind::Weather,
    )
    .detailed(true)
}

/// Geocode-then-forecast weather source.
///
/// The descriptor's endpoint is the forecast service; the geocoder is
/// configured separately.
pub struct WeatherAdapter {
    client: reqwest::Client,
    geocode_url: String,
    default_location: String,
}

impl WeatherAdapter {
    pub fn new(client: reqwest::Client, geocode_url: String, default_location: String) -> Self {
        Self {
            client,
            geocode_url,
            default_location,
        }
    }
}

impl SourceAdapter for WeatherAdapter {
    async fn execute(
        &self,
        source: &SourceDescriptor,
        query: &str,
        _max_results: usize,
    ) -> Result<Vec<SearchItem>, SearchError> {
        let location = extract_location(query).unwrap_or_else(|| self.default_location.clone());
        tracing::debug!(source = %source.name, location = %location, "weather location resolved");

        let geocode = self
            .client
            .get(&self.geocode_url)
            .query(&[("q", location.as_str()), ("format", "json"), ("limit", "1")])
            .header("Accept-Language", "en-US,en;q=0.9");
        let body = http::send_text(geocode, "geocoder").await?;

        let Some(place) = parse_geocode(&body)? else {
            tracing::debug!(location = %location, "no geocode candidate");
            return Ok(vec![unresolved_location(&location, &source.name)]);
        };

        let days = FORECAST_DAYS.to_string();
        let forecast = self.client.get(&source.endpoint).query(&[
            ("latitude", place.lat.as_str()),
            ("longitude", place.lon.as_str()),
            (
                "current",
                "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation,weather_code",
            ),
            (
                "daily",
                "temperature_2m_max,temperature_2m_min,precipitation_sum,weather_code",
            ),
            ("timezone", "auto"),
            ("forecast_days", days.as_str()),
        ]);
        let body = http::send_text(forecast, &source.name).await?;

        Ok(vec![parse_forecast(&body, &place.display_name, &source.name)?])
    }
}
