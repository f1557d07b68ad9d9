//! Source registry: the static catalog of sources plus their live/dead flags.
//!
//! Every source has a descriptor (identity, family, domain, endpoint) and a
//! health record. The `working` flag is written only through
//! [`SourceRegistry::record_success`] and [`SourceRegistry::record_failure`],
//! and each source is driven by exactly one fan-out task at a time, so
//! writes never conflict.
//!
//! ```text
//! ┌─────────┐  retries exhausted  ┌─────────────┐
//! │ working ├────────────────────►│ not working │
//! └───▲─────┘                     └──────┬──────┘
//!     │            success               │
//!     └──────────────────────────────────┘
//! ```
//!
//! A source marked not working is skipped by selection until a later
//! success (e.g. via the fallback path) or [`SourceRegistry::reset`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::types::{SourceDomain, SourceFamily, SourceStatus};

/// Identity and routing data for one external source.
///
/// Snapshots handed out by the registry carry the `working` flag as it was
/// when the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Unique source name.
    pub name: String,
    /// Which adapter speaks to this source.
    pub family: SourceFamily,
    /// Domain the source is registered under.
    pub domain: SourceDomain,
    /// Primary endpoint or base URL.
    pub endpoint: String,
    /// Whether the source needs credentials to return live data.
    pub requires_auth: bool,
    /// Whether direct requests are known to be accepted. When false,
    /// requests may be retried through reverse proxies.
    pub direct_access: bool,
    /// Whether the source is currently considered healthy.
    pub working: bool,
}

impl SourceDescriptor {
    /// Create a working descriptor with direct access and no authentication.
    pub fn new(
        name: impl Into<String>,
        family: SourceFamily,
        domain: SourceDomain,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            domain,
            endpoint: endpoint.into(),
            requires_auth: false,
            direct_access: true,
            working: true,
        }
    }

    /// Set the authentication flag.
    pub fn requires_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }

    /// Set the direct-access flag.
    pub fn direct_access(mut self, direct_access: bool) -> Self {
        self.direct_access = direct_access;
        self
    }
}

/// Health tracking data for a single source.
#[derive(Debug, Clone)]
pub struct SourceHealth {
    pub working: bool,
    /// Number of exhausted invocations since the last success.
    pub consecutive_failures: u32,
}

impl Default for SourceHealth {
    fn default() -> Self {
        Self {
            working: true,
            consecutive_failures: 0,
        }
    }
}

/// Process-scoped catalog of sources, grouped by domain.
///
/// Passed explicitly (behind an `Arc`) to selection and the fan-out
/// executor; there is no global instance.
#[derive(Debug)]
pub struct SourceRegistry {
    sources: Vec<SourceDescriptor>,
    health: Mutex<HashMap<String, SourceHealth>>,
}

impl SourceRegistry {
    /// Build a registry from an ordered list of descriptors.
    ///
    /// Registration order is preserved and drives selection order. Later
    /// descriptors with a name already seen are ignored.
    pub fn new(descriptors: Vec<SourceDescriptor>) -> Self {
        let mut sources: Vec<SourceDescriptor> = Vec::with_capacity(descriptors.len());
        let mut health = HashMap::new();
        for descriptor in descriptors {
            if health.contains_key(&descriptor.name) {
                tracing::warn!(source = %descriptor.name, "duplicate source name ignored");
                continue;
            }
            health.insert(
                descriptor.name.clone(),
                SourceHealth {
                    working: descriptor.working,
                    ..Default::default()
                },
            );
            sources.push(descriptor);
        }
        Self {
            sources,
            health: Mutex::new(health),
        }
    }

    /// The built-in catalog, with endpoints taken from `config`.
    pub fn from_config(config: &SearchConfig) -> Self {
        let endpoints = &config.endpoints;
        let mut descriptors = vec![
            SourceDescriptor::new(
                "Open-Meteo",
                SourceFamily::Weather,
                SourceDomain::Weather,
                &endpoints.forecast,
            ),
            SourceDescriptor::new(
                "NewsAPI",
                SourceFamily::News,
                SourceDomain::News,
                &endpoints.news,
            )
            .requires_auth(true),
            SourceDescriptor::new(
                "DuckDuckGo",
                SourceFamily::InstantAnswer,
                SourceDomain::General,
                &endpoints.instant_answer,
            ),
            SourceDescriptor::new(
                "Wikipedia",
                SourceFamily::Encyclopedia,
                SourceDomain::General,
                &endpoints.encyclopedia_search,
            ),
        ];
        descriptors.extend(endpoints.meta_search.iter().map(|base| {
            SourceDescriptor::new(
                format!("SearXNG ({})", host_label(base)),
                SourceFamily::MetaSearch,
                SourceDomain::General,
                base,
            )
            .direct_access(false)
        }));
        descriptors.push(SourceDescriptor::new(
            "arXiv",
            SourceFamily::Academic,
            SourceDomain::Academic,
            &endpoints.academic,
        ));
        Self::new(descriptors)
    }

    /// All sources registered under `domain` that are currently working,
    /// in registration order.
    pub fn working_in(&self, domain: SourceDomain) -> Vec<SourceDescriptor> {
        let health = self.lock();
        self.sources
            .iter()
            .filter(|s| s.domain == domain)
            .filter(|s| health.get(&s.name).is_none_or(|h| h.working))
            .map(|s| snapshot(s, &health))
            .collect()
    }

    /// The dependable encyclopedic source used by the fallback path,
    /// regardless of its working flag.
    pub fn dependable(&self) -> Option<SourceDescriptor> {
        let health = self.lock();
        self.sources
            .iter()
            .find(|s| s.family == SourceFamily::Encyclopedia)
            .map(|s| snapshot(s, &health))
    }

    /// Look up a source by name.
    pub fn get(&self, name: &str) -> Option<SourceDescriptor> {
        let health = self.lock();
        self.sources
            .iter()
            .find(|s| s.name == name)
            .map(|s| snapshot(s, &health))
    }

    /// Whether the named source is currently marked working.
    ///
    /// Unknown names report `false`.
    pub fn is_working(&self, name: &str) -> bool {
        self.lock().get(name).is_some_and(|h| h.working)
    }

    /// Record a successful invocation: the source is working again.
    pub fn record_success(&self, name: &str) {
        let mut health = self.lock();
        if let Some(h) = health.get_mut(name) {
            if !h.working {
                tracing::info!(source = name, "source recovered");
            }
            h.working = true;
            h.consecutive_failures = 0;
        }
    }

    /// Record an invocation whose retries were exhausted: the source is
    /// marked not working.
    pub fn record_failure(&self, name: &str) {
        let mut health = self.lock();
        if let Some(h) = health.get_mut(name) {
            h.working = false;
            h.consecutive_failures += 1;
            tracing::warn!(
                source = name,
                failures = h.consecutive_failures,
                "source marked not working"
            );
        }
    }

    /// Mark every source working with a clean failure count.
    pub fn reset(&self) {
        let mut health = self.lock();
        for h in health.values_mut() {
            *h = SourceHealth::default();
        }
    }

    /// Health report for every registered source, in registration order.
    pub fn status_report(&self) -> Vec<SourceStatus> {
        let health = self.lock();
        self.sources
            .iter()
            .map(|s| {
                let h = health.get(&s.name).cloned().unwrap_or_default();
                SourceStatus {
                    name: s.name.clone(),
                    family: s.family,
                    domain: s.domain,
                    working: h.working,
                    direct_access: s.direct_access,
                    consecutive_failures: h.consecutive_failures,
                }
            })
            .collect()
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SourceHealth>> {
        // Health entries are plain flags; a panic mid-update cannot leave
        // them inconsistent.
        self.health
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn snapshot(source: &SourceDescriptor, health: &HashMap<String, SourceHealth>) -> SourceDescriptor {
    let mut descriptor = source.clone();
    descriptor.working = health.get(&source.name).is_none_or(|h| h.working);
    descriptor
}

/// Short display label for a meta-search instance: its host, or the raw
/// base when it does not parse as a URL.
fn host_label(base: &str) -> String {
    url::Url::parse(base)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| base.to_owned())
}
