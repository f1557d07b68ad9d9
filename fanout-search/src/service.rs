//! The search engine entry point.
//!
//! [`SearchService`] owns every piece of mutable engine state: the enabled
//! flag, the source registry, the response cache and the last query. A
//! search never returns an error; failures surface as content (an empty
//! response with a notice, or a fallback response).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::adapter::SourceAdapter;
use crate::adapters::SourceAdapters;
use crate::cache::{CacheKey, ResponseCache};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::orchestrator::enrich::enrich_top;
use crate::orchestrator::fallback::run_fallback;
use crate::orchestrator::{aggregate, classify, fanout, select, Enricher, NoopEnricher, RetryPolicy};
use crate::registry::SourceRegistry;
use crate::types::{AggregatedResponse, SearchOptions, SearchStats};

/// Notice attached when a search is short-circuited.
pub const SHORT_CIRCUIT_NOTICE: &str = "search disabled or empty query";

/// Multi-source search engine.
///
/// Generic over the adapter so tests can run the full pipeline against
/// scripted sources; production code uses [`SourceAdapters`].
pub struct SearchService<A: SourceAdapter + 'static = SourceAdapters> {
    config: SearchConfig,
    enabled: AtomicBool,
    registry: Arc<SourceRegistry>,
    adapter: Arc<A>,
    cache: ResponseCache,
    enricher: Arc<dyn Enricher>,
    last_query: Mutex<Option<String>>,
}

impl SearchService<SourceAdapters> {
    /// Build a service with the built-in sources and HTTP adapters.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for invalid configuration and
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let adapter = SourceAdapters::new(&config)?;
        Self::with_adapter(config, adapter)
    }
}

impl<A: SourceAdapter + 'static> SearchService<A> {
    /// Build a service over the built-in source catalog with a custom
    /// adapter.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for invalid configuration.
    pub fn with_adapter(config: SearchConfig, adapter: A) -> Result<Self, SearchError> {
        let registry = SourceRegistry::from_config(&config);
        Self::with_registry(config, registry, adapter)
    }

    /// Build a service over an explicit source registry.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for invalid configuration.
    pub fn with_registry(
        config: SearchConfig,
        registry: SourceRegistry,
        adapter: A,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            enabled: AtomicBool::new(config.enabled),
            cache: ResponseCache::new(config.cache_ttl()),
            registry: Arc::new(registry),
            adapter: Arc::new(adapter),
            enricher: Arc::new(NoopEnricher),
            last_query: Mutex::new(None),
            config,
        })
    }

    /// Replace the enrichment pass applied to the top-ranked items.
    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = enricher;
        self
    }

    /// Answer `query` from the cache or by fanning out to the selected
    /// sources.
    ///
    /// Disabled search or a blank query short-circuits with an empty
    /// response and no network activity. Operation-level failures are
    /// answered by the fallback chain.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> AggregatedResponse {
        if !self.is_enabled() || query.trim().is_empty() {
            tracing::debug!("search short-circuited");
            return AggregatedResponse::short_circuit(query, SHORT_CIRCUIT_NOTICE);
        }

        tracing::trace!(query, "search requested");
        self.set_last_query(query);

        let key = CacheKey::new(query, options.max_results);
        if !options.force_refresh {
            if let Some(hit) = self.cache.get(&key).await {
                tracing::debug!(items = hit.items.len(), "cache hit");
                return hit;
            }
        }

        let tags = classify(query);
        let sources = select(&self.registry, &tags);
        let timeout = options.timeout.unwrap_or_else(|| self.config.timeout());

        let outcome = fanout::run(
            Arc::clone(&self.adapter),
            Arc::clone(&self.registry),
            sources,
            query,
            options.max_results,
            timeout,
            RetryPolicy::from_config(&self.config),
        )
        .await;

        let runs = match outcome {
            Ok(runs) => runs,
            Err(err) if err.is_operation_level() => {
                return run_fallback(
                    &*self.adapter,
                    &self.registry,
                    query,
                    &tags,
                    options.max_results,
                    timeout,
                    &err,
                )
                .await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "search failed");
                return AggregatedResponse::short_circuit(query, format!("search failed: {err}"));
            }
        };

        let mut response = aggregate(query, runs, &tags);
        response.items.truncate(options.max_results);
        if options.include_detailed {
            enrich_top(&mut response.items, self.enricher.as_ref());
        }

        if !response.is_empty() {
            self.cache.insert(key, response.clone()).await;
        }
        tracing::debug!(
            items = response.items.len(),
            successful_sources = response.metadata.successful_sources,
            "search complete"
        );
        response
    }

    /// Flip the enabled flag and return the new state.
    pub fn toggle_search_enabled(&self) -> bool {
        let enabled = !self.enabled.fetch_xor(true, Ordering::SeqCst);
        tracing::info!(enabled, "search toggled");
        enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("search cache cleared");
    }

    /// Mark every source working again.
    pub fn reset_sources(&self) {
        self.registry.reset();
        tracing::info!("source health reset");
    }

    /// Snapshot of engine state.
    pub async fn stats(&self) -> SearchStats {
        SearchStats {
            enabled: self.is_enabled(),
            cache_size: self.cache.len().await,
            last_query: self.last_query(),
            sources: self.registry.status_report(),
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn last_query(&self) -> Option<String> {
        self.last_query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_last_query(&self, query: &str) {
        *self
            .last_query
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(query.to_owned());
    }
}
