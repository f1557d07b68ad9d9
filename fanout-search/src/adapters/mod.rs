//! Concrete source adapters, one per source family.
//!
//! [`SourceAdapters`] bundles one adapter per family behind a single
//! [`SourceAdapter`] implementation that dispatches on the descriptor's
//! family. This is what the service uses by default.

pub mod academic;
pub mod encyclopedia;
pub mod instant_answer;
pub mod meta_search;
pub mod news;
pub mod weather;

use std::sync::Arc;

use crate::adapter::SourceAdapter;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http::{self, ProxyFetcher};
use crate::registry::SourceDescriptor;
use crate::types::{SearchItem, SourceFamily};

pub use academic::AcademicAdapter;
pub use encyclopedia::EncyclopediaAdapter;
pub use instant_answer::InstantAnswerAdapter;
pub use meta_search::MetaSearchAdapter;
pub use news::NewsAdapter;
pub use weather::{extract_location, WeatherAdapter};

/// Every built-in adapter, sharing one HTTP client.
pub struct SourceAdapters {
    weather: WeatherAdapter,
    news: NewsAdapter,
    instant_answer: InstantAnswerAdapter,
    encyclopedia: EncyclopediaAdapter,
    meta_search: MetaSearchAdapter,
    academic: AcademicAdapter,
}

impl SourceAdapters {
    /// Build the adapters from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = http::build_client(config)?;
        let endpoints = &config.endpoints;
        let fetcher = Arc::new(ProxyFetcher::new(client.clone(), config.proxies.clone()));

        Ok(Self {
            weather: WeatherAdapter::new(
                client.clone(),
                endpoints.geocode.clone(),
                config.default_location.clone(),
            ),
            news: NewsAdapter::new(client.clone(), config.news_api_key.clone()),
            instant_answer: InstantAnswerAdapter::new(client.clone()),
            encyclopedia: EncyclopediaAdapter::new(
                client.clone(),
                endpoints.encyclopedia_summary.clone(),
                endpoints.encyclopedia_article.clone(),
            ),
            meta_search: MetaSearchAdapter::new(fetcher),
            academic: AcademicAdapter::new(client),
        })
    }
}

impl SourceAdapter for SourceAdapters {
    async fn execute(
        &self,
        source: &SourceDescriptor,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchItem>, SearchError> {
        match source.family {
            SourceFamily::Weather => self.weather.execute(source, query, max_results).await,
            SourceFamily::News => self.news.execute(source, query, max_results).await,
            SourceFamily::InstantAnswer => {
                self.instant_answer
                    .execute(source, query, max_results)
                    .await
            }
            SourceFamily::Encyclopedia => {
                self.encyclopedia
                    .execute(source, query, max_results)
                    .await
            }
            SourceFamily::MetaSearch => {
                self.meta_search
                    .execute(source, query, max_results)
                    .await
            }
            SourceFamily::Academic => self.academic.execute(source, query, max_results).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_default_config() {
        assert!(SourceAdapters::new(&SearchConfig::default()).is_ok());
    }

    #[test]
    fn adapters_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SourceAdapters>();
    }
}
