//! Concurrent fan-out with per-source retry and a shared deadline.
//!
//! Every selected source runs as its own spawned task. The executor waits
//! for tasks to settle until the deadline, keeps whatever settled, and
//! reports the rest as timed out. Tasks still running at the deadline are
//! detached rather than aborted; their late results are discarded.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::{timeout_at, Instant};

use crate::adapter::SourceAdapter;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::registry::{SourceDescriptor, SourceRegistry};
use crate::types::SearchItem;

/// Retry schedule for a single source.
///
/// Retry `n` (1-based) waits `n × base_delay` before running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// Delay before the given retry, saturating at [`Duration::MAX`].
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.checked_mul(retry).unwrap_or(Duration::MAX)
    }
}

/// How one source's invocation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Succeeded(Vec<SearchItem>),
    /// Every attempt failed; carries the last error message.
    Failed(String),
    /// Still running when the deadline elapsed.
    TimedOut,
}

/// A dispatched source together with its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRun {
    pub source: SourceDescriptor,
    pub outcome: SourceOutcome,
}

/// Invoke one source, retrying failures per `policy`.
///
/// Success marks the source working; exhausting the retries marks it not
/// working. Attempts are strictly sequential.
pub async fn invoke_with_retry<A: SourceAdapter>(
    adapter: &A,
    registry: &SourceRegistry,
    source: &SourceDescriptor,
    query: &str,
    max_results: usize,
    policy: RetryPolicy,
) -> SourceOutcome {
    let mut retry = 0;
    loop {
        match adapter.execute(source, query, max_results).await {
            Ok(items) => {
                registry.record_success(&source.name);
                tracing::debug!(source = %source.name, count = items.len(), retry, "source succeeded");
                return SourceOutcome::Succeeded(items);
            }
            Err(err) if retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_for(retry);
                tracing::debug!(
                    source = %source.name,
                    error = %err,
                    retry,
                    delay_ms = delay.as_millis() as u64,
                    "source failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                registry.record_failure(&source.name);
                tracing::warn!(
                    source = %source.name,
                    error = %err,
                    attempts = retry + 1,
                    "source exhausted retries"
                );
                return SourceOutcome::Failed(err.to_string());
            }
        }
    }
}

/// Run every source concurrently and collect one outcome per source, in
/// the order given.
///
/// # Errors
///
/// Returns [`SearchError::NoSources`] if `sources` is empty and
/// [`SearchError::Timeout`] if no source settled before the deadline.
pub async fn run<A: SourceAdapter + 'static>(
    adapter: Arc<A>,
    registry: Arc<SourceRegistry>,
    sources: Vec<SourceDescriptor>,
    query: &str,
    max_results: usize,
    timeout: Duration,
    policy: RetryPolicy,
) -> Result<Vec<SourceRun>, SearchError> {
    if sources.is_empty() {
        return Err(SearchError::NoSources(
            "no working source matches the query".into(),
        ));
    }

    let deadline = Instant::now() + timeout;
    let mut pending: FuturesUnordered<_> = sources
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let adapter = Arc::clone(&adapter);
            let registry = Arc::clone(&registry);
            let source = source.clone();
            let query = query.to_owned();
            let handle = tokio::spawn(async move {
                invoke_with_retry(&*adapter, &registry, &source, &query, max_results, policy).await
            });
            async move { (index, handle.await) }
        })
        .collect();

    let mut settled: Vec<Option<SourceOutcome>> = vec![None; sources.len()];
    loop {
        match timeout_at(deadline, pending.next()).await {
            Ok(Some((index, Ok(outcome)))) => settled[index] = Some(outcome),
            Ok(Some((index, Err(join_err)))) => {
                tracing::warn!(source = %sources[index].name, error = %join_err, "source task aborted");
                settled[index] = Some(SourceOutcome::Failed(format!("task failed: {join_err}")));
            }
            Ok(None) => break,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    outstanding = pending.len(),
                    "fan-out deadline elapsed"
                );
                break;
            }
        }
    }

    if settled.iter().all(Option::is_none) {
        return Err(SearchError::Timeout(format!(
            "no source responded within {} ms",
            timeout.as_millis()
        )));
    }

    Ok(sources
        .into_iter()
        .zip(settled)
        .map(|(source, outcome)| SourceRun {
            source,
            outcome: outcome.unwrap_or(SourceOutcome::TimedOut),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::types::{ContentKind, SourceDomain, SourceFamily};

    /// Per-source script: how long each call takes and how many initial
    /// calls fail.
    #[derive(Clone, Copy)]
    struct Script {
        latency: Duration,
        failures: usize,
    }

    #[derive(Default)]
    struct ScriptedAdapter {
        scripts: HashMap<String, Script>,
        calls: Mutex<HashMap<String, usize>>,
        total: AtomicUsize,
    }

    impl ScriptedAdapter {
        fn with(mut self, name: &str, latency_ms: u64, failures: usize) -> Self {
            self.scripts.insert(
                name.to_owned(),
                Script {
                    latency: Duration::from_millis(latency_ms),
                    failures,
                },
            );
            self
        }

        fn calls(&self, name: &str) -> usize {
            self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
        }
    }

    impl SourceAdapter for ScriptedAdapter {
        async fn execute(
            &self,
            source: &SourceDescriptor,
            _query: &str,
            _max_results: usize,
        ) -> Result<Vec<SearchItem>, SearchError> {
            self.total.fetch_add(1, Ordering::SeqCst);
            let call = {
                let mut calls = self.calls.lock().unwrap();
                let n = calls.entry(source.name.clone()).or_insert(0);
                *n += 1;
                *n
            };
            let script = self.scripts.get(&source.name).copied().unwrap_or(Script {
                latency: Duration::ZERO,
                failures: 0,
            });
            tokio::time::sleep(script.latency).await;
            if call <= script.failures {
                return Err(SearchError::Http(format!("{} attempt {call} failed", source.name)));
            }
            Ok(vec![SearchItem::new(
                format!("{} item", source.name),
                "body",
                format!("https://{}.example", source.name.to_lowercase()),
                &source.name,
                ContentKind::General,
            )])
        }
    }

    fn descriptor(name: &str) -> SourceDescriptor {
        SourceDescriptor::new(name, SourceFamily::InstantAnswer, SourceDomain::General, "http://x")
    }

    fn registry(names: &[&str]) -> Arc<SourceRegistry> {
        Arc::new(SourceRegistry::new(names.iter().map(|n| descriptor(n)).collect()))
    }

    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(50),
            "elapsed {elapsed:?}, expected about {expected:?}"
        );
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }

    #[test]
    fn backoff_grows_linearly() {
        let p = policy();
        assert_eq!(p.delay_for(1), Duration::from_secs(1));
        assert_eq!(p.delay_for(2), Duration::from_secs(2));
        assert_eq!(p.delay_for(3), Duration::from_secs(3));
    }

    #[test]
    fn huge_base_delay_saturates() {
        let config = SearchConfig {
            retry_base_delay_ms: u64::MAX,
            ..Default::default()
        };
        let p = RetryPolicy::from_config(&config);
        assert_eq!(p.delay_for(3), Duration::MAX);
    }

    #[test]
    fn policy_from_config() {
        let p = RetryPolicy::from_config(&SearchConfig::default());
        assert_eq!(p, policy());
    }

    #[tokio::test(start_paused = true)]
    async fn all_sources_succeed_in_selection_order() {
        let adapter = Arc::new(ScriptedAdapter::default().with("A", 300, 0).with("B", 10, 0));
        let registry = registry(&["A", "B"]);
        let runs = run(
            adapter,
            registry,
            vec![descriptor("A"), descriptor("B")],
            "q",
            5,
            Duration::from_secs(15),
            policy(),
        )
        .await
        .expect("runs");

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].source.name, "A");
        assert_eq!(runs[1].source.name, "B");
        assert!(matches!(runs[0].outcome, SourceOutcome::Succeeded(ref items) if items.len() == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_then_succeeds_and_stays_working() {
        let adapter = Arc::new(ScriptedAdapter::default().with("A", 0, 2));
        let registry = registry(&["A"]);
        let start = Instant::now();
        let outcome = invoke_with_retry(&*adapter, &registry, &descriptor("A"), "q", 5, policy()).await;

        assert!(matches!(outcome, SourceOutcome::Succeeded(_)));
        assert_eq!(adapter.calls("A"), 3);
        // Slept 1s then 2s.
        assert_elapsed(start, Duration::from_secs(3));
        assert!(registry.is_working("A"));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_mark_not_working() {
        let adapter = Arc::new(ScriptedAdapter::default().with("A", 0, usize::MAX));
        let registry = registry(&["A"]);
        let start = Instant::now();
        let outcome = invoke_with_retry(&*adapter, &registry, &descriptor("A"), "q", 5, policy()).await;

        match outcome {
            SourceOutcome::Failed(msg) => assert!(msg.contains("attempt 4 failed")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(adapter.calls("A"), 4);
        assert_elapsed(start, Duration::from_secs(6));
        assert!(!registry.is_working("A"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out_others_kept() {
        let adapter = Arc::new(ScriptedAdapter::default().with("Fast", 100, 0).with("Slow", 60_000, 0));
        let registry = registry(&["Fast", "Slow"]);
        let start = Instant::now();
        let runs = run(
            adapter,
            Arc::clone(&registry),
            vec![descriptor("Slow"), descriptor("Fast")],
            "q",
            5,
            Duration::from_secs(2),
            policy(),
        )
        .await
        .expect("partial outcomes");

        assert_elapsed(start, Duration::from_secs(2));
        assert_eq!(runs[0].outcome, SourceOutcome::TimedOut);
        assert!(matches!(runs[1].outcome, SourceOutcome::Succeeded(_)));
        // A timed-out source is not a failed source.
        assert!(registry.is_working("Slow"));
    }

    #[tokio::test(start_paused = true)]
    async fn retrying_source_cut_off_by_deadline() {
        let adapter = Arc::new(ScriptedAdapter::default().with("Flaky", 0, usize::MAX).with("Ok", 0, 0));
        let registry = registry(&["Flaky", "Ok"]);
        let runs = run(
            Arc::clone(&adapter),
            registry,
            vec![descriptor("Flaky"), descriptor("Ok")],
            "q",
            5,
            Duration::from_millis(2500),
            policy(),
        )
        .await
        .expect("partial outcomes");

        assert_eq!(runs[0].outcome, SourceOutcome::TimedOut);
        // Initial attempt at 0s, retries at 1s and 3s; only two fit before 2.5s.
        assert_eq!(adapter.calls("Flaky"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_settled_is_timeout_error() {
        let adapter = Arc::new(ScriptedAdapter::default().with("Slow", 60_000, 0));
        let registry = registry(&["Slow"]);
        let err = run(
            adapter,
            registry,
            vec![descriptor("Slow")],
            "q",
            5,
            Duration::from_secs(1),
            policy(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SearchError::Timeout(_)));
        assert!(err.is_operation_level());
    }

    #[tokio::test]
    async fn empty_selection_is_no_sources() {
        let adapter = Arc::new(ScriptedAdapter::default());
        let err = run(adapter, registry(&[]), vec![], "q", 5, Duration::from_secs(1), policy())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::NoSources(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_an_outcome_not_an_error() {
        let adapter = Arc::new(ScriptedAdapter::default().with("Bad", 0, usize::MAX));
        let registry = registry(&["Bad"]);
        let runs = run(
            Arc::clone(&adapter),
            Arc::clone(&registry),
            vec![descriptor("Bad")],
            "q",
            5,
            Duration::from_secs(15),
            policy(),
        )
        .await
        .expect("failure still settles");
        assert!(matches!(runs[0].outcome, SourceOutcome::Failed(_)));
        assert_eq!(adapter.total.load(Ordering::SeqCst), 4);
        assert!(!registry.is_working("Bad"));
    }
}
