// src/debounce.rs

use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::error::ClientError;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MIN_CHARS: usize = 2;

/* ============================================================
   Debouncer

   Timer + monotonically increasing generation counter. The
   counter is checked after every await point, so a result that
   arrives after cancellation (or after a newer run) is dropped
   on the floor rather than surfaced.
   ============================================================ */

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    /// Invalidate the current run: the pending timer is aborted and any
    /// in-flight work's completion is discarded.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Schedule `work` after the debounce delay, cancelling any previous
    /// run. `complete` only fires if no newer run has started by the time
    /// the work resolves.
    pub fn run<T, F, Fut, C>(&mut self, work: F, complete: C)
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        self.cancel();
        let generation = self.generation.load(Ordering::SeqCst);
        let counter = Arc::clone(&self.generation);
        let delay = self.delay;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if counter.load(Ordering::SeqCst) != generation {
                return;
            }
            let result = work().await;
            if counter.load(Ordering::SeqCst) != generation {
                return;
            }
            complete(result);
        }));
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/* ============================================================
   Autocomplete session
   ============================================================ */

#[async_trait]
pub trait SuggestionFetcher<T>: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<Vec<T>, ClientError>;
}

#[derive(Debug, Clone)]
pub struct AutocompleteConfig {
    pub debounce: Duration,
    pub min_chars: usize,
    /// Re-show the cached last-successful result set on an empty query
    /// instead of re-querying.
    pub show_cached_on_focus: bool,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_chars: DEFAULT_MIN_CHARS,
            show_cached_on_focus: true,
        }
    }
}

#[derive(Debug)]
struct SessionState<T> {
    suggestions: Vec<T>,
    last_results: Vec<T>,
    loading: bool,
    error: Option<String>,
}

impl<T> Default for SessionState<T> {
    fn default() -> Self {
        Self {
            suggestions: Vec::new(),
            last_results: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Debounce-and-cancel discipline for one typeahead field: each keystroke
/// restarts the delay timer, a new request invalidates the previous one,
/// and sub-threshold input clears the list without querying. Errors stay
/// local to the session; a cancelled request is a no-op, not an error.
pub struct AutocompleteSession<T> {
    fetcher: Arc<dyn SuggestionFetcher<T>>,
    config: AutocompleteConfig,
    state: Arc<Mutex<SessionState<T>>>,
    debouncer: Debouncer,
}

impl<T: Clone + Send + 'static> AutocompleteSession<T> {
    pub fn new(fetcher: Arc<dyn SuggestionFetcher<T>>, config: AutocompleteConfig) -> Self {
        let debouncer = Debouncer::new(config.debounce);
        Self {
            fetcher,
            config,
            state: Arc::new(Mutex::new(SessionState::default())),
            debouncer,
        }
    }

    pub fn suggestions(&self) -> Vec<T> {
        self.state
            .lock()
            .map(|state| state.suggestions.clone())
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().map(|state| state.loading).unwrap_or(false)
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().ok().and_then(|state| state.error.clone())
    }

    pub fn search(&mut self, query_input: &str) {
        let query = query_input.trim().to_string();

        if query.is_empty() {
            self.debouncer.cancel();
            if let Ok(mut state) = self.state.lock() {
                state.loading = false;
                state.error = None;
                state.suggestions =
                    if self.config.show_cached_on_focus && !state.last_results.is_empty() {
                        state.last_results.clone()
                    } else {
                        Vec::new()
                    };
            }
            return;
        }

        if query.chars().count() < self.config.min_chars {
            self.debouncer.cancel();
            if let Ok(mut state) = self.state.lock() {
                state.loading = false;
                state.error = None;
                state.suggestions.clear();
            }
            return;
        }

        if let Ok(mut state) = self.state.lock() {
            state.loading = true;
            state.error = None;
        }

        let fetcher = Arc::clone(&self.fetcher);
        let shared = Arc::clone(&self.state);
        self.debouncer.run(
            move || async move { fetcher.fetch(&query).await },
            move |outcome| {
                let Ok(mut state) = shared.lock() else {
                    return;
                };
                match outcome {
                    Ok(results) => {
                        state.last_results = results.clone();
                        state.suggestions = results;
                        state.error = None;
                    }
                    Err(err) => {
                        state.suggestions.clear();
                        state.error = Some(err.to_string());
                    }
                }
                state.loading = false;
            },
        );
    }

    /// Abort the timer and any in-flight request; its result, if it ever
    /// arrives, is discarded.
    pub fn cancel(&mut self) {
        self.debouncer.cancel();
        if let Ok(mut state) = self.state.lock() {
            state.loading = false;
        }
    }

    pub fn clear(&mut self) {
        self.cancel();
        if let Ok(mut state) = self.state.lock() {
            state.suggestions.clear();
            state.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Notify;

    struct RecordingFetcher {
        calls: Mutex<Vec<String>>,
        hold_first: Option<Arc<Notify>>,
    }

    impl RecordingFetcher {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                hold_first: None,
            })
        }

        fn holding_first(notify: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                hold_first: Some(notify),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SuggestionFetcher<String> for RecordingFetcher {
        async fn fetch(&self, query: &str) -> Result<Vec<String>, ClientError> {
            let call_index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(query.to_string());
                calls.len()
            };
            if call_index == 1
                && let Some(notify) = &self.hold_first
            {
                notify.notified().await;
                return Ok(vec!["Old Result".to_string()]);
            }
            Ok(vec![format!("{query} match")])
        }
    }

    fn session(
        fetcher: Arc<RecordingFetcher>,
        config: AutocompleteConfig,
    ) -> AutocompleteSession<String> {
        AutocompleteSession::new(fetcher, config)
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_queries_produce_one_call_for_the_final_string() {
        let fetcher = RecordingFetcher::new();
        let mut session = session(
            Arc::clone(&fetcher),
            AutocompleteConfig {
                debounce: Duration::from_millis(100),
                ..AutocompleteConfig::default()
            },
        );

        session.search("ca");
        tokio::time::sleep(Duration::from_millis(40)).await;
        session.search("car");
        tokio::time::sleep(Duration::from_millis(40)).await;
        session.search("care");
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(fetcher.calls(), vec!["care".to_string()]);
        assert_eq!(session.suggestions(), vec!["care match".to_string()]);
        assert!(!session.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_in_flight_result_is_discarded() {
        let release_first = Arc::new(Notify::new());
        let fetcher = RecordingFetcher::holding_first(Arc::clone(&release_first));
        let mut session = session(
            Arc::clone(&fetcher),
            AutocompleteConfig {
                debounce: Duration::from_millis(100),
                ..AutocompleteConfig::default()
            },
        );

        session.search("al");
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fetcher.calls(), vec!["al".to_string()]);
        assert!(session.is_loading());

        session.search("alex");
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(session.suggestions(), vec!["alex match".to_string()]);

        // let the first request's future resolve; nothing changes
        release_first.notify_waiters();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(session.suggestions(), vec!["alex match".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn sub_threshold_input_clears_without_querying() {
        let fetcher = RecordingFetcher::new();
        let mut session = session(Arc::clone(&fetcher), AutocompleteConfig::default());

        session.search("a");
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(fetcher.calls().is_empty());
        assert!(session.suggestions().is_empty());
        assert!(!session.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_reuses_cached_results() {
        let fetcher = RecordingFetcher::new();
        let mut session = session(Arc::clone(&fetcher), AutocompleteConfig::default());

        session.search("alex");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(session.suggestions(), vec!["alex match".to_string()]);

        session.search("");
        assert_eq!(session.suggestions(), vec!["alex match".to_string()]);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_clears_when_cache_reuse_disabled() {
        let fetcher = RecordingFetcher::new();
        let mut session = session(
            Arc::clone(&fetcher),
            AutocompleteConfig {
                show_cached_on_focus: false,
                ..AutocompleteConfig::default()
            },
        );

        session.search("alex");
        tokio::time::sleep(Duration::from_millis(400)).await;
        session.search("");
        assert!(session.suggestions().is_empty());
    }

    struct FailingFetcher;

    #[async_trait]
    impl SuggestionFetcher<String> for FailingFetcher {
        async fn fetch(&self, _query: &str) -> Result<Vec<String>, ClientError> {
            Err(ClientError::Decode("boom".into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_errors_stay_local_to_the_session() {
        let mut session: AutocompleteSession<String> =
            AutocompleteSession::new(Arc::new(FailingFetcher), AutocompleteConfig::default());

        session.search("alex");
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(session.suggestions().is_empty());
        assert!(session.error().is_some());
        assert!(!session.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_timer() {
        let fetcher = RecordingFetcher::new();
        let mut session = session(Arc::clone(&fetcher), AutocompleteConfig::default());

        session.search("alex");
        session.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(fetcher.calls().is_empty());
        assert!(!session.is_loading());
        assert!(session.error().is_none());
    }
}
