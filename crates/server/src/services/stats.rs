//! Admin statistics store.
//!
//! Holds the latest [`UserStats`] for the dashboard and keeps it fresh:
//!
//! - at most one fetch runs at a time; callers that arrive while one is in
//!   flight wait on that same fetch instead of starting another
//! - a failed fetch records its error but keeps the last good stats
//! - once initialized, a background task refetches every refresh interval,
//!   skipping the tick if a fetch is already running
//!
//! Each fetch runs on its own task, so a caller that is cancelled (client
//! disconnect) never leaves the in-flight slot occupied.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::db::stats::UserStats;
use crate::db::{RepositoryError, StatsRepository};

/// How far back a customer upgrade still counts as "new".
pub const NEWLY_UPGRADED_WINDOW_DAYS: i64 = 30;

/// Errors a [`StatsSource`] can report.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("failed to load user statistics: {0}")]
    Repository(#[from] RepositoryError),
    #[error("{0}")]
    Other(String),
}

/// Where the store gets its numbers from.
pub trait StatsSource: Send + Sync + 'static {
    /// Compute a fresh set of statistics.
    fn fetch_stats(&self) -> impl Future<Output = Result<UserStats, StatsError>> + Send;
}

/// Production source: counts straight from `PostgreSQL`.
#[derive(Clone)]
pub struct PgStatsSource {
    pool: PgPool,
}

impl PgStatsSource {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl StatsSource for PgStatsSource {
    async fn fetch_stats(&self) -> Result<UserStats, StatsError> {
        let now = Utc::now();
        let since = now - chrono::Duration::days(NEWLY_UPGRADED_WINDOW_DAYS);
        Ok(StatsRepository::new(&self.pool)
            .user_stats(now, since)
            .await?)
    }
}

/// Point-in-time copy of the store's state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub stats: Option<UserStats>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub last_fetched: Option<DateTime<Utc>>,
    pub is_initialized: bool,
}

type InFlight = Shared<BoxFuture<'static, ()>>;

struct Inner<S> {
    source: S,
    refresh_interval: Duration,
    state: RwLock<StatsSnapshot>,
    in_flight: Mutex<Option<InFlight>>,
    initializing: AtomicBool,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: StatsSource> Inner<S> {
    async fn run_fetch(&self) {
        let result = AssertUnwindSafe(self.source.fetch_stats())
            .catch_unwind()
            .await;

        {
            let mut state = self.state.write().await;
            match result {
                Ok(Ok(stats)) => {
                    state.stats = Some(stats);
                    state.error = None;
                    state.last_fetched = Some(Utc::now());
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "user statistics fetch failed");
                    state.error = Some(e.to_string());
                }
                Err(_) => {
                    tracing::error!("user statistics fetch panicked");
                    state.error = Some("An unexpected error occurred".to_string());
                }
            }
            state.is_loading = false;
        }

        *self.in_flight.lock().await = None;
    }
}

impl<S> Drop for Inner<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh_task.get_mut().take() {
            handle.abort();
        }
    }
}

/// Resets the `initializing` flag however `initialize` exits.
struct InitGuard<'a>(&'a AtomicBool);

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Shared, cheaply cloneable statistics store.
pub struct StatsStore<S = PgStatsSource> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for StatsStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StatsSource> StatsStore<S> {
    /// Create an idle store. Nothing is fetched until [`fetch`](Self::fetch)
    /// or [`initialize`](Self::initialize) is called.
    #[must_use]
    pub fn new(source: S, refresh_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                refresh_interval,
                state: RwLock::new(StatsSnapshot::default()),
                in_flight: Mutex::new(None),
                initializing: AtomicBool::new(false),
                refresh_task: Mutex::new(None),
            }),
        }
    }

    /// Fetch fresh statistics, or join the fetch already in flight.
    pub async fn fetch(&self) {
        let pending = {
            let mut slot = self.inner.in_flight.lock().await;
            if let Some(existing) = slot.as_ref() {
                existing.clone()
            } else {
                self.inner.state.write().await.is_loading = true;

                let inner = Arc::clone(&self.inner);
                let handle = tokio::spawn(async move { inner.run_fetch().await });
                let pending = async move {
                    if let Err(e) = handle.await {
                        tracing::error!(error = %e, "user statistics task failed");
                    }
                }
                .boxed()
                .shared();

                *slot = Some(pending.clone());
                pending
            }
        };

        pending.await;
    }

    /// Fetch once and start the periodic refresh. Later calls, and calls made
    /// while the first is still running, return immediately.
    pub async fn initialize(&self) {
        if self.inner.state.read().await.is_initialized {
            return;
        }
        if self.inner.initializing.swap(true, Ordering::AcqRel) {
            return;
        }
        let _guard = InitGuard(&self.inner.initializing);

        self.fetch().await;
        self.start_refresh().await;

        self.inner.state.write().await.is_initialized = true;
        tracing::debug!(
            interval_secs = self.inner.refresh_interval.as_secs(),
            "user statistics store initialized"
        );
    }

    async fn start_refresh(&self) {
        let mut task = self.inner.refresh_task.lock().await;
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.refresh_interval;
        *task = Some(tokio::spawn(refresh_loop(weak, period)));
    }

    /// Whether a fetch is currently running.
    pub async fn is_fetching(&self) -> bool {
        self.inner.in_flight.lock().await.is_some()
    }

    /// Clear the recorded error, keeping everything else.
    pub async fn clear_error(&self) {
        self.inner.state.write().await.error = None;
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> StatsSnapshot {
        self.inner.state.read().await.clone()
    }

    /// Stop the periodic refresh. Safe to call more than once.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.inner.refresh_task.lock().await.take() {
            handle.abort();
            tracing::debug!("user statistics refresh stopped");
        }
    }

    /// Interval between background refreshes.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        self.inner.refresh_interval
    }
}

async fn refresh_loop<S: StatsSource>(weak: Weak<Inner<S>>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(inner) = weak.upgrade() else {
            break;
        };
        let store = StatsStore { inner };
        if !store.is_fetching().await {
            store.fetch().await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    /// Scripted source: counts calls, waits `delay` per call, and fails when
    /// `fail` is set.
    #[derive(Clone, Default)]
    struct FakeSource {
        calls: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
        delay: Duration,
    }

    impl FakeSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl StatsSource for FakeSource {
        async fn fetch_stats(&self) -> Result<UserStats, StatsError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.delay).await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(StatsError::Other("database unavailable".to_string()));
            }
            Ok(UserStats {
                total_customers: i64::try_from(n).unwrap(),
                ..UserStats::default()
            })
        }
    }

    fn store(source: &FakeSource) -> StatsStore<FakeSource> {
        StatsStore::new(source.clone(), Duration::from_secs(300))
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_share_one_call() {
        let source = FakeSource {
            delay: Duration::from_millis(50),
            ..FakeSource::default()
        };
        let store = store(&source);

        tokio::join!(store.fetch(), store.fetch(), store.fetch());

        assert_eq!(source.calls(), 1);
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.stats.unwrap().total_customers, 1);
        assert!(!snapshot.is_loading);
        assert!(snapshot.last_fetched.is_some());
        assert!(!store.is_fetching().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_fetches_each_call_source() {
        let source = FakeSource::default();
        let store = store(&source);

        store.fetch().await;
        store.fetch().await;

        assert_eq!(source.calls(), 2);
        assert_eq!(store.snapshot().await.stats.unwrap().total_customers, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_stats() {
        let source = FakeSource::default();
        let store = store(&source);

        store.fetch().await;
        source.fail.store(true, Ordering::SeqCst);
        store.fetch().await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.stats.unwrap().total_customers, 1);
        assert_eq!(snapshot.error.as_deref(), Some("database unavailable"));
        assert!(!snapshot.is_loading);

        store.clear_error().await;
        assert_eq!(store.snapshot().await.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_clears_error() {
        let source = FakeSource::default();
        let store = store(&source);

        source.fail.store(true, Ordering::SeqCst);
        store.fetch().await;
        assert!(store.snapshot().await.error.is_some());

        source.fail.store(false, Ordering::SeqCst);
        store.fetch().await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.error, None);
        assert!(snapshot.stats.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_caller_does_not_strand_fetch() {
        let source = FakeSource {
            delay: Duration::from_millis(100),
            ..FakeSource::default()
        };
        let store = store(&source);

        let cancelled =
            tokio::time::timeout(Duration::from_millis(10), store.fetch()).await;
        assert!(cancelled.is_err());
        assert!(store.snapshot().await.is_loading);

        // Joins the fetch started by the cancelled caller.
        store.fetch().await;
        assert_eq!(source.calls(), 1);
        assert!(!store.snapshot().await.is_loading);
        assert!(!store.is_fetching().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_is_idempotent_and_refreshes() {
        let source = FakeSource::default();
        let store = store(&source);

        store.initialize().await;
        store.initialize().await;
        assert_eq!(source.calls(), 1);
        assert!(store.snapshot().await.is_initialized);

        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(source.calls(), 2);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(source.calls(), 3);

        store.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_tick_skipped_while_fetch_in_flight() {
        let source = FakeSource {
            delay: Duration::from_secs(10),
            ..FakeSource::default()
        };
        let store = store(&source);

        // Initial fetch runs 0s..10s; the first tick is due at 310s.
        store.initialize().await;
        assert_eq!(source.calls(), 1);

        tokio::time::sleep(Duration::from_secs(295)).await;
        let manual = tokio::spawn({
            let store = store.clone();
            async move { store.fetch().await }
        });

        // The 310s tick lands inside the manual fetch (305s..315s).
        tokio::time::sleep(Duration::from_secs(15)).await;
        manual.await.unwrap();
        assert_eq!(source.calls(), 2);
        assert!(!store.is_fetching().await);

        // The next tick finds the store idle and fetches.
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(source.calls(), 3);

        store.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_initialize_fetches_once() {
        let source = FakeSource {
            delay: Duration::from_millis(20),
            ..FakeSource::default()
        };
        let store = store(&source);

        tokio::join!(store.initialize(), store.initialize());

        assert_eq!(source.calls(), 1);
        store.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_refresh() {
        let source = FakeSource::default();
        let store = store(&source);

        store.initialize().await;
        store.shutdown().await;
        store.shutdown().await;

        tokio::time::sleep(Duration::from_secs(900)).await;
        assert_eq!(source.calls(), 1);
    }
}
