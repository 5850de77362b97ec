//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::stats::{PgStatsSource, StatsStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    stats: StatsStore<PgStatsSource>,
}

impl AppState {
    /// Create a new application state. The statistics store is created idle;
    /// it starts fetching the first time an admin opens the dashboard.
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let stats = StatsStore::new(
            PgStatsSource::new(pool.clone()),
            config.stats_refresh_interval,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                stats,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the admin statistics store.
    #[must_use]
    pub fn stats(&self) -> &StatsStore<PgStatsSource> {
        &self.inner.stats
    }
}
