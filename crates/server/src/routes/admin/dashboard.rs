//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::stats::UserStats;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::UserView;
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub user: UserView,
    pub stats: UserStats,
    pub loading: bool,
    pub error: Option<String>,
    pub last_fetched: Option<String>,
    pub refresh_secs: u64,
}

/// Display the admin dashboard.
///
/// The first visit initializes the statistics store and starts its periodic
/// refresh; later visits join or start a deduplicated fetch.
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> DashboardTemplate {
    let store = state.stats();
    if store.snapshot().await.is_initialized {
        store.fetch().await;
    } else {
        store.initialize().await;
    }

    let snapshot = store.snapshot().await;

    DashboardTemplate {
        user: UserView::from(&admin),
        loading: snapshot.is_loading,
        stats: snapshot.stats.unwrap_or_default(),
        error: snapshot.error,
        last_fetched: snapshot
            .last_fetched
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        refresh_secs: store.refresh_interval().as_secs().max(1),
    }
}
