//! User statistics API for admins.
//!
//! Every response is `{"success": true, "data": ...}` or
//! `{"success": false, "error": "..."}`.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::stats::UserStats;
use crate::db::{StatsRepository, UserRepository};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, NewCustomer};
use crate::services::stats::{NEWLY_UPGRADED_WINDOW_DAYS, StatsSnapshot};
use crate::state::AppState;

const STATS_FORBIDDEN: &str = "Unauthorized. Only admins can fetch user statistics.";
const CUSTOMERS_FORBIDDEN: &str = "Unauthorized. Only admins can fetch customer details.";

/// Longest newly-upgraded window accepted by `new-customers`.
const MAX_WINDOW_DAYS: i64 = 365;

/// Envelope for statistics responses.
#[derive(Debug, Serialize)]
pub struct StatsResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> StatsResponse<T> {
    fn ok(data: T) -> Response {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
        .into_response()
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(StatsResponse::<()> {
            success: false,
            data: None,
            error: Some(message.to_string()),
        }),
    )
        .into_response()
}

fn forbidden(user: &CurrentUser, message: &str) -> Option<Response> {
    if user.is_admin() {
        return None;
    }
    tracing::warn!(user_id = %user.id, role = %user.role, "non-admin denied statistics");
    Some(failure(StatusCode::FORBIDDEN, message))
}

/// Current user statistics, read straight from the database.
///
/// GET /admin/api/stats
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn user_statistics(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Response {
    if let Some(denied) = forbidden(&user, STATS_FORBIDDEN) {
        return denied;
    }

    let now = Utc::now();
    let since = now - chrono::Duration::days(NEWLY_UPGRADED_WINDOW_DAYS);

    match StatsRepository::new(state.pool()).user_stats(now, since).await {
        Ok(stats) => StatsResponse::<UserStats>::ok(stats),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch user statistics");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch user statistics",
            )
        }
    }
}

/// Refresh the shared statistics store and return its state.
///
/// POST /admin/api/stats/refresh
///
/// Concurrent refreshes share a single database round trip.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn refresh(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Response {
    if let Some(denied) = forbidden(&user, STATS_FORBIDDEN) {
        return denied;
    }

    state.stats().fetch().await;
    StatsResponse::<StatsSnapshot>::ok(state.stats().snapshot().await)
}

/// Query for `new-customers`.
#[derive(Debug, Deserialize)]
pub struct NewCustomersQuery {
    pub days: Option<String>,
}

/// Parse `?days=`, defaulting to the dashboard window.
fn parse_days(raw: Option<&str>) -> Option<i64> {
    match raw.map(str::trim) {
        None | Some("") => Some(NEWLY_UPGRADED_WINDOW_DAYS),
        Some(s) => s
            .parse::<i64>()
            .ok()
            .filter(|d| (1..=MAX_WINDOW_DAYS).contains(d)),
    }
}

/// Customers upgraded within the last `days` days.
///
/// GET /admin/api/stats/new-customers?days=
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn new_customers(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<NewCustomersQuery>,
) -> Response {
    if let Some(denied) = forbidden(&user, CUSTOMERS_FORBIDDEN) {
        return denied;
    }

    let Some(days) = parse_days(query.days.as_deref()) else {
        return failure(
            StatusCode::BAD_REQUEST,
            "days must be a whole number between 1 and 365",
        );
    };
    let since = Utc::now() - chrono::Duration::days(days);

    match UserRepository::new(state.pool())
        .newly_upgraded_customers(since)
        .await
    {
        Ok(customers) => StatsResponse::<Vec<NewCustomer>>::ok(customers),
        Err(e) => {
            tracing::error!(error = %e, days, "failed to fetch newly upgraded customers");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch customer details",
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_days() {
        assert_eq!(parse_days(None), Some(30));
        assert_eq!(parse_days(Some("")), Some(30));
        assert_eq!(parse_days(Some("7")), Some(7));
        assert_eq!(parse_days(Some("365")), Some(365));
        assert_eq!(parse_days(Some("0")), None);
        assert_eq!(parse_days(Some("366")), None);
        assert_eq!(parse_days(Some("-1")), None);
        assert_eq!(parse_days(Some("week")), None);
    }

    #[test]
    fn test_success_envelope() {
        let body = serde_json::to_value(StatsResponse {
            success: true,
            data: Some(UserStats {
                total_customers: 3,
                ..UserStats::default()
            }),
            error: None,
        })
        .unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["totalCustomers"], 3);
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_failure_status() {
        let resp = failure(StatusCode::FORBIDDEN, STATS_FORBIDDEN);
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
