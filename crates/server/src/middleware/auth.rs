//! Authentication middleware and extractors.
//!
//! The session only stores who logged in. [`RequireAuth`] and
//! [`RequireAdmin`] re-read the user row on every request, so a role change or
//! a deleted account takes effect without waiting for the session to expire.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::clear_sentry_user;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Message shown when a signed-in user lacks admin privileges.
pub const ADMIN_ONLY_MESSAGE: &str = "Unauthorized. Only admins can access this resource.";

/// Whether a path belongs to a JSON API (401/403 instead of redirects).
#[must_use]
pub fn is_api_path(path: &str) -> bool {
    path.starts_with("/api/") || path.starts_with("/admin/api/")
}

/// Extractor that requires a signed-in user.
///
/// HTML requests without a session are redirected to `/login`; API requests
/// get `401 {"error":"Unauthorized"}`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a signed-in user with the admin or super admin role.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when authentication or authorization fails.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in, but not an admin.
    Forbidden,
    /// Session store or database failure.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, ADMIN_ONLY_MESSAGE).into_response(),
            Self::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

fn not_logged_in(parts: &Parts) -> AuthRejection {
    if is_api_path(parts.uri.path()) {
        AuthRejection::Unauthorized
    } else {
        AuthRejection::RedirectToLogin
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::Unauthorized)?;

        let current: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| not_logged_in(parts))?;

        let user = UserRepository::new(state.pool())
            .get_by_id(current.id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %current.id, "failed to load session user");
                AuthRejection::Internal
            })?;

        let Some(user) = user else {
            // Account deleted since login.
            tracing::info!(user_id = %current.id, "session user no longer exists");
            let _ = clear_current_user(&session).await;
            clear_sentry_user();
            return Err(not_logged_in(parts));
        };

        let fresh = CurrentUser::from(&user);
        if fresh != current {
            // Keep the session copy in step with the database.
            let _ = set_current_user(&session, &fresh).await;
        }

        Ok(Self(fresh))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, role = %user.role, "non-admin denied");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user from the session.
///
/// Unlike `RequireAuth`, this does not reject the request and does not touch
/// the database.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_api_path() {
        assert!(is_api_path("/api/search"));
        assert!(is_api_path("/admin/api/stats"));
        assert!(!is_api_path("/admin"));
        assert!(!is_api_path("/admin/book/Table"));
        assert!(!is_api_path("/apiary"));
    }

    #[test]
    fn test_rejection_status_codes() {
        assert_eq!(
            AuthRejection::RedirectToLogin.into_response().status(),
            StatusCode::SEE_OTHER
        );
        assert_eq!(
            AuthRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
