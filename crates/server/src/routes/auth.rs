//! Authentication route handlers.
//!
//! Username/password login and self-service registration. New accounts start
//! with the `user` role until an admin upgrades them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub username: String,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
    pub username: String,
    pub email: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Signed-in users go straight to the storefront.
pub async fn login_page(OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        error: None,
        username: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let result = AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await;

    match result {
        Ok(user) => match start_session(&session, &user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id, "user logged in");
                Redirect::to("/").into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to store session");
                login_failed(
                    &form.username,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_ERROR_MESSAGE.to_string(),
                )
            }
        },
        Err(e) => {
            if e.is_client_error() {
                tracing::warn!(error = %e, "login rejected");
            } else {
                tracing::error!(error = %e, "login failed");
            }
            let status = if matches!(e, AuthError::InvalidCredentials) {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            login_failed(&form.username, status, e.user_message())
        }
    }
}

fn login_failed(username: &str, status: StatusCode, message: String) -> Response {
    (
        status,
        LoginTemplate {
            error: Some(message),
            username: username.to_string(),
        },
    )
        .into_response()
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    SignupTemplate {
        error: None,
        username: String::new(),
        email: String::new(),
    }
    .into_response()
}

/// Handle sign-up form submission. A successful registration is logged in.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let rerender = |status: StatusCode, message: String| {
        (
            status,
            SignupTemplate {
                error: Some(message),
                username: form.username.clone(),
                email: form.email.clone(),
            },
        )
            .into_response()
    };

    if form.password != form.password_confirm {
        return rerender(StatusCode::BAD_REQUEST, "Passwords do not match".to_string());
    }

    let user = match AuthService::new(state.pool())
        .register(&form.username, &form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            let status = match &e {
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                e if e.is_client_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status.is_server_error() {
                tracing::error!(error = %e, "registration failed");
            }
            return rerender(status, e.user_message());
        }
    };

    if let Err(e) = start_session(&session, &user).await {
        // The account exists; let them sign in normally.
        tracing::error!(error = %e, "failed to store session after registration");
        return Redirect::to("/login").into_response();
    }

    Redirect::to("/").into_response()
}

// =============================================================================
// Logout
// =============================================================================

/// Logout and clear session.
pub async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "failed to flush session on logout");
    }
    clear_sentry_user();

    Redirect::to("/login")
}

/// Rotate the session id and store the signed-in user.
async fn start_session(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));
    Ok(())
}
