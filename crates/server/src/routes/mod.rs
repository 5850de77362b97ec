//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /login                 - Login page
//! POST /login                 - Login action
//! GET  /signup                - Sign-up page
//! POST /signup                - Sign-up action
//! POST /logout                - Logout action
//!
//! # Storefront (requires session)
//! GET  /                      - Owner's books grid + trending sidebar (?search=&page=)
//! GET  /customer/view/{id}    - Book detail
//! GET  /search                - Search results page (?q=)
//!
//! # JSON API (requires session)
//! GET  /api/search            - Title/author search (?q=)
//! POST /api/books             - Create a book
//!
//! # Admin
//! GET  /admin                             - Dashboard (admin only)
//! GET  /admin/api/stats                   - User statistics (admin only)
//! POST /admin/api/stats/refresh           - Refresh the statistics store (admin only)
//! GET  /admin/api/stats/new-customers     - Newly upgraded customers (admin only, ?days=)
//! GET  /admin/book/Table                  - Book table (?search=&page=)
//! GET  /admin/book/Table/create           - New book form
//! POST /admin/book/Table/create           - Create book
//! GET  /admin/book/Table/view/{id}        - Book detail
//! GET  /admin/book/Table/edit/{id}        - Edit form
//! POST /admin/book/Table/edit/{id}        - Update book
//! POST /admin/book/Table/delete/{id}      - Delete book
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod home;
pub mod pagination;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::models::CurrentUser;
use crate::state::AppState;

/// Signed-in user as shown in the navbar.
#[derive(Debug, Clone)]
pub struct UserView {
    pub username: String,
    pub role: String,
    pub is_admin: bool,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            username: user.username.to_string(),
            role: user.role.label().to_string(),
            is_admin: user.is_admin(),
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create the storefront page routes router.
pub fn storefront_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/customer/view/{id}", get(home::view_book))
        .route("/search", get(search::results))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/search",
            get(api::search).fallback(api::method_not_allowed),
        )
        .route("/api/books", post(api::create_book))
}

/// All application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(storefront_routes())
        .merge(api_routes())
        .merge(admin::routes())
}
