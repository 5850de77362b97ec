//! Admin routes: the statistics dashboard and the book table.
//!
//! The dashboard and statistics API need admin privileges. The book table is
//! open to any signed-in user and only ever shows their own books.

pub mod books;
pub mod dashboard;
pub mod stats;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard::dashboard))
        .route("/admin/api/stats", get(stats::user_statistics))
        .route("/admin/api/stats/refresh", post(stats::refresh))
        .route("/admin/api/stats/new-customers", get(stats::new_customers))
        .route("/admin/book/Table", get(books::table))
        .route(
            "/admin/book/Table/create",
            get(books::create_form).post(books::create),
        )
        .route("/admin/book/Table/view/{id}", get(books::view))
        .route(
            "/admin/book/Table/edit/{id}",
            get(books::edit_form).post(books::update),
        )
        .route("/admin/book/Table/delete/{id}", post(books::delete))
}
