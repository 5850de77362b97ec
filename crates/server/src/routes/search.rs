//! Search results page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use super::UserView;
use crate::db::BookRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Book;
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Search results template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub user: UserView,
    pub query: String,
    pub books: Vec<Book>,
}

/// Display books whose title or author matches `?q=`.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn results(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<SearchQuery>,
) -> Result<SearchTemplate> {
    let query = params.q.unwrap_or_default();
    let books = BookRepository::new(state.pool())
        .search_owned(user.id, &query)
        .await?;

    Ok(SearchTemplate {
        user: UserView::from(&user),
        query,
        books,
    })
}
