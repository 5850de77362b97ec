//! Storefront home page and book detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use breakfast_club_core::{BookId, UserId};

use super::UserView;
use super::pagination::{Pagination, parse_page};
use crate::db::BookRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Book;
use crate::state::AppState;

/// Number of books in the trending sidebar.
const TRENDING_LIMIT: i64 = 5;

/// `?search=&page=` on listing pages.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: UserView,
    pub books: Vec<Book>,
    pub trending: Vec<Book>,
    pub search: String,
    pub pagination: Pagination,
}

/// Book detail template.
#[derive(Template, WebTemplate)]
#[template(path = "book_detail.html")]
pub struct BookDetailTemplate {
    pub user: UserView,
    pub book: Option<Book>,
    pub back_href: &'static str,
}

/// Display the signed-in user's books with the trending sidebar.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<HomeTemplate> {
    let page = parse_page(query.page.as_deref());
    let search = query.search.unwrap_or_default();
    let repo = BookRepository::new(state.pool());

    let (listing, trending) = tokio::try_join!(
        repo.list_owned_page(user.id, Some(search.as_str()), page),
        repo.latest_owned(user.id, TRENDING_LIMIT),
    )?;

    Ok(HomeTemplate {
        user: UserView::from(&user),
        pagination: Pagination::new("/", Some(search.as_str()), page, listing.total),
        books: listing.books,
        trending,
        search,
    })
}

/// Display one of the signed-in user's books.
///
/// Unknown ids, malformed ids and other users' books all render the
/// not-found alert.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn view_book(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let book = find_owned_book(&state, user.id, &id).await?;
    let status = if book.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    Ok((
        status,
        BookDetailTemplate {
            user: UserView::from(&user),
            book,
            back_href: "/",
        },
    )
        .into_response())
}

/// Look up an owned book by its raw path segment.
pub(crate) async fn find_owned_book(
    state: &AppState,
    owner: UserId,
    raw_id: &str,
) -> Result<Option<Book>> {
    let Ok(id) = raw_id.parse::<BookId>() else {
        return Ok(None);
    };

    Ok(BookRepository::new(state.pool())
        .get_owned(owner, id)
        .await?)
}
