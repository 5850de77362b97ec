//! Book table route handlers.
//!
//! Every handler is scoped to the signed-in user's own books. Books owned by
//! someone else behave exactly like books that do not exist.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use breakfast_club_core::{BookDraft, BookId};

use crate::db::BookRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Book, CurrentUser};
use crate::routes::UserView;
use crate::routes::home::{ListQuery, find_owned_book};
use crate::routes::pagination::{Pagination, parse_page};
use crate::state::AppState;

const TABLE_PATH: &str = "/admin/book/Table";

// =============================================================================
// Form Types
// =============================================================================

/// Book form as submitted. Numbers stay strings so bad input can be shown
/// back to the user.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publish_year: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub media_url: String,
}

impl BookForm {
    /// Prefill the form from an existing book.
    #[must_use]
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            publish_year: book.publish_year.to_string(),
            description: book.description.clone().unwrap_or_default(),
            price: book.price.as_major().to_string(),
            media_url: book.media_url.clone().unwrap_or_default(),
        }
    }

    /// Parse the numeric fields. Content rules are applied by
    /// [`BookDraft::validate`].
    ///
    /// # Errors
    ///
    /// Returns a user-facing message if a number does not parse.
    pub fn to_draft(&self) -> std::result::Result<BookDraft, String> {
        let publish_year = self
            .publish_year
            .trim()
            .parse::<i32>()
            .map_err(|_| "Publish year must be a whole number".to_string())?;
        let price = Decimal::from_str(self.price.trim())
            .map_err(|_| "Price must be a number".to_string())?;

        Ok(BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            publish_year,
            description: Some(self.description.clone()),
            price,
            media_url: Some(self.media_url.clone()),
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Book table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/books_table.html")]
pub struct BooksTableTemplate {
    pub user: UserView,
    pub books: Vec<Book>,
    pub search: String,
    pub pagination: Pagination,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/book_form.html")]
pub struct BookFormTemplate {
    pub user: UserView,
    pub heading: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub form: BookForm,
    pub error: Option<String>,
}

/// Book view template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/book_view.html")]
pub struct BookViewTemplate {
    pub user: UserView,
    pub book: Option<Book>,
}

// =============================================================================
// Table
// =============================================================================

/// Display a page of the user's books.
///
/// GET /admin/book/Table?search=&page=
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn table(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<BooksTableTemplate> {
    let page = parse_page(query.page.as_deref());
    let search = query.search.unwrap_or_default();

    let listing = BookRepository::new(state.pool())
        .list_owned_page(user.id, Some(search.as_str()), page)
        .await?;

    Ok(BooksTableTemplate {
        user: UserView::from(&user),
        pagination: Pagination::new(TABLE_PATH, Some(search.as_str()), page, listing.total),
        books: listing.books,
        search,
    })
}

// =============================================================================
// Create
// =============================================================================

/// Display an empty book form.
///
/// GET /admin/book/Table/create
pub async fn create_form(RequireAuth(user): RequireAuth) -> BookFormTemplate {
    create_template(&user, BookForm::default(), None)
}

/// Create a book from the submitted form.
///
/// POST /admin/book/Table/create
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<BookForm>,
) -> Result<Response> {
    let input = match form.to_draft().and_then(|d| d.validate().map_err(|e| e.to_string())) {
        Ok(input) => input,
        Err(message) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                create_template(&user, form, Some(message)),
            )
                .into_response());
        }
    };

    let book = BookRepository::new(state.pool())
        .create(user.id, &input)
        .await?;

    tracing::info!(book_id = %book.id, "book created");
    Ok(Redirect::to(TABLE_PATH).into_response())
}

fn create_template(
    user: &CurrentUser,
    form: BookForm,
    error: Option<String>,
) -> BookFormTemplate {
    BookFormTemplate {
        user: UserView::from(user),
        heading: "Add Book",
        action: format!("{TABLE_PATH}/create"),
        submit_label: "Create Book",
        form,
        error,
    }
}

// =============================================================================
// View
// =============================================================================

/// Display one of the user's books.
///
/// GET /admin/book/Table/view/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn view(
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
        BookViewTemplate {
            user: UserView::from(&user),
            book,
        },
    )
        .into_response())
}

// =============================================================================
// Edit
// =============================================================================

/// Display the edit form for one of the user's books.
///
/// GET /admin/book/Table/edit/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<BookFormTemplate> {
    let book = find_owned_book(&state, user.id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    Ok(edit_template(
        &user,
        book.id,
        BookForm::from_book(&book),
        None,
    ))
}

/// Update one of the user's books.
///
/// POST /admin/book/Table/edit/{id}
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Form(form): Form<BookForm>,
) -> Result<Response> {
    let id = parse_book_id(&id)?;

    let input = match form.to_draft().and_then(|d| d.validate().map_err(|e| e.to_string())) {
        Ok(input) => input,
        Err(message) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                edit_template(&user, id, form, Some(message)),
            )
                .into_response());
        }
    };

    BookRepository::new(state.pool())
        .update_owned(user.id, id, &input)
        .await?;

    tracing::info!(book_id = %id, "book updated");
    Ok(Redirect::to(TABLE_PATH).into_response())
}

fn edit_template(
    user: &CurrentUser,
    id: BookId,
    form: BookForm,
    error: Option<String>,
) -> BookFormTemplate {
    BookFormTemplate {
        user: UserView::from(user),
        heading: "Edit Book",
        action: format!("{TABLE_PATH}/edit/{id}"),
        submit_label: "Save Changes",
        form,
        error,
    }
}

// =============================================================================
// Delete
// =============================================================================

/// Delete one of the user's books.
///
/// POST /admin/book/Table/delete/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = parse_book_id(&id)?;

    BookRepository::new(state.pool())
        .delete_owned(user.id, id)
        .await?;

    tracing::info!(book_id = %id, "book deleted");
    Ok(Redirect::to(TABLE_PATH))
}

fn parse_book_id(raw: &str) -> Result<BookId> {
    raw.parse::<BookId>()
        .map_err(|_| AppError::NotFound("Not found".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled_form() -> BookForm {
        BookForm {
            title: "Things Fall Apart".to_string(),
            author: "Chinua Achebe".to_string(),
            publish_year: "1958".to_string(),
            description: String::new(),
            price: "149.50".to_string(),
            media_url: String::new(),
        }
    }

    #[test]
    fn test_form_to_draft() {
        let draft = filled_form().to_draft().unwrap();
        assert_eq!(draft.publish_year, 1958);
        assert_eq!(draft.price, Decimal::new(14950, 2));

        let input = draft.validate_for_year(2024).unwrap();
        assert_eq!(input.description, None);
        assert_eq!(input.media_url, None);
        assert_eq!(input.price.cents(), 14950);
    }

    #[test]
    fn test_form_rejects_bad_numbers() {
        let form = BookForm {
            publish_year: "nineteen".to_string(),
            ..filled_form()
        };
        assert_eq!(
            form.to_draft().unwrap_err(),
            "Publish year must be a whole number"
        );

        let form = BookForm {
            price: "cheap".to_string(),
            ..filled_form()
        };
        assert_eq!(form.to_draft().unwrap_err(), "Price must be a number");
    }

    #[test]
    fn test_parse_book_id_maps_to_not_found() {
        let err = parse_book_id("abc").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(parse_book_id("12").unwrap(), BookId::new(12));
    }
}
