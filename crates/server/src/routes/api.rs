//! JSON API routes.
//!
//! Errors are `{"error": "..."}` bodies. Unauthenticated calls are rejected
//! with 401 by [`RequireAuth`] before a handler runs.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use breakfast_club_core::BookDraft;

use crate::db::BookRepository;
use crate::middleware::RequireAuth;
use crate::models::Book;
use crate::state::AppState;

/// Error response for API endpoints.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
}

impl ApiError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            error: msg.into(),
        }
    }

    fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

// ============================================================================
// Search
// ============================================================================

/// Query parameters for `/api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Search the signed-in user's books by title or author.
///
/// GET /api/search?q=
///
/// # Errors
///
/// 400 when `q` is missing, empty or not a single value, 500 when the
/// lookup fails.
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn search(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let q = search_term(query)?;

    let books = BookRepository::new(state.pool())
        .search_owned(user.id, &q)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "book search failed");
            ApiError::internal("Internal server error")
        })?;

    Ok(Json(books))
}

/// The `q` parameter as a non-empty string.
fn search_term(query: Result<Query<SearchParams>, QueryRejection>) -> Result<String, ApiError> {
    let Query(params) = query.map_err(|e| {
        tracing::debug!(error = %e, "rejected search query");
        ApiError::bad_request("Invalid query")
    })?;

    params
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Invalid query"))
}

/// Any method other than GET on `/api/search`.
pub async fn method_not_allowed() -> Response {
    let mut response = ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        .into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, header::HeaderValue::from_static("GET, HEAD"));
    response
}

// ============================================================================
// Create book
// ============================================================================

/// Request body for `POST /api/books`. `price` is in major units (rand).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    pub publish_year: i32,
    pub price: Decimal,
    #[serde(default)]
    pub media_url: Option<String>,
}

impl From<CreateBookRequest> for BookDraft {
    fn from(req: CreateBookRequest) -> Self {
        Self {
            title: req.title,
            author: req.author,
            publish_year: req.publish_year,
            description: req.description,
            price: req.price,
            media_url: req.media_url,
        }
    }
}

/// Create a book owned by the signed-in user.
///
/// POST /api/books
///
/// # Errors
///
/// 400 for a malformed or invalid body, 500 when the insert fails.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_book(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!(error = %e, "rejected book payload");
        ApiError::bad_request("Invalid book payload")
    })?;

    let input = BookDraft::from(request)
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let book = BookRepository::new(state.pool())
        .create(user.id, &input)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to create book");
            ApiError::internal("Failed to create book")
        })?;

    tracing::info!(book_id = %book.id, "book created");
    Ok(Json(book))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_uses_camel_case() {
        let req: CreateBookRequest = serde_json::from_str(
            r#"{"title":"Dune","author":"Frank Herbert","publishYear":1965,"price":"189.99","mediaUrl":"https://img.example/dune.jpg"}"#,
        )
        .unwrap();

        let draft = BookDraft::from(req);
        assert_eq!(draft.publish_year, 1965);
        assert_eq!(draft.price, Decimal::new(18999, 2));
        assert_eq!(
            draft.media_url.as_deref(),
            Some("https://img.example/dune.jpg")
        );
        assert_eq!(draft.description, None);
    }

    fn term(uri: &str) -> Result<String, ApiError> {
        let uri: axum::http::Uri = uri.parse().unwrap();
        search_term(Query::try_from_uri(&uri))
    }

    #[test]
    fn test_search_term() {
        assert_eq!(term("/api/search?q=dune").unwrap(), "dune");
        assert_eq!(term("/api/search?q=ways%20of").unwrap(), "ways of");
    }

    #[test]
    fn test_search_term_missing_or_empty() {
        assert_eq!(term("/api/search").unwrap_err().error, "Invalid query");
        assert_eq!(term("/api/search?q=").unwrap_err().error, "Invalid query");
    }

    #[test]
    fn test_repeated_q_is_invalid_query() {
        let err = term("/api/search?q=dune&q=tolkien").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"error":"Invalid query"}"#
        );
    }

    #[test]
    fn test_api_error_body() {
        let err = ApiError::bad_request("Invalid query");
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"error":"Invalid query"}"#
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
