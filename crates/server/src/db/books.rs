//! Book repository.
//!
//! Every query is scoped to the owning user; a book that exists but belongs to
//! someone else is indistinguishable from one that does not exist.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use breakfast_club_core::{BookId, BookInput, Price, UserId};

use super::{RepositoryError, contains_pattern};
use crate::models::{Book, BookPage};

/// Books shown per page on the grid and admin table.
pub const PAGE_SIZE: i64 = 12;

const BOOK_COLUMNS: &str = "id, user_id, title, author, publish_year, description, \
                            price_cents, media_url, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: i32,
    user_id: i32,
    title: String,
    author: String,
    publish_year: i32,
    description: Option<String>,
    price_cents: i32,
    media_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for Book {
    type Error = RepositoryError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let price = Price::from_cents(row.price_cents).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for book {}: {e}", row.id))
        })?;

        Ok(Self {
            id: BookId::new(row.id),
            owner: UserId::new(row.user_id),
            title: row.title,
            author: row.author,
            publish_year: row.publish_year,
            description: row.description,
            price,
            media_url: row.media_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_books(rows: Vec<BookRow>) -> Result<Vec<Book>, RepositoryError> {
    rows.into_iter().map(Book::try_from).collect()
}

/// Repository for book database operations.
pub struct BookRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepository<'a> {
    /// Create a new book repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a book owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, owner: UserId, input: &BookInput) -> Result<Book, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "INSERT INTO books \
                 (user_id, title, author, publish_year, description, price_cents, media_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(owner)
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.publish_year)
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.media_url.as_deref())
        .fetch_one(self.pool)
        .await?;

        Book::try_from(row)
    }

    /// Fetch a book if it exists and belongs to `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_owned(&self, owner: UserId, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        row.map(Book::try_from).transpose()
    }

    /// Replace every editable field of an owned book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book is missing or owned by
    /// another user.
    pub async fn update_owned(
        &self,
        owner: UserId,
        id: BookId,
        input: &BookInput,
    ) -> Result<Book, RepositoryError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "UPDATE books SET \
                 title = $3, author = $4, publish_year = $5, description = $6, \
                 price_cents = $7, media_url = $8, updated_at = now() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.publish_year)
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.media_url.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Book::try_from(row)
    }

    /// Delete an owned book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book is missing or owned by
    /// another user.
    pub async fn delete_owned(&self, owner: UserId, id: BookId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Owned books whose title or author contains `query`, ignoring case.
    /// A blank query matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_owned(&self, owner: UserId, query: &str) -> Result<Vec<Book>, RepositoryError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE user_id = $1 AND (title ILIKE $2 OR author ILIKE $2) \
             ORDER BY created_at DESC"
        ))
        .bind(owner)
        .bind(contains_pattern(query))
        .fetch_all(self.pool)
        .await?;

        into_books(rows)
    }

    /// One page of owned books, newest first, optionally filtered by a search
    /// over title, author and description. Pages start at 1.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn list_owned_page(
        &self,
        owner: UserId,
        search: Option<&str>,
        page: u32,
    ) -> Result<BookPage, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);
        let offset = i64::from(page.max(1) - 1) * PAGE_SIZE;

        let filter = "user_id = $1 AND ($2::text IS NULL \
                      OR title ILIKE $2 OR author ILIKE $2 OR description ILIKE $2)";

        let rows_query = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE {filter} \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        );
        let count_query = format!("SELECT COUNT(*) FROM books WHERE {filter}");

        let rows = sqlx::query_as::<_, BookRow>(&rows_query)
            .bind(owner)
            .bind(pattern.as_deref())
            .bind(PAGE_SIZE)
            .bind(offset)
            .fetch_all(self.pool);
        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(owner)
            .bind(pattern.as_deref())
            .fetch_one(self.pool);

        let (rows, total) = tokio::try_join!(rows, total)?;

        Ok(BookPage {
            books: into_books(rows)?,
            total,
        })
    }

    /// Most recently added books for the trending sidebar.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_owned(&self, owner: UserId, limit: i64) -> Result<Vec<Book>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(owner)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        into_books(rows)
    }
}
