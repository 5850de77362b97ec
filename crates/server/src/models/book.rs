//! Book domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use breakfast_club_core::{BookId, Price, UserId};

/// A book listing (domain type).
///
/// Serializes with camelCase keys for the JSON API; `price` is in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    #[serde(skip)]
    pub owner: UserId,
    pub title: String,
    pub author: String,
    pub publish_year: i32,
    pub description: Option<String>,
    pub price: Price,
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Description text for templates, empty when absent.
    #[must_use]
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// One page of an owner's books plus the total match count.
#[derive(Debug, Clone, Default)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub total: i64,
}
