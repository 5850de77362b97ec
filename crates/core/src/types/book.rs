//! Book create/update payload validation.
//!
//! A [`BookDraft`] is what a form or JSON body hands us; [`BookDraft::validate`]
//! turns it into a [`BookInput`] the repository can write without further checks.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::{Price, PriceError};

/// Maximum length of a title or author name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a description.
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Validation failures, one per field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BookInputError {
    #[error("title is required")]
    MissingTitle,
    #[error("title must be at most {MAX_NAME_LENGTH} characters")]
    TitleTooLong,
    #[error("author is required")]
    MissingAuthor,
    #[error("author must be at most {MAX_NAME_LENGTH} characters")]
    AuthorTooLong,
    #[error("publish year must be between 0 and {max}")]
    PublishYearOutOfRange {
        /// Latest accepted year.
        max: i32,
    },
    #[error("description must be at most {MAX_DESCRIPTION_LENGTH} characters")]
    DescriptionTooLong,
    #[error("invalid price: {0}")]
    Price(#[from] PriceError),
    #[error("media URL must be an absolute http(s) URL")]
    InvalidMediaUrl,
}

/// Unvalidated book fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub publish_year: i32,
    pub description: Option<String>,
    /// Price in major units (rand), e.g. `149.99`.
    pub price: Decimal,
    pub media_url: Option<String>,
}

/// Validated book fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub publish_year: i32,
    pub description: Option<String>,
    pub price: Price,
    pub media_url: Option<String>,
}

impl BookDraft {
    /// Validate against the current calendar year.
    ///
    /// # Errors
    ///
    /// Returns the first [`BookInputError`] encountered, checking fields in
    /// declaration order.
    pub fn validate(self) -> Result<BookInput, BookInputError> {
        self.validate_for_year(chrono::Utc::now().year())
    }

    /// Validate with an explicit "current year"; a book may be listed up to
    /// one year ahead of publication.
    ///
    /// # Errors
    ///
    /// See [`BookDraft::validate`].
    pub fn validate_for_year(self, current_year: i32) -> Result<BookInput, BookInputError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(BookInputError::MissingTitle);
        }
        if title.chars().count() > MAX_NAME_LENGTH {
            return Err(BookInputError::TitleTooLong);
        }

        let author = self.author.trim();
        if author.is_empty() {
            return Err(BookInputError::MissingAuthor);
        }
        if author.chars().count() > MAX_NAME_LENGTH {
            return Err(BookInputError::AuthorTooLong);
        }

        let max_year = current_year.saturating_add(1);
        if !(0..=max_year).contains(&self.publish_year) {
            return Err(BookInputError::PublishYearOutOfRange { max: max_year });
        }

        let description = non_empty(self.description);
        if description
            .as_deref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
        {
            return Err(BookInputError::DescriptionTooLong);
        }

        let price = Price::from_major(self.price)?;

        let media_url = non_empty(self.media_url);
        if let Some(raw) = media_url.as_deref() {
            let parsed = url::Url::parse(raw).map_err(|_| BookInputError::InvalidMediaUrl)?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(BookInputError::InvalidMediaUrl);
            }
        }

        Ok(BookInput {
            title: title.to_owned(),
            author: author.to_owned(),
            publish_year: self.publish_year,
            description,
            price,
            media_url,
        })
    }
}

/// Trim an optional string, mapping blank to `None`.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn draft() -> BookDraft {
        BookDraft {
            title: "  The Secret History ".to_string(),
            author: "Donna Tartt".to_string(),
            publish_year: 1992,
            description: Some("   ".to_string()),
            price: Decimal::from_str("249.995").unwrap(),
            media_url: Some("https://covers.example.com/secret.jpg".to_string()),
        }
    }

    #[test]
    fn test_valid_draft_is_normalized() {
        let input = draft().validate_for_year(2026).unwrap();
        assert_eq!(input.title, "The Secret History");
        assert_eq!(input.description, None);
        assert_eq!(input.price.cents(), 25000);
        assert_eq!(
            input.media_url.as_deref(),
            Some("https://covers.example.com/secret.jpg")
        );
    }

    #[test]
    fn test_required_fields() {
        let mut d = draft();
        d.title = " ".to_string();
        assert_eq!(d.validate_for_year(2026), Err(BookInputError::MissingTitle));

        let mut d = draft();
        d.author = String::new();
        assert_eq!(d.validate_for_year(2026), Err(BookInputError::MissingAuthor));
    }

    #[test]
    fn test_publish_year_window() {
        let mut d = draft();
        d.publish_year = 2027;
        assert!(d.validate_for_year(2026).is_ok());

        let mut d = draft();
        d.publish_year = 2028;
        assert_eq!(
            d.validate_for_year(2026),
            Err(BookInputError::PublishYearOutOfRange { max: 2027 })
        );

        let mut d = draft();
        d.publish_year = -1;
        assert!(d.validate_for_year(2026).is_err());
    }

    #[test]
    fn test_negative_price() {
        let mut d = draft();
        d.price = Decimal::from_str("-5").unwrap();
        assert_eq!(
            d.validate_for_year(2026),
            Err(BookInputError::Price(PriceError::Negative))
        );
    }

    #[test]
    fn test_media_url_must_be_http() {
        let mut d = draft();
        d.media_url = Some("javascript:alert(1)".to_string());
        assert_eq!(d.validate_for_year(2026), Err(BookInputError::InvalidMediaUrl));

        let mut d = draft();
        d.media_url = Some("/relative/cover.png".to_string());
        assert_eq!(d.validate_for_year(2026), Err(BookInputError::InvalidMediaUrl));

        let mut d = draft();
        d.media_url = Some(String::new());
        assert_eq!(d.validate_for_year(2026).unwrap().media_url, None);
    }

    #[test]
    fn test_long_description() {
        let mut d = draft();
        d.description = Some("x".repeat(MAX_DESCRIPTION_LENGTH + 1));
        assert_eq!(
            d.validate_for_year(2026),
            Err(BookInputError::DescriptionTooLong)
        );
    }
}
