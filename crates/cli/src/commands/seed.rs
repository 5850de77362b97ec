//! Seed books from a YAML file.
//!
//! ```yaml
//! books:
//!   - title: Things Fall Apart
//!     author: Chinua Achebe
//!     publish_year: 1958
//!     price: "149.50"
//!     description: A classic of African literature.
//!     media_url: https://covers.example.com/things-fall-apart.jpg
//! ```
//!
//! Every entry is validated before anything is inserted.

use serde::Deserialize;
use tracing::{error, info};

use breakfast_club_core::{BookDraft, BookInput, Username};
use breakfast_club_server::db::{BookRepository, UserRepository};

use super::{CliError, connect};

/// Top-level shape of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub books: Vec<BookDraft>,
}

/// Parse and validate a seed file.
///
/// # Errors
///
/// Returns `CliError::Yaml` for malformed YAML and `CliError::InvalidSeed`
/// (after logging each problem) if any entry fails validation.
pub fn parse_books(content: &str) -> Result<Vec<BookInput>, CliError> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    let mut valid = Vec::with_capacity(file.books.len());
    let mut invalid = 0;
    for (index, draft) in file.books.into_iter().enumerate() {
        let title = draft.title.clone();
        match draft.validate() {
            Ok(input) => valid.push(input),
            Err(e) => {
                error!("  - entry {} ({title:?}): {e}", index + 1);
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        return Err(CliError::InvalidSeed(invalid));
    }
    Ok(valid)
}

/// Insert books from `file_path`, owned by `owner`.
///
/// # Errors
///
/// Returns `CliError` if the file cannot be read or parsed, the owner does
/// not exist, or an insert fails.
pub async fn books(file_path: &str, owner: &str) -> Result<(), CliError> {
    info!(path = %file_path, "Loading books from file");

    let content = tokio::fs::read_to_string(file_path)
        .await
        .map_err(|source| CliError::ReadFile {
            path: file_path.to_owned(),
            source,
        })?;

    // Validate before connecting so a bad file never half-seeds.
    let books = parse_books(&content)?;
    info!(books = books.len(), "Seed file validated");

    let username = Username::parse(owner)?;
    let pool = connect().await?;

    let owner_user = UserRepository::new(&pool)
        .get_by_username(&username)
        .await?
        .ok_or_else(|| CliError::UserNotFound(owner.to_owned()))?;

    let repo = BookRepository::new(&pool);
    for input in &books {
        let book = repo.create(owner_user.id, input).await?;
        info!(book_id = %book.id, title = %book.title, "Inserted book");
    }

    info!("Seeding complete! {} books added for {}", books.len(), owner_user.username);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_parse_books() {
        let yaml = r#"
books:
  - title: Things Fall Apart
    author: Chinua Achebe
    publish_year: 1958
    price: "149.50"
  - title: Disgrace
    author: J. M. Coetzee
    publish_year: 1999
    price: "210"
    description: ""
    media_url: https://covers.example.com/disgrace.jpg
"#;

        let books = parse_books(yaml).unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].price.cents(), 14950);
        assert_eq!(books[1].description, None);
        assert_eq!(
            books[1].media_url.as_deref(),
            Some("https://covers.example.com/disgrace.jpg")
        );
        assert_eq!(books[1].price.as_major(), Decimal::new(21000, 2));
    }

    #[test]
    fn test_invalid_entries_are_counted() {
        let yaml = r#"
books:
  - title: ""
    author: Nobody
    publish_year: 2001
    price: "10"
  - title: Negative
    author: Someone
    publish_year: 2001
    price: "-1"
"#;

        assert!(matches!(parse_books(yaml), Err(CliError::InvalidSeed(2))));
    }

    #[test]
    fn test_missing_books_key_is_yaml_error() {
        assert!(matches!(
            parse_books("titles: []"),
            Err(CliError::Yaml(_))
        ));
    }
}
