//! Integration tests for The Breakfast Club.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and start the server
//! cargo run -p bc-cli -- migrate
//! cargo run -p breakfast-club-server
//!
//! # Run integration tests
//! cargo test -p breakfast-club-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `BOOKSTORE_TEST_URL` - Server under test (default `http://localhost:3000`)
//! - `BOOKSTORE_DATABASE_URL` - Same database the server uses; needed by tests
//!   that promote a user to admin
//!
//! Every test signs up its own throwaway user, so tests can run in parallel
//! against a shared database.

#![allow(clippy::missing_panics_doc, clippy::expect_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode, redirect::Policy};
use uuid::Uuid;

/// Password used for every throwaway account.
pub const TEST_PASSWORD: &str = "breakfast-club-test";

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    dotenvy::dotenv().ok();
    std::env::var("BOOKSTORE_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Client with a cookie jar that does not follow redirects, so tests can
/// assert on `303 See Other` responses.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A signed-in throwaway user.
pub struct TestUser {
    pub client: Client,
    pub username: String,
}

impl TestUser {
    /// Sign up a fresh user; the returned client carries its session.
    pub async fn signup() -> Self {
        let username = unique_username();
        let email = format!("{username}@example.com");
        let client = client();

        let resp = client
            .post(format!("{}/signup", base_url()))
            .form(&[
                ("username", username.as_str()),
                ("email", email.as_str()),
                ("password", TEST_PASSWORD),
                ("password_confirm", TEST_PASSWORD),
            ])
            .send()
            .await
            .expect("Failed to sign up");

        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "signup should redirect");
        Self { client, username }
    }

    /// Sign up a fresh user and give it the admin role.
    pub async fn admin() -> Self {
        let user = Self::signup().await;
        set_role(&user.username, "admin").await;
        user
    }

    /// GET a path on the server under test.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", base_url()))
            .send()
            .await
            .expect("GET request failed")
    }
}

/// `it_` plus random hex, within the 32-character username limit.
#[must_use]
pub fn unique_username() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("it_{}", &id[..12])
}

/// Change a user's role directly in the database.
pub async fn set_role(username: &str, role: &str) {
    dotenvy::dotenv().ok();
    let url = std::env::var("BOOKSTORE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("BOOKSTORE_DATABASE_URL must be set to change roles");

    let pool = sqlx::PgPool::connect(&url)
        .await
        .expect("Failed to connect to database");

    let updated = sqlx::query(
        "UPDATE users SET role = $2::user_role, updated_at = now() WHERE lower(username) = lower($1)",
    )
    .bind(username)
    .bind(role)
    .execute(&pool)
    .await
    .expect("Failed to update role");

    assert_eq!(updated.rows_affected(), 1, "user {username} not found");
}
