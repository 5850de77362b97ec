//! Integration tests for book management and search.
//!
//! Requires a running server and a migrated database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use breakfast_club_integration_tests::{TestUser, base_url};
use reqwest::{StatusCode, header};
use serde_json::{Value, json};

async fn create_book(user: &TestUser, title: &str) -> Value {
    let resp = user
        .client
        .post(format!("{}/api/books", base_url()))
        .json(&json!({
            "title": title,
            "author": "Zakes Mda",
            "description": "A novel set in the Eastern Cape.",
            "publishYear": 2000,
            "price": 185.5,
            "mediaUrl": "https://covers.example.com/heart-of-redness.jpg"
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_create_book_stores_price_in_cents() {
    let user = TestUser::signup().await;
    let book = create_book(&user, "The Heart of Redness").await;

    assert_eq!(book["title"], "The Heart of Redness");
    assert_eq!(book["price"], 18550);
    assert_eq!(book["publishYear"], 2000);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_create_book_validation() {
    let user = TestUser::signup().await;

    let resp = user
        .client
        .post(format!("{}/api/books", base_url()))
        .json(&json!({
            "title": "   ",
            "author": "Someone",
            "publishYear": 2000,
            "price": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = user
        .client
        .post(format!("{}/api/books", base_url()))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_search_api() {
    let user = TestUser::signup().await;
    create_book(&user, "Ways of Dying").await;

    let resp = user.get("/api/search?q=ways%20of").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let books: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Ways of Dying");

    let resp = user.get("/api/search?q=").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid query");

    let resp = user
        .client
        .delete(format!("{}/api/search?q=ways", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_books_are_owner_scoped() {
    let owner = TestUser::signup().await;
    let other = TestUser::signup().await;
    let book = create_book(&owner, "She Plays with the Darkness").await;
    let id = book["id"].as_i64().unwrap();

    let resp = other.get(&format!("/customer/view/{id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let books: Vec<Value> = other.get("/api/search?q=Darkness").await.json().await.unwrap();
    assert!(books.is_empty());

    let resp = other
        .client
        .post(format!("{}/admin/book/Table/delete/{id}", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = owner.get(&format!("/customer/view/{id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_edit_and_delete_through_book_table() {
    let user = TestUser::signup().await;
    let book = create_book(&user, "Cion").await;
    let id = book["id"].as_i64().unwrap();

    let resp = user
        .client
        .post(format!("{}/admin/book/Table/edit/{id}", base_url()))
        .form(&[
            ("title", "Cion (Revised)"),
            ("author", "Zakes Mda"),
            ("publish_year", "2007"),
            ("price", "199.99"),
            ("description", ""),
            ("media_url", ""),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/admin/book/Table");

    let page = user.get(&format!("/admin/book/Table/view/{id}")).await;
    let body = page.text().await.unwrap();
    assert!(body.contains("Cion (Revised)"));
    assert!(body.contains("R199.99"));

    let resp = user
        .client
        .post(format!("{}/admin/book/Table/delete/{id}", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = user.get(&format!("/admin/book/Table/view/{id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_book_form_rerenders_on_bad_input() {
    let user = TestUser::signup().await;

    let resp = user
        .client
        .post(format!("{}/admin/book/Table/create", base_url()))
        .form(&[
            ("title", "Mother to Mother"),
            ("author", "Sindiwe Magona"),
            ("publish_year", "ninety"),
            ("price", "120"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Publish year must be a whole number"));
    assert!(body.contains("Mother to Mother"));
}
