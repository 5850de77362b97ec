//! Integration tests for the admin dashboard and statistics API.
//!
//! Requires a running server and `BOOKSTORE_DATABASE_URL` pointing at the same
//! database, so tests can promote their users to admin.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use breakfast_club_integration_tests::{TestUser, base_url, set_role};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_non_admin_is_refused() {
    let user = TestUser::signup().await;

    let resp = user.get("/admin").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = user.get("/admin/api/stats").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Unauthorized. Only admins can fetch user statistics."
    );

    let resp = user.get("/admin/api/stats/new-customers").await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Unauthorized. Only admins can fetch customer details."
    );
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_admin_sees_statistics() {
    let admin = TestUser::admin().await;

    let resp = admin.get("/admin/api/stats").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    for key in [
        "totalCustomers",
        "pendingRegistrations",
        "activeUserSessions",
        "newlyUpgradedCustomers",
    ] {
        assert!(body["data"][key].is_i64(), "{key}");
    }
    // This admin's own session is live.
    assert!(body["data"]["activeUserSessions"].as_i64().unwrap() >= 1);

    let resp = admin.get("/admin").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = resp.text().await.unwrap();
    assert!(page.contains("Admin Dashboard"));
    assert!(page.contains("Total Customers"));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_role_change_applies_to_existing_session() {
    let user = TestUser::signup().await;
    assert_eq!(user.get("/admin").await.status(), StatusCode::FORBIDDEN);

    set_role(&user.username, "admin").await;
    assert_eq!(user.get("/admin").await.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_upgraded_customer_is_listed() {
    let admin = TestUser::admin().await;
    let customer = TestUser::signup().await;
    set_role(&customer.username, "customer").await;

    let resp = admin.get("/admin/api/stats/new-customers?days=1").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let listed = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["username"] == customer.username.as_str());
    assert!(listed);

    let resp = admin.get("/admin/api/stats/new-customers?days=0").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_refresh_returns_snapshot() {
    let admin = TestUser::admin().await;

    let resp = admin
        .client
        .post(format!("{}/admin/api/stats/refresh", base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["isLoading"], false);
    assert!(body["data"]["stats"]["totalCustomers"].is_i64());
}
