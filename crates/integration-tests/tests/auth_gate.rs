//! Auth gate on protected pages, sign-in, and sign-out.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use bazaar_integration_tests::TestApp;

const PASSWORD: &str = "correct-horse";

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let mut app = TestApp::new();

    for path in ["/sell", "/profile"] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location(), Some("/login"));
    }
}

#[tokio::test]
async fn test_sell_renders_after_registration() {
    let mut app = TestApp::new();

    let response = app.register("seller@example.com", PASSWORD).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/profile"));

    let response = app.get("/sell").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Sell an item"));
}

#[tokio::test]
async fn test_login_returns_to_requested_page() {
    let mut app = TestApp::new();
    app.register("seller@example.com", PASSWORD).await;
    app.post_form("/logout", &[]).await;

    let response = app.get("/sell").await;
    assert_eq!(response.location(), Some("/login"));

    let response = app.login("seller@example.com", PASSWORD).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/sell"));
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let mut app = TestApp::new();
    app.register("seller@example.com", PASSWORD).await;
    app.post_form("/logout", &[]).await;

    let response = app.login("seller@example.com", "wrong-password").await;

    assert_eq!(response.location(), Some("/login?error=credentials"));
    assert_eq!(app.get("/profile").await.location(), Some("/login"));
}

#[tokio::test]
async fn test_login_page_shows_fixed_error_message() {
    let mut app = TestApp::new();

    let response = app.get("/login?error=credentials").await;

    assert!(response.body.contains("Invalid email or password."));
}

#[tokio::test]
async fn test_register_rejects_short_password_and_duplicates() {
    let mut app = TestApp::new();

    let response = app.register("short@example.com", "abc").await;
    assert_eq!(response.location(), Some("/register?error=weak_password"));

    app.register("taken@example.com", PASSWORD).await;
    app.forget_session();
    let response = app.register("taken@example.com", PASSWORD).await;
    assert_eq!(response.location(), Some("/register?error=exists"));
}

#[tokio::test]
async fn test_register_rejects_mismatched_confirmation() {
    let mut app = TestApp::new();

    let response = app
        .post_form(
            "/register",
            &[
                ("email", "new@example.com"),
                ("password", PASSWORD),
                ("password_confirm", "something-else"),
            ],
        )
        .await;

    assert_eq!(response.location(), Some("/register?error=mismatch"));
}

#[tokio::test]
async fn test_profile_shows_account() {
    let mut app = TestApp::new();
    app.register("profile@example.com", PASSWORD).await;

    let response = app.get("/profile").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("profile@example.com"));
    assert!(response.body.contains("Member since"));
}

#[tokio::test]
async fn test_logout_ends_session_and_clears_stores() {
    let mut app = TestApp::new();
    app.register("shopper@example.com", PASSWORD).await;
    app.post_form("/cart/add", &[("item_id", "1")]).await;
    assert_eq!(app.get_htmx("/cart/count").await.body.trim(), "1");

    let response = app.post_form("/logout", &[]).await;
    assert_eq!(response.location(), Some("/"));

    assert_eq!(app.get("/profile").await.location(), Some("/login"));
    assert_eq!(app.get_htmx("/cart/count").await.body.trim(), "0");
}
