//! Listing new items through the sell page.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use bazaar_core::ItemId;
use bazaar_integration_tests::TestApp;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

fn listing_fields(price: &str) -> Vec<(&'static str, &str)> {
    vec![
        ("name", "Desk Fan"),
        ("description", "Three speeds, quiet."),
        ("category", "Home"),
        ("condition", "like-new"),
        ("price", price),
        ("quantity", "2"),
    ]
}

async fn signed_in_app() -> TestApp {
    let mut app = TestApp::new();
    app.register("seller@example.com", "correct-horse").await;
    app
}

#[tokio::test]
async fn test_create_listing_redirects_to_product() {
    let mut app = signed_in_app().await;

    let response = app
        .post_multipart(
            "/sell",
            &listing_fields("19.99"),
            Some(("image", "fan.png", "image/png", PNG_BYTES)),
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/product/5"));

    let page = app.get("/product/5").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Desk Fan"));
    assert!(page.body.contains("$19.99"));
    assert!(page.body.contains("like new"));
    assert!(page.body.contains("data:image/jpeg;base64,"));

    let stored = app.state().catalog().get(ItemId::new(5)).unwrap();
    assert!(stored.image_data.is_some());
    assert_eq!(stored.image_name, None);
}

#[tokio::test]
async fn test_listing_without_photo_uses_placeholder() {
    let mut app = signed_in_app().await;

    let response = app.post_multipart("/sell", &listing_fields("5"), None).await;
    assert_eq!(response.location(), Some("/product/5"));

    let page = app.get("/product/5").await;
    assert!(page.body.contains("/images/products/placeholder.svg"));
}

#[tokio::test]
async fn test_new_listing_appears_on_profile() {
    let mut app = signed_in_app().await;
    app.post_multipart("/sell", &listing_fields("19.99"), None).await;

    let profile = app.get("/profile").await;

    assert!(profile.body.contains("Desk Fan"));
    assert!(!profile.body.contains("You haven't listed anything yet."));
}

#[tokio::test]
async fn test_invalid_price_rerenders_form() {
    let mut app = signed_in_app().await;

    let response = app.post_multipart("/sell", &listing_fields("cheap"), None).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Please enter a price like 19.99."));
    assert!(response.body.contains("value=\"Desk Fan\""));
    assert_eq!(app.state().catalog().len(), 4);
}

#[tokio::test]
async fn test_price_above_limit_rerenders_form() {
    let mut app = signed_in_app().await;

    let response = app
        .post_multipart("/sell", &listing_fields("79228162514264337593543950335"), None)
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Price cannot exceed $1,000,000.00."));
    assert_eq!(app.state().catalog().len(), 4);
}

#[tokio::test]
async fn test_negative_zero_price_lists_as_free() {
    let mut app = signed_in_app().await;

    let response = app.post_multipart("/sell", &listing_fields("-0"), None).await;
    assert_eq!(response.location(), Some("/product/5"));

    let page = app.get("/product/5").await;
    assert!(page.body.contains("$0.00"));
    assert!(!page.body.contains("-$0.00"));
}

#[tokio::test]
async fn test_missing_name_rerenders_form() {
    let mut app = signed_in_app().await;
    let mut fields = listing_fields("10");
    fields[0] = ("name", "   ");

    let response = app.post_multipart("/sell", &fields, None).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Name is required."));
}

#[tokio::test]
async fn test_non_image_upload_is_rejected() {
    let mut app = signed_in_app().await;

    let response = app
        .post_multipart(
            "/sell",
            &listing_fields("10"),
            Some(("image", "notes.txt", "text/plain", b"hello")),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("The photo must be an image file."));
}

#[tokio::test]
async fn test_anonymous_post_is_gated() {
    let mut app = TestApp::new();

    let response = app.post_multipart("/sell", &listing_fields("10"), None).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));
    assert_eq!(app.state().catalog().len(), 4);
}
