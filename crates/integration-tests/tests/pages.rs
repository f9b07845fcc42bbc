//! Public pages, health, and fallback behavior.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use bazaar_integration_tests::TestApp;

#[tokio::test]
async fn test_home_lists_every_product() {
    let mut app = TestApp::new();

    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    for name in ["Brass Desk Lamp", "Oak Chair", "Road Bike", "Floor Lamp"] {
        assert!(response.body.contains(name), "missing {name}");
    }
}

#[tokio::test]
async fn test_home_filters_by_category() {
    let mut app = TestApp::new();

    let response = app.get("/?category=home").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Brass Desk Lamp"));
    assert!(response.body.contains("Floor Lamp"));
    assert!(!response.body.contains("Oak Chair"));
}

#[tokio::test]
async fn test_product_card_reflects_availability() {
    let mut app = TestApp::new();

    let response = app.get("/").await;

    assert!(response.body.contains("In Stock"));
    assert!(response.body.contains("Out of Stock"));
    assert!(response.body.contains("$250.50"));
    assert!(response.body.contains("/images/products/placeholder.svg"));
}

#[tokio::test]
async fn test_product_page_shows_details_and_related() {
    let mut app = TestApp::new();

    let response = app.get("/product/1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Brass Desk Lamp"));
    assert!(response.body.contains("$10.00"));
    assert!(response.body.contains("More in Home"));
    assert!(response.body.contains("Floor Lamp"));
}

#[tokio::test]
async fn test_unknown_or_malformed_product_is_not_found() {
    let mut app = TestApp::new();

    assert_eq!(app.get("/product/999").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/product/abc").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let mut app = TestApp::new();

    assert_eq!(app.get("/nowhere").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_pages_render_without_session() {
    let mut app = TestApp::new();

    for path in ["/search", "/login", "/register", "/cart", "/wishlist"] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let mut app = TestApp::new();

    let response = app.get("/health").await;

    let request_id = response.headers.get("x-request-id").unwrap();
    assert!(!request_id.is_empty());
}
