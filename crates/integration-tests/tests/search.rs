//! Search page over the listing index.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;

use rust_decimal::Decimal;

use bazaar_integration_tests::{TestApp, product, sample_products};

fn position(body: &str, needle: &str) -> usize {
    body.find(needle).unwrap()
}

#[tokio::test]
async fn test_search_before_index_is_built() {
    let mut app = TestApp::new();

    let response = app.get("/search?q=lamp").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Search is warming up"));
}

#[tokio::test]
async fn test_search_matches_names_and_stems() {
    let mut app = TestApp::new();
    app.build_search_index().await;

    let response = app.get("/search?q=lamps").await;

    assert!(response.body.contains("Brass Desk Lamp"));
    assert!(response.body.contains("Floor Lamp"));
    assert!(!response.body.contains("Oak Chair"));
}

#[tokio::test]
async fn test_search_availability_filter() {
    let mut app = TestApp::new();
    app.build_search_index().await;

    let all = app.get("/search?q=bike").await;
    assert!(all.body.contains("Road Bike"));

    let in_stock = app.get("/search?q=bike&available=in-stock").await;
    assert!(!in_stock.body.contains("Road Bike"));
    assert!(in_stock.body.contains("No listings match"));
}

#[tokio::test]
async fn test_search_price_range_and_sort() {
    let mut app = TestApp::new();
    app.build_search_index().await;

    let response = app
        .get("/search?q=&sort_by=price-descending&min_price=5&max_price=50")
        .await;

    assert!(!response.body.contains("Road Bike"));
    assert!(position(&response.body, "Floor Lamp") < position(&response.body, "Brass Desk Lamp"));
    assert!(position(&response.body, "Brass Desk Lamp") < position(&response.body, "Oak Chair"));
}

#[tokio::test]
async fn test_search_with_huge_price_bounds() {
    let mut app = TestApp::new();
    app.build_search_index().await;

    let above_all = app.get("/search?q=&min_price=79228162514264337593543950335").await;
    assert_eq!(above_all.status, StatusCode::OK);
    assert!(above_all.body.contains("No listings match"));

    let below_all = app.get("/search?q=&max_price=79228162514264337593543950335").await;
    assert_eq!(below_all.status, StatusCode::OK);
    assert!(below_all.body.contains("Floor Lamp"));
    assert!(below_all.body.contains("Road Bike"));
}

#[tokio::test]
async fn test_index_builds_with_huge_seed_price() {
    let mut products = sample_products();
    products.push(product(5, "Gold Bar", "Luxury", Decimal::MAX, true));
    let mut app = TestApp::with_products(products);
    app.build_search_index().await;

    let response = app.get("/search?q=gold").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Gold Bar"));
}

#[tokio::test]
async fn test_search_category_filter() {
    let mut app = TestApp::new();
    app.build_search_index().await;

    let response = app.get("/search?category=Furniture").await;

    assert!(response.body.contains("Oak Chair"));
    assert!(!response.body.contains("Floor Lamp"));
}

#[tokio::test]
async fn test_new_listing_becomes_searchable() {
    let mut app = TestApp::new();
    app.build_search_index().await;
    app.register("seller@example.com", "correct-horse").await;

    app.post_multipart(
        "/sell",
        &[
            ("name", "Typewriter"),
            ("description", "Portable, with case."),
            ("category", "Office"),
            ("condition", "good"),
            ("price", "80"),
            ("quantity", "1"),
        ],
        None,
    )
    .await;

    let mut found = false;
    for _ in 0..200 {
        if app.get("/search?q=typewriter").await.body.contains("Typewriter</h3>") {
            found = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(found, "new listing never showed up in search");
}
