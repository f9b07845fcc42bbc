//! Integration tests for Bazaar.
//!
//! Tests drive the full storefront router in process: no server, no network.
//! A [`TestApp`] plays the part of one browser, carrying its session cookie
//! from response to request.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use rust_decimal::Decimal;
use tower::ServiceExt;

use bazaar_core::{Condition, ItemId, Product};
use bazaar_storefront::catalog::Catalog;
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::middleware::SESSION_COOKIE_NAME;
use bazaar_storefront::routes;
use bazaar_storefront::state::AppState;

/// Largest body a test will read.
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// A response with its body already read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    /// Whether any `HX-Trigger` header names `event`.
    #[must_use]
    pub fn triggers(&self, event: &str) -> bool {
        self.headers
            .get_all("hx-trigger")
            .iter()
            .any(|value| value.to_str().is_ok_and(|v| v == event))
    }
}

/// One simulated browser session against a fresh storefront.
pub struct TestApp {
    state: AppState,
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// Storefront over the sample listings from [`sample_products`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_products(sample_products())
    }

    /// Storefront over `products`.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        let catalog = Catalog::from_products(products).unwrap();
        let state = AppState::new(StorefrontConfig::default(), catalog);
        let router = routes::app(state.clone());
        Self {
            state,
            router,
            cookie: None,
        }
    }

    /// The shared application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the search index and wait until it is ready.
    pub async fn build_search_index(&self) {
        self.state.start_search_indexing();
        for _ in 0..200 {
            if self.state.search().is_ready() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("search index was not built in time");
    }

    /// Drop the session cookie, as a new browser would.
    pub fn forget_session(&mut self) {
        self.cookie = None;
    }

    /// GET `path`.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request("GET", path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// GET `path` as an HTMX request.
    pub async fn get_htmx(&mut self, path: &str) -> TestResponse {
        let request = self
            .request("GET", path)
            .header("hx-request", "true")
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// POST a urlencoded form.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encode_form(fields)))
            .unwrap();
        self.send(request).await
    }

    /// POST a urlencoded form as an HTMX request.
    pub async fn post_form_htmx(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("hx-request", "true")
            .body(Body::from(encode_form(fields)))
            .unwrap();
        self.send(request).await
    }

    /// POST a multipart form. `file` is `(field, file name, content type, bytes)`.
    pub async fn post_multipart(
        &mut self,
        path: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &str, &[u8])>,
    ) -> TestResponse {
        const BOUNDARY: &str = "bazaar-test-boundary";

        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, file_name, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = self
            .request("POST", path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Register a new account; the session is signed in afterwards.
    pub async fn register(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form(
            "/register",
            &[
                ("email", email),
                ("password", password),
                ("password_confirm", password),
            ],
        )
        .await
    }

    /// Sign in with an existing account.
    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let prefix = format!("{SESSION_COOKIE_NAME}=");
        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            if let Some(pair) = value.split(';').next()
                && pair.starts_with(&prefix)
            {
                self.cookie = (pair.len() > prefix.len()).then(|| pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES).await.unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Build one listing.
#[must_use]
pub fn product(id: i32, name: &str, category: &str, price: Decimal, available: bool) -> Product {
    Product {
        item_id: ItemId::new(id),
        name: name.to_string(),
        description: format!("A well kept {}", name.to_lowercase()),
        category: category.to_string(),
        condition: Condition::Good,
        price,
        available,
        quantity: u32::from(available),
        image_name: None,
        image_data: None,
        seller_id: None,
    }
}

/// Listings shared by the integration tests.
///
/// Item 3 is out of stock.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    vec![
        product(1, "Brass Desk Lamp", "Home", Decimal::new(10, 0), true),
        product(2, "Oak Chair", "Furniture", Decimal::new(550, 2), true),
        product(3, "Road Bike", "Sports", Decimal::new(25_050, 2), false),
        product(4, "Floor Lamp", "Home", Decimal::new(40, 0), true),
    ]
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
