//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Pages (see `table::ROUTE_TABLE`)
//! GET       /                  - Home page, optional ?category=
//! GET       /product/{id}      - Product detail
//! GET       /search            - Search with filters and sort
//! GET, POST /login             - Login
//! GET, POST /register          - Register
//! GET       /cart              - Cart page
//! GET       /wishlist          - Wishlist page
//! GET, POST /sell              - Listing form (requires auth)
//! GET       /profile           - Account profile (requires auth)
//!
//! # Cart (HTMX fragments)
//! POST /cart/add               - Add one unit (returns count badge, triggers cart-updated)
//! POST /cart/update            - Set quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Wishlist (HTMX fragments)
//! POST /wishlist/toggle        - Toggle membership (returns wishlist button)
//! POST /wishlist/remove        - Remove item (returns wishlist_items fragment)
//!
//! # Other
//! POST /logout                 - Sign out and end the session
//! GET  /health                 - Health check
//! GET  /images/products/*      - Product images
//! ```

pub mod auth;
pub mod cart;
pub mod home;
pub mod layout;
pub mod products;
pub mod profile;
pub mod search;
pub mod sell;
pub mod table;
pub mod wishlist;

use axum::{
    Router,
    extract::Request,
    http::{HeaderMap, Uri},
    middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

pub use layout::{FilterOption, LayoutView};

/// Create the cart action routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/count", get(cart::count))
}

/// Create the wishlist action routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/wishlist/toggle", post(wishlist::toggle))
        .route("/wishlist/remove", post(wishlist::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    table::page_routes()
        .merge(cart_routes())
        .merge(wishlist_routes())
        .route("/logout", post(auth::logout))
        .route("/health", get(health))
}

/// Build the complete application: routes, static images, sessions,
/// request ids, and tracing.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());
    let images = ServeDir::new(&state.config().images_dir);

    Router::new()
        .merge(routes())
        .nest_service("/images/products", images)
        .fallback(not_found)
        .layer(session_layer)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Whether the request was issued by HTMX and expects a fragment.
pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|value| value.as_bytes() == b"true")
}

/// Redirect to the page the request came from, or `fallback`.
///
/// Only the path of the `Referer` is used, so the redirect stays on-site.
pub(crate) fn redirect_back(headers: &HeaderMap, fallback: &str) -> Redirect {
    let target = headers
        .get(axum::http::header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Uri>().ok())
        .and_then(|uri| uri.path_and_query().map(ToString::to_string))
        .filter(|path| path.starts_with('/') && !path.starts_with("//"));

    Redirect::to(target.as_deref().unwrap_or(fallback))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }

    #[test]
    fn test_redirect_back_uses_referer_path() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::REFERER,
            HeaderValue::from_static("https://evil.example/search?q=lamp"),
        );

        let response = redirect_back(&headers, "/").into_response();
        assert_eq!(response.headers()["location"], "/search?q=lamp");
    }

    #[test]
    fn test_redirect_back_falls_back() {
        let response = redirect_back(&HeaderMap::new(), "/wishlist").into_response();
        assert_eq!(response.headers()["location"], "/wishlist");
    }
}
