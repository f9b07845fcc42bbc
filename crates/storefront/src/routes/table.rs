//! The page route table and its dispatcher.
//!
//! Every page the storefront renders is listed in [`ROUTE_TABLE`] with the
//! access it requires. [`page_routes`] turns the table into an axum router,
//! wrapping authenticated entries in the auth gate.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{MethodRouter, get},
};

use super::{auth, cart, home, products, profile, search, sell, wishlist};
use crate::middleware::{Access, GateDecision, gate, require_auth};
use crate::state::AppState;

/// Largest accepted listing form, image included.
const MAX_LISTING_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Pages of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Product,
    Search,
    Login,
    Register,
    Cart,
    Wishlist,
    Sell,
    Profile,
}

impl Page {
    /// Handlers serving this page.
    fn method_router(self) -> MethodRouter<AppState> {
        match self {
            Self::Home => get(home::home),
            Self::Product => get(products::show),
            Self::Search => get(search::search),
            Self::Login => get(auth::login_page).post(auth::login),
            Self::Register => get(auth::register_page).post(auth::register),
            Self::Cart => get(cart::show),
            Self::Wishlist => get(wishlist::show),
            Self::Sell => get(sell::form)
                .post(sell::create)
                .layer(DefaultBodyLimit::max(MAX_LISTING_UPLOAD_BYTES)),
            Self::Profile => get(profile::show),
        }
    }
}

/// One row of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    /// axum path pattern; `{name}` matches one segment.
    pub path: &'static str,
    pub page: Page,
    pub access: Access,
}

const fn entry(path: &'static str, page: Page, access: Access) -> RouteEntry {
    RouteEntry { path, page, access }
}

/// Every page route, in display order.
pub const ROUTE_TABLE: &[RouteEntry] = &[
    entry("/", Page::Home, Access::Public),
    entry("/product/{id}", Page::Product, Access::Public),
    entry("/search", Page::Search, Access::Public),
    entry("/login", Page::Login, Access::Public),
    entry("/register", Page::Register, Access::Public),
    entry("/cart", Page::Cart, Access::Public),
    entry("/wishlist", Page::Wishlist, Access::Public),
    entry("/sell", Page::Sell, Access::Authenticated),
    entry("/profile", Page::Profile, Access::Authenticated),
];

/// Find the table entry matching a request path.
#[must_use]
pub fn lookup(path: &str) -> Option<&'static RouteEntry> {
    ROUTE_TABLE
        .iter()
        .find(|entry| path_matches(entry.path, path))
}

/// Find the entry for `path` and apply the auth gate to it.
#[must_use]
pub fn resolve(path: &str, authenticated: bool) -> Option<(&'static RouteEntry, GateDecision)> {
    lookup(path).map(|entry| (entry, gate(entry.access, authenticated)))
}

/// Build the router for every page in the table.
pub fn page_routes() -> Router<AppState> {
    ROUTE_TABLE.iter().fold(Router::new(), |router, entry| {
        let handler = entry.page.method_router();
        let handler = match entry.access {
            Access::Public => handler,
            Access::Authenticated => handler.route_layer(middleware::from_fn(require_auth)),
        };
        router.route(entry.path, handler)
    })
}

fn path_matches(pattern: &str, path: &str) -> bool {
    let path = match path.split_once('?') {
        Some((path, _)) => path,
        None => path,
    };
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };

    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(expected), Some(actual)) => {
                let is_param = expected.starts_with('{') && expected.ends_with('}');
                if is_param && actual.is_empty() {
                    return false;
                }
                if !is_param && expected != actual {
                    return false;
                }
            }
            _ => return false,
        }
    }
}
