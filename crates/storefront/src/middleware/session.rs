//! Session middleware configuration and session-scoped stores.
//!
//! Sessions live in an in-memory store; the cart and wishlist are serialized
//! into the session record and disappear with it.

use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use bazaar_core::{Cart, Wishlist};

use crate::config::StorefrontConfig;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bazaar_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Load the session's cart, or an empty one if it has none yet.
///
/// # Errors
///
/// Returns an error if the session record can't be read.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Write the cart back to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Load the session's wishlist, or an empty one if it has none yet.
///
/// # Errors
///
/// Returns an error if the session record can't be read.
pub async fn load_wishlist(session: &Session) -> Result<Wishlist, tower_sessions::session::Error> {
    Ok(session
        .get::<Wishlist>(session_keys::WISHLIST)
        .await?
        .unwrap_or_default())
}

/// Write the wishlist back to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_wishlist(
    session: &Session,
    wishlist: &Wishlist,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::WISHLIST, wishlist).await
}
