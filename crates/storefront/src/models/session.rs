//! Session-related types.
//!
//! Everything a shopper's session carries: who is signed in, the cart, the
//! wishlist, and where to return after signing in.

use serde::{Deserialize, Serialize};

use bazaar_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account id.
    pub id: UserId,
    /// Account email address.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the session's cart.
    pub const CART: &str = "cart";

    /// Key for the session's wishlist.
    pub const WISHLIST: &str = "wishlist";

    /// Key for the page to return to after signing in.
    pub const RETURN_TO: &str = "return_to";
}
