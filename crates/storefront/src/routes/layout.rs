//! Data shared by every full page: the header's sign-in state and badges.

use tower_sessions::Session;

use bazaar_core::{Cart, Wishlist};

use crate::middleware::{current_user, load_cart, load_wishlist};
use crate::models::CurrentUser;

/// Header data rendered by `base.html`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutView {
    pub signed_in: bool,
    pub email: Option<String>,
    pub cart_count: u32,
    pub wishlist_count: usize,
}

impl LayoutView {
    /// Build from already-loaded session state.
    #[must_use]
    pub fn new(user: Option<&CurrentUser>, cart: &Cart, wishlist: &Wishlist) -> Self {
        Self {
            signed_in: user.is_some(),
            email: user.map(|u| u.email.to_string()),
            cart_count: cart.item_count(),
            wishlist_count: wishlist.len(),
        }
    }

    /// Load the header data from the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session record can't be read.
    pub async fn load(session: &Session) -> Result<Self, tower_sessions::session::Error> {
        let user = current_user(session).await;
        let cart = load_cart(session).await?;
        let wishlist = load_wishlist(session).await?;
        Ok(Self::new(user.as_ref(), &cart, &wishlist))
    }
}

/// One choice in a select box or link list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }

    /// One option per category; `selected` matches case-insensitively.
    #[must_use]
    pub fn categories(categories: Vec<String>, selected: Option<&str>) -> Vec<Self> {
        categories
            .into_iter()
            .map(|category| {
                let is_selected = selected.is_some_and(|s| s.eq_ignore_ascii_case(&category));
                Self::new(category.clone(), category, is_selected)
            })
            .collect()
    }
}
