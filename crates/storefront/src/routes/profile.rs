//! Profile page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::components::ProductCard;
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, load_cart, load_wishlist};
use crate::routes::LayoutView;
use crate::state::AppState;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/profile.html")]
pub struct ProfileTemplate {
    pub layout: LayoutView,
    pub email: String,
    /// e.g. "October 2026"; empty if the account record is gone
    pub member_since: String,
    pub listings: Vec<ProductCard>,
    pub cart_count: u32,
    pub wishlist_count: usize,
}

/// Display the signed-in account with its listings and session totals.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<ProfileTemplate> {
    let cart = load_cart(&session).await?;
    let wishlist = load_wishlist(&session).await?;

    let member_since = state
        .accounts()
        .get(user.id)
        .map(|account| account.created_at.format("%B %Y").to_string())
        .unwrap_or_default();

    let listings = state.catalog().by_seller(user.id);

    Ok(ProfileTemplate {
        layout: LayoutView::new(Some(&user), &cart, &wishlist),
        email: user.email.to_string(),
        member_since,
        listings: ProductCard::list(&listings, &wishlist),
        cart_count: cart.item_count(),
        wishlist_count: wishlist.len(),
    })
}
