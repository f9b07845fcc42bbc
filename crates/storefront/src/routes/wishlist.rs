//! Wishlist route handlers.
//!
//! Like the cart, the wishlist lives in the session. Toggles from product
//! cards are HTMX requests that swap the heart button in place.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bazaar_core::{ItemId, Wishlist};

use crate::components::ProductCard;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{current_user, load_cart, load_wishlist, save_wishlist};
use crate::routes::{LayoutView, is_htmx, redirect_back};
use crate::state::AppState;

/// Wishlist form data (toggle and remove).
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub item_id: ItemId,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/wishlist.html")]
pub struct WishlistShowTemplate {
    pub layout: LayoutView,
    pub cards: Vec<ProductCard>,
}

/// Wishlist grid fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_items.html")]
pub struct WishlistItemsTemplate {
    pub cards: Vec<ProductCard>,
}

/// Wishlist toggle button fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_button.html")]
pub struct WishlistButtonTemplate {
    pub card: ProductCard,
}

fn saved_cards(wishlist: &Wishlist) -> Vec<ProductCard> {
    ProductCard::list(wishlist.entries(), wishlist)
}

/// Display the wishlist page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<WishlistShowTemplate> {
    let user = current_user(&session).await;
    let cart = load_cart(&session).await?;
    let wishlist = load_wishlist(&session).await?;

    Ok(WishlistShowTemplate {
        layout: LayoutView::new(user.as_ref(), &cart, &wishlist),
        cards: saved_cards(&wishlist),
    })
}

/// Save or unsave a listing.
///
/// HTMX requests get the updated heart button and a `wishlist-updated`
/// trigger; plain form posts are sent back where they came from.
#[instrument(skip(state, session, headers))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .get(form.item_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.item_id)))?;

    let mut wishlist = load_wishlist(&session).await?;
    let saved = wishlist.toggle(&product);
    save_wishlist(&session, &wishlist).await?;

    let item_id = form.item_id.to_string();
    let message = if saved {
        "Saved to wishlist"
    } else {
        "Removed from wishlist"
    };
    add_breadcrumb("wishlist", message, Some(&[("item_id", item_id.as_str())]));

    if !is_htmx(&headers) {
        return Ok(redirect_back(&headers, "/wishlist").into_response());
    }

    Ok((
        AppendHeaders([("HX-Trigger", "wishlist-updated")]),
        WishlistButtonTemplate {
            card: ProductCard::new(&product, &wishlist),
        },
    )
        .into_response())
}

/// Remove a listing from the wishlist.
#[instrument(skip(session, headers))]
pub async fn remove(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let mut wishlist = load_wishlist(&session).await?;
    if wishlist.remove(form.item_id) {
        save_wishlist(&session, &wishlist).await?;
    }

    if !is_htmx(&headers) {
        return Ok(Redirect::to("/wishlist").into_response());
    }

    Ok((
        AppendHeaders([("HX-Trigger", "wishlist-updated")]),
        WishlistItemsTemplate {
            cards: saved_cards(&wishlist),
        },
    )
        .into_response())
}
