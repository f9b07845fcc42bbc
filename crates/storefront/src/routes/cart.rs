//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session; each handler loads it, applies one
//! change, and writes it back. Plain form posts get a redirect instead of a
//! fragment.

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

use bazaar_core::{Cart, CartEntry, ItemId, Price};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{current_user, load_cart, load_wishlist, save_cart};
use crate::routes::{LayoutView, is_htmx};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: i32,
    pub href: String,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartEntry> for CartLineView {
    fn from(entry: &CartEntry) -> Self {
        Self {
            id: entry.product.item_id.as_i32(),
            href: format!("/product/{}", entry.product.item_id),
            name: entry.product.name.clone(),
            image_url: entry.product.image_url(),
            quantity: entry.quantity,
            price: entry.product.display_price(),
            line_price: Price::usd(entry.line_total()).display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.entries().iter().map(CartLineView::from).collect(),
            subtotal: cart.total_price().display(),
            item_count: cart.item_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub item_id: ItemId,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: ItemId,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: ItemId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/cart.html")]
pub struct CartShowTemplate {
    pub layout: LayoutView,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<CartShowTemplate> {
    let user = current_user(&session).await;
    let cart = load_cart(&session).await?;
    let wishlist = load_wishlist(&session).await?;

    Ok(CartShowTemplate {
        layout: LayoutView::new(user.as_ref(), &cart, &wishlist),
        cart: CartView::from(&cart),
    })
}

/// Add one unit of a listing to the cart.
///
/// Unavailable listings are left out silently. HTMX requests get the count
/// badge and a `cart-updated` trigger when the cart changed.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .get(form.item_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.item_id)))?;

    let mut cart = load_cart(&session).await?;
    let changed = cart.add(&product);
    if changed {
        save_cart(&session, &cart).await?;
        let item_id = form.item_id.to_string();
        add_breadcrumb("cart", "Added to cart", Some(&[("item_id", item_id.as_str())]));
    } else {
        tracing::debug!(item_id = %form.item_id, "Skipped unavailable listing");
    }

    if !is_htmx(&headers) {
        return Ok(Redirect::to("/cart").into_response());
    }

    let badge = CartCountTemplate {
        count: cart.item_count(),
    };
    if changed {
        Ok((AppendHeaders([("HX-Trigger", "cart-updated")]), badge).into_response())
    } else {
        Ok(badge.into_response())
    }
}

/// Update cart item quantity. Zero or less removes the item.
#[instrument(skip(session, headers))]
pub async fn update(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    if cart.update_quantity(form.item_id, form.quantity) {
        save_cart(&session, &cart).await?;
    }

    Ok(cart_items_response(&cart, &headers))
}

/// Remove item from cart.
#[instrument(skip(session, headers))]
pub async fn remove(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    if cart.remove(form.item_id) {
        save_cart(&session, &cart).await?;
    }

    Ok(cart_items_response(&cart, &headers))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<CartCountTemplate> {
    let cart = load_cart(&session).await?;
    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}

fn cart_items_response(cart: &Cart, headers: &HeaderMap) -> Response {
    if !is_htmx(headers) {
        return Redirect::to("/cart").into_response();
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(cart),
        },
    )
        .into_response()
}
