//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tower_sessions::Session;
use tracing::instrument;

use bazaar_core::ItemId;

use crate::components::ProductCard;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, load_cart, load_wishlist};
use crate::routes::LayoutView;
use crate::state::AppState;

/// How many related listings the detail page shows.
const RELATED_LIMIT: usize = 4;

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/product.html")]
pub struct ProductShowTemplate {
    pub layout: LayoutView,
    pub card: ProductCard,
    pub stock: u32,
    pub in_cart: u32,
    pub related: Vec<ProductCard>,
}

/// Display a product detail page.
#[instrument(skip(state, user, session))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(id): Path<String>,
) -> Result<ProductShowTemplate> {
    let item_id: ItemId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("product {id}")))?;
    let product = state
        .catalog()
        .get(item_id)
        .ok_or_else(|| AppError::NotFound(format!("product {item_id}")))?;

    let cart = load_cart(&session).await?;
    let wishlist = load_wishlist(&session).await?;

    let related = state.catalog().related(item_id, RELATED_LIMIT);

    Ok(ProductShowTemplate {
        layout: LayoutView::new(user.as_ref(), &cart, &wishlist),
        card: ProductCard::new(&product, &wishlist),
        stock: product.quantity,
        in_cart: cart.get(item_id).map_or(0, |entry| entry.quantity),
        related: ProductCard::list(&related, &wishlist),
    })
}
