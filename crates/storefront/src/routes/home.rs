//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::components::ProductCard;
use crate::error::Result;
use crate::filters;
use crate::middleware::{current_user, load_cart, load_wishlist};
use crate::routes::{FilterOption, LayoutView};
use crate::state::AppState;

/// Query parameters for the home page.
#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub category: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub layout: LayoutView,
    pub cards: Vec<ProductCard>,
    pub categories: Vec<FilterOption>,
    pub selected_category: Option<String>,
}

/// Display the home page: every listing, optionally narrowed to a category.
#[instrument(skip(state, session))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<HomeQuery>,
) -> Result<HomeTemplate> {
    let user = current_user(&session).await;
    let cart = load_cart(&session).await?;
    let wishlist = load_wishlist(&session).await?;

    let selected_category = query
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let products = match &selected_category {
        Some(category) => state.catalog().by_category(category),
        None => state.catalog().list(),
    };

    Ok(HomeTemplate {
        layout: LayoutView::new(user.as_ref(), &cart, &wishlist),
        cards: ProductCard::list(&products, &wishlist),
        categories: FilterOption::categories(
            state.catalog().categories(),
            selected_category.as_deref(),
        ),
        selected_category,
    })
}
