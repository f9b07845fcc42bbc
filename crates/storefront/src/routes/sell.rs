//! Sell page route handlers.
//!
//! Signed-in sellers list an item through a multipart form. An uploaded photo
//! is kept inline on the listing as base64 JPEG data.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use bazaar_core::{Condition, MAX_PRICE, Price};

use crate::catalog::{CatalogError, NewListing};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::{FilterOption, LayoutView};
use crate::state::AppState;

/// Largest accepted photo.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Raw form values, echoed back when the form is re-rendered.
#[derive(Debug, Clone, Default)]
pub struct SellFormView {
    pub name: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub price: String,
    pub quantity: String,
}

impl SellFormView {
    /// Condition choices, with the submitted one selected.
    #[must_use]
    pub fn condition_options(&self) -> Vec<FilterOption> {
        let current = self.condition.parse::<Condition>().ok();
        Condition::ALL
            .iter()
            .map(|&c| FilterOption::new(c.slug(), c.label(), current == Some(c)))
            .collect()
    }

    /// Validate the form into a listing.
    fn to_listing(&self, image_data: Option<String>) -> std::result::Result<NewListing, String> {
        let condition: Condition = self
            .condition
            .parse()
            .map_err(|_| "Please choose a condition.".to_string())?;

        let price: Decimal = self
            .price
            .trim()
            .trim_start_matches('$')
            .replace(',', "")
            .parse()
            .map_err(|_| "Please enter a price like 19.99.".to_string())?;
        if price < Decimal::ZERO {
            return Err("Price cannot be negative.".to_string());
        }
        if price > MAX_PRICE {
            return Err(format!("Price cannot exceed {}.", Price::usd(MAX_PRICE)));
        }

        let quantity = match self.quantity.trim() {
            "" => 1,
            raw => raw
                .parse::<u32>()
                .map_err(|_| "Quantity must be a whole number.".to_string())?,
        };

        Ok(NewListing {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            condition,
            price,
            quantity,
            image_name: None,
            image_data,
        })
    }
}

/// Sell page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/sell.html")]
pub struct SellTemplate {
    pub layout: LayoutView,
    pub form: SellFormView,
    pub error: Option<String>,
}

/// Display the listing form.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn form(RequireAuth(user): RequireAuth, session: Session) -> Result<SellTemplate> {
    Ok(SellTemplate {
        layout: LayoutView::load(&session).await?,
        form: SellFormView {
            condition: Condition::Good.slug().to_string(),
            quantity: "1".to_string(),
            ..SellFormView::default()
        },
        error: None,
    })
}

/// Create a listing from the submitted form.
///
/// Invalid input re-renders the form with the entered values and an error.
/// On success the search index is rebuilt and the seller lands on the new
/// listing's page.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut form = SellFormView::default();
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid form: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid upload: {e}")))?;

            if bytes.is_empty() {
                continue;
            }
            if !content_type.starts_with("image/") {
                return rerender(&session, form, "The photo must be an image file.").await;
            }
            if bytes.len() > MAX_IMAGE_BYTES {
                return rerender(&session, form, "The photo must be 5 MB or smaller.").await;
            }
            image = Some(bytes.to_vec());
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid form: {e}")))?;
        match name.as_str() {
            "name" => form.name = value,
            "description" => form.description = value,
            "category" => form.category = value,
            "condition" => form.condition = value,
            "price" => form.price = value,
            "quantity" => form.quantity = value,
            _ => {}
        }
    }

    let image_data = image.map(|bytes| BASE64.encode(bytes));

    let listing = match form.to_listing(image_data) {
        Ok(listing) => listing,
        Err(message) => return rerender(&session, form, &message).await,
    };

    let product = match state.catalog().create_listing(listing, user.id) {
        Ok(product) => product,
        Err(CatalogError::InvalidListing(message)) => {
            return rerender(&session, form, &capitalize(&message)).await;
        }
        Err(e) => return Err(e.into()),
    };

    state.start_search_indexing();

    let item_id = product.item_id.to_string();
    add_breadcrumb("sell", "Listing created", Some(&[("item_id", item_id.as_str())]));

    Ok(Redirect::to(&format!("/product/{}", product.item_id)).into_response())
}

async fn rerender(session: &Session, form: SellFormView, message: &str) -> Result<Response> {
    let template = SellTemplate {
        layout: LayoutView::load(session).await?,
        form,
        error: Some(message.to_string()),
    };
    Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        format!("{}{}.", first.to_uppercase(), chars.as_str())
    })
}
