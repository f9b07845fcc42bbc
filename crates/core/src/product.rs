//! Marketplace listing entity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Condition, ItemId, Price, UserId};

/// URL prefix for images served from the product image directory.
pub const PRODUCT_IMAGE_PREFIX: &str = "/images/products/";

/// Image shown when a listing has neither inline data nor a file name.
pub const PLACEHOLDER_IMAGE: &str = "/images/products/placeholder.svg";

/// Highest price a listing may ask: $1,000,000.00.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// A marketplace listing.
///
/// Field names follow the listing JSON format (`itemId`, `imageName`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Globally unique, stable identifier. All store lookups key on it.
    pub item_id: ItemId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub condition: Condition,
    /// Non-negative amount up to [`MAX_PRICE`], currency-agnostic. Displayed as USD.
    pub price: Decimal,
    /// When false the product can't be added to a cart.
    pub available: bool,
    /// Stock count.
    pub quantity: u32,
    /// File name under the product image directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    /// Base64-encoded JPEG payload. Takes precedence over `image_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// Account that created the listing, if it was listed through the site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<UserId>,
}

impl Product {
    /// Display price, e.g. `$19.99`.
    #[must_use]
    pub fn display_price(&self) -> String {
        Price::usd(self.price).display()
    }

    /// Whether the add-to-cart control should be enabled.
    #[must_use]
    pub const fn can_add_to_cart(&self) -> bool {
        self.available
    }

    /// Where this product's image comes from.
    #[must_use]
    pub fn image_source(&self) -> ImageSource<'_> {
        ImageSource::resolve(self.image_data.as_deref(), self.image_name.as_deref())
    }

    /// URL to use as the image `src`.
    #[must_use]
    pub fn image_url(&self) -> String {
        self.image_source().url()
    }
}

/// Resolved image reference for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// Inline base64 JPEG data.
    Inline(&'a str),
    /// File name under [`PRODUCT_IMAGE_PREFIX`].
    File(&'a str),
    /// Nothing usable; render [`PLACEHOLDER_IMAGE`].
    Placeholder,
}

impl<'a> ImageSource<'a> {
    /// Pick inline data when present and non-empty, else the file name.
    #[must_use]
    pub fn resolve(image_data: Option<&'a str>, image_name: Option<&'a str>) -> Self {
        let non_empty = |s: &&str| !s.trim().is_empty();

        if let Some(data) = image_data.filter(non_empty) {
            Self::Inline(data)
        } else if let Some(name) = image_name.filter(non_empty) {
            Self::File(name)
        } else {
            Self::Placeholder
        }
    }

    /// URL for an `<img src>` attribute.
    #[must_use]
    pub fn url(self) -> String {
        match self {
            Self::Inline(data) => format!("data:image/jpeg;base64,{data}"),
            Self::File(name) => format!("{PRODUCT_IMAGE_PREFIX}{name}"),
            Self::Placeholder => PLACEHOLDER_IMAGE.to_string(),
        }
    }
}
