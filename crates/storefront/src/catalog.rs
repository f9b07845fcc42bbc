//! In-memory listing catalog.
//!
//! Listings are seeded from a JSON file at startup and grow as sellers list
//! new items. The catalog is process-wide and shared by every session.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use bazaar_core::{Condition, ItemId, MAX_PRICE, Price, Product, UserId};

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A listing failed validation.
    #[error("invalid listing: {0}")]
    InvalidListing(String),
    /// Two seed listings share an id.
    #[error("duplicate item id {0}")]
    DuplicateId(ItemId),
    /// The seed file couldn't be read.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    /// The seed file isn't a JSON array of listings.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A listing submitted by a seller, before it has an id.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub name: String,
    pub description: String,
    pub category: String,
    pub condition: Condition,
    pub price: Decimal,
    pub quantity: u32,
    pub image_name: Option<String>,
    pub image_data: Option<String>,
}

impl NewListing {
    fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidListing("name is required".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(CatalogError::InvalidListing(
                "category is required".to_string(),
            ));
        }
        if self.price < Decimal::ZERO {
            return Err(CatalogError::InvalidListing(
                "price cannot be negative".to_string(),
            ));
        }
        if self.price > MAX_PRICE {
            return Err(CatalogError::InvalidListing(format!(
                "price cannot exceed {}",
                Price::usd(MAX_PRICE)
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CatalogInner {
    products: BTreeMap<ItemId, Product>,
}

impl CatalogInner {
    fn next_id(&self) -> ItemId {
        let last = self
            .products
            .keys()
            .next_back()
            .map_or(0, ItemId::as_i32);
        ItemId::new(last.saturating_add(1))
    }
}

/// The listing catalog.
///
/// Cheaply cloneable; clones share the same listings.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    inner: Arc<RwLock<CatalogInner>>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding `products`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two products share an id.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for product in products {
            let id = product.item_id;
            if map.insert(id, product).is_some() {
                return Err(CatalogError::DuplicateId(id));
            }
        }

        Ok(Self {
            inner: Arc::new(RwLock::new(CatalogInner { products: map })),
        })
    }

    /// Load a catalog from a JSON array of listings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read, isn't valid listing JSON,
    /// or contains duplicate ids.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let products: Vec<Product> = serde_json::from_str(&raw)?;
        let count = products.len();
        let catalog = Self::from_products(products)?;
        tracing::info!(count, "Catalog loaded");
        Ok(catalog)
    }

    /// All listings ordered by id.
    #[must_use]
    pub fn list(&self) -> Vec<Product> {
        self.read(|inner| inner.products.values().cloned().collect())
    }

    /// Listing by id.
    #[must_use]
    pub fn get(&self, item_id: ItemId) -> Option<Product> {
        self.read(|inner| inner.products.get(&item_id).cloned())
    }

    /// Listings in `category` (case-insensitive).
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<Product> {
        let category = category.trim();
        self.read(|inner| {
            inner
                .products
                .values()
                .filter(|p| p.category.eq_ignore_ascii_case(category))
                .cloned()
                .collect()
        })
    }

    /// Distinct category names, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.read(|inner| {
            inner
                .products
                .values()
                .map(|p| p.category.clone())
                .collect()
        });
        categories.sort_by_key(|c| c.to_lowercase());
        categories.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        categories
    }

    /// Listings created by `seller`.
    #[must_use]
    pub fn by_seller(&self, seller: UserId) -> Vec<Product> {
        self.read(|inner| {
            inner
                .products
                .values()
                .filter(|p| p.seller_id == Some(seller))
                .cloned()
                .collect()
        })
    }

    /// Other listings in the same category as `item_id`, up to `limit`.
    #[must_use]
    pub fn related(&self, item_id: ItemId, limit: usize) -> Vec<Product> {
        let Some(product) = self.get(item_id) else {
            return Vec::new();
        };

        self.by_category(&product.category)
            .into_iter()
            .filter(|p| p.item_id != item_id)
            .take(limit)
            .collect()
    }

    /// Number of listings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read(|inner| inner.products.len())
    }

    /// Whether the catalog has no listings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a seller's listing and assign it the next free id.
    ///
    /// New listings are available when they have stock.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidListing` if the listing has no name or
    /// category, or a negative price.
    #[instrument(skip(self, listing), fields(name = %listing.name))]
    pub fn create_listing(&self, listing: NewListing, seller: UserId) -> Result<Product, CatalogError> {
        listing.validate()?;

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let product = Product {
            item_id: inner.next_id(),
            name: listing.name.trim().to_string(),
            description: listing.description.trim().to_string(),
            category: listing.category.trim().to_string(),
            condition: listing.condition,
            price: if listing.price.is_zero() {
                Decimal::ZERO
            } else {
                listing.price
            },
            available: listing.quantity > 0,
            quantity: listing.quantity,
            image_name: listing.image_name.filter(|_| listing.image_data.is_none()),
            image_data: listing.image_data,
            seller_id: Some(seller),
        };
        inner.products.insert(product.item_id, product.clone());
        drop(inner);

        tracing::info!(item_id = %product.item_id, seller = %seller, "Listing created");
        Ok(product)
    }

    fn read<T>(&self, f: impl FnOnce(&CatalogInner) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}
