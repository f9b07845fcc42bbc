//! Product card: the tile shown for one listing in every product grid.
//!
//! The card is a plain view model. Its partial (`partials/product_card.html`)
//! links to the detail page, posts wishlist toggles to `/wishlist/toggle`,
//! and posts to `/cart/add` when the listing can be bought.

use bazaar_core::{Product, Wishlist};

/// Rendering data for one product tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: i32,
    pub href: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub image_url: String,
    pub condition_label: &'static str,
    pub condition_class: &'static str,
    pub available: bool,
    pub in_wishlist: bool,
}

impl ProductCard {
    /// Build the card for `product`, marking wishlist membership.
    #[must_use]
    pub fn new(product: &Product, wishlist: &Wishlist) -> Self {
        Self {
            id: product.item_id.as_i32(),
            href: format!("/product/{}", product.item_id),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.display_price(),
            image_url: product.image_url(),
            condition_label: product.condition.label(),
            condition_class: product.condition.badge_class(),
            available: product.can_add_to_cart(),
            in_wishlist: wishlist.contains(product.item_id),
        }
    }

    /// Cards for `products`, in order.
    #[must_use]
    pub fn list(products: &[Product], wishlist: &Wishlist) -> Vec<Self> {
        products.iter().map(|p| Self::new(p, wishlist)).collect()
    }

    /// Stock label shown next to the category.
    #[must_use]
    pub const fn availability_label(&self) -> &'static str {
        if self.available { "In Stock" } else { "Out of Stock" }
    }

    /// Label of the add-to-cart button; a disabled button reads "Out of Stock".
    #[must_use]
    pub const fn cart_button_label(&self) -> &'static str {
        if self.available { "Add to Cart" } else { "Out of Stock" }
    }

    /// Accessible name of the wishlist toggle.
    #[must_use]
    pub const fn wishlist_label(&self) -> &'static str {
        if self.in_wishlist {
            "Remove from wishlist"
        } else {
            "Add to wishlist"
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use bazaar_core::{Condition, ItemId};

    use super::*;

    fn product() -> Product {
        Product {
            item_id: ItemId::new(42),
            name: "Record Player".to_string(),
            description: "Plays 33 and 45".to_string(),
            category: "Audio".to_string(),
            condition: Condition::LikeNew,
            price: Decimal::new(123_450, 2),
            available: true,
            quantity: 1,
            image_name: Some("player.jpg".to_string()),
            image_data: None,
            seller_id: None,
        }
    }

    #[test]
    fn test_card_fields() {
        let card = ProductCard::new(&product(), &Wishlist::new());

        assert_eq!(card.href, "/product/42");
        assert_eq!(card.price, "$1,234.50");
        assert_eq!(card.image_url, "/images/products/player.jpg");
        assert_eq!(card.condition_label, "like new");
        assert_eq!(card.condition_class, Condition::LikeNew.badge_class());
        assert_eq!(card.availability_label(), "In Stock");
        assert_eq!(card.cart_button_label(), "Add to Cart");
        assert_eq!(card.wishlist_label(), "Add to wishlist");
    }

    #[test]
    fn test_card_prefers_inline_image() {
        let mut product = product();
        product.image_data = Some("QUJD".to_string());

        let card = ProductCard::new(&product, &Wishlist::new());
        assert_eq!(card.image_url, "data:image/jpeg;base64,QUJD");
    }

    #[test]
    fn test_unavailable_card_disables_cart() {
        let mut product = product();
        product.available = false;

        let card = ProductCard::new(&product, &Wishlist::new());
        assert!(!card.available);
        assert_eq!(card.availability_label(), "Out of Stock");
        assert_eq!(card.cart_button_label(), "Out of Stock");
    }

    #[test]
    fn test_card_reflects_wishlist() {
        let product = product();
        let mut wishlist = Wishlist::new();
        wishlist.add(&product);

        let card = ProductCard::new(&product, &wishlist);
        assert!(card.in_wishlist);
        assert_eq!(card.wishlist_label(), "Remove from wishlist");
    }
}
