//! Wishlist: a set of saved products.

use serde::{Deserialize, Serialize};

use super::lookup;
use crate::product::Product;
use crate::types::ItemId;

/// A shopper's wishlist.
///
/// Membership has set semantics keyed on [`ItemId`]; entries are full product
/// snapshots kept in the order they were saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    items: Vec<Product>,
}

impl Wishlist {
    /// Create an empty wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Save `product` unless it's already saved.
    ///
    /// Returns `true` if it was inserted.
    pub fn add(&mut self, product: &Product) -> bool {
        if self.contains(product.item_id) {
            return false;
        }
        self.items.push(product.clone());
        true
    }

    /// Remove `item_id` if present.
    ///
    /// Returns `true` if it was removed.
    pub fn remove(&mut self, item_id: ItemId) -> bool {
        lookup::remove(&mut self.items, item_id)
    }

    /// Whether `item_id` is saved.
    #[must_use]
    pub fn contains(&self, item_id: ItemId) -> bool {
        lookup::position(&self.items, item_id).is_some()
    }

    /// Flip membership of `product`.
    ///
    /// Returns the new membership: `true` if the product is now saved.
    pub fn toggle(&mut self, product: &Product) -> bool {
        if self.contains(product.item_id) {
            self.remove(product.item_id);
            false
        } else {
            self.add(product)
        }
    }

    /// Saved product for `item_id`, if any.
    #[must_use]
    pub fn get(&self, item_id: ItemId) -> Option<&Product> {
        lookup::find(&self.items, item_id)
    }

    /// Saved products in the order they were added.
    #[must_use]
    pub fn entries(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::Condition;

    fn product(id: i32) -> Product {
        Product {
            item_id: ItemId::new(id),
            name: format!("Item {id}"),
            description: String::new(),
            category: "Books".to_string(),
            condition: Condition::Fair,
            price: Decimal::new(300, 2),
            available: false,
            quantity: 0,
            image_name: None,
            image_data: None,
            seller_id: None,
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.add(&product(1)));
        assert!(!wishlist.add(&product(1)));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut wishlist = Wishlist::new();
        wishlist.add(&product(1));

        assert!(!wishlist.remove(ItemId::new(2)));
        assert_eq!(wishlist.len(), 1);
        assert!(wishlist.remove(ItemId::new(1)));
        assert!(!wishlist.remove(ItemId::new(1)));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_original_state() {
        let mut wishlist = Wishlist::new();
        wishlist.add(&product(5));
        let original = wishlist.clone();

        assert!(wishlist.toggle(&product(9)));
        assert!(wishlist.contains(ItemId::new(9)));
        assert!(!wishlist.toggle(&product(9)));
        assert_eq!(wishlist, original);

        assert!(!wishlist.toggle(&product(5)));
        assert!(wishlist.toggle(&product(5)));
        assert_eq!(wishlist, original);
    }

    #[test]
    fn test_unavailable_products_can_be_saved() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.add(&product(3)));
        assert_eq!(wishlist.get(ItemId::new(3)).map(|p| p.available), Some(false));
    }
}
