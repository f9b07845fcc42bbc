//! Shopping cart: product id to desired purchase quantity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lookup::{self, Keyed};
use crate::product::Product;
use crate::types::{ItemId, Price};

/// Most units of one product a cart will hold.
pub const MAX_QUANTITY: u32 = 999;

/// One product in the cart.
///
/// `quantity` is always between 1 and [`MAX_QUANTITY`]; an entry whose
/// quantity would reach 0 is removed instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Snapshot of the product taken when it was first added.
    pub product: Product,
    pub quantity: u32,
}

impl CartEntry {
    /// `price * quantity` for this entry, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product
            .price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}

impl Keyed for CartEntry {
    fn item_id(&self) -> ItemId {
        self.product.item_id
    }
}

/// A shopper's cart.
///
/// Entries keep the order in which products were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add one unit of `product`, creating the entry on first add.
    ///
    /// Unavailable products are never added; the call is a no-op and returns
    /// `false`. Returns `true` when the cart changed.
    pub fn add(&mut self, product: &Product) -> bool {
        if !product.available {
            return false;
        }

        if let Some(entry) = lookup::find_mut(&mut self.entries, product.item_id) {
            entry.quantity = entry.quantity.saturating_add(1).min(MAX_QUANTITY);
        } else {
            self.entries.push(CartEntry {
                product: product.clone(),
                quantity: 1,
            });
        }
        true
    }

    /// Remove the entry for `item_id`. Removing an absent item is a no-op.
    ///
    /// Returns `true` if an entry was removed.
    pub fn remove(&mut self, item_id: ItemId) -> bool {
        lookup::remove(&mut self.entries, item_id)
    }

    /// Set the quantity for `item_id`. A quantity of zero or less removes
    /// the entry; anything above [`MAX_QUANTITY`] is capped.
    ///
    /// Returns `true` if an entry for `item_id` existed.
    pub fn update_quantity(&mut self, item_id: ItemId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(item_id);
        }

        match lookup::find_mut(&mut self.entries, item_id) {
            Some(entry) => {
                entry.quantity = u32::try_from(quantity)
                    .unwrap_or(MAX_QUANTITY)
                    .min(MAX_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Sum of `price * quantity` over all entries, saturating at
    /// `Decimal::MAX`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.entries.iter().fold(Decimal::ZERO, |total, entry| {
            total
                .checked_add(entry.line_total())
                .unwrap_or(Decimal::MAX)
        })
    }

    /// [`Cart::total`] as a USD price.
    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::usd(self.total())
    }

    /// Entry for `item_id`, if present.
    #[must_use]
    pub fn get(&self, item_id: ItemId) -> Option<&CartEntry> {
        lookup::find(&self.entries, item_id)
    }

    /// Whether `item_id` is in the cart.
    #[must_use]
    pub fn contains(&self, item_id: ItemId) -> bool {
        lookup::position(&self.entries, item_id).is_some()
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of units across all entries (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0_u32, |count, entry| count.saturating_add(entry.quantity))
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Condition;

    fn product(id: i32, cents: i64, available: bool) -> Product {
        Product {
            item_id: ItemId::new(id),
            name: format!("Item {id}"),
            description: String::new(),
            category: "Misc".to_string(),
            condition: Condition::Good,
            price: Decimal::new(cents, 2),
            available,
            quantity: 5,
            image_name: None,
            image_data: None,
            seller_id: None,
        }
    }

    #[test]
    fn test_repeat_add_increments_single_entry() {
        let mut cart = Cart::new();
        let lamp = product(1, 1000, true);

        assert!(cart.add(&lamp));
        assert!(cart.add(&lamp));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ItemId::new(1)).unwrap().quantity, 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_unavailable_product_is_never_added() {
        let mut cart = Cart::new();
        let sold_out = product(2, 500, false);

        assert!(!cart.add(&sold_out));
        assert!(!cart.add(&sold_out));
        assert!(cart.is_empty());
        assert!(!cart.contains(ItemId::new(2)));
    }

    #[test]
    fn test_total_sums_price_times_quantity() {
        let mut cart = Cart::new();
        let ten = product(1, 1000, true);
        let five_fifty = product(2, 550, true);

        cart.add(&ten);
        cart.add(&ten);
        cart.add(&five_fifty);

        assert_eq!(cart.total(), Decimal::new(2550, 2));
        assert_eq!(cart.total_price().display(), "$25.50");
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        assert_eq!(Cart::new().total(), Decimal::ZERO);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100, true));
        let before = cart.clone();

        assert!(!cart.remove(ItemId::new(99)));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_preserves_order_of_others() {
        let mut cart = Cart::new();
        for id in 1..=3 {
            cart.add(&product(id, 100, true));
        }

        assert!(cart.remove(ItemId::new(2)));

        let ids: Vec<i32> = cart
            .entries()
            .iter()
            .map(|e| e.product.item_id.as_i32())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100, true));

        assert!(cart.update_quantity(ItemId::new(1), 4));
        assert_eq!(cart.get(ItemId::new(1)).unwrap().quantity, 4);
        assert_eq!(cart.total(), Decimal::new(400, 2));
    }

    #[test]
    fn test_update_quantity_non_positive_removes() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100, true));
        cart.add(&product(2, 100, true));

        assert!(cart.update_quantity(ItemId::new(1), 0));
        assert!(cart.update_quantity(ItemId::new(2), -3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_absent_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.update_quantity(ItemId::new(7), 3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_caps_huge_values() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100, true));

        assert!(cart.update_quantity(ItemId::new(1), 4_000_000_000));
        assert_eq!(cart.get(ItemId::new(1)).unwrap().quantity, MAX_QUANTITY);

        assert!(cart.update_quantity(ItemId::new(1), i64::MAX));
        assert_eq!(cart.item_count(), MAX_QUANTITY);
    }

    #[test]
    fn test_repeat_add_stops_at_max_quantity() {
        let mut cart = Cart::new();
        let lamp = product(1, 100, true);
        cart.add(&lamp);
        cart.update_quantity(ItemId::new(1), i64::from(MAX_QUANTITY));

        assert!(cart.add(&lamp));
        assert_eq!(cart.get(ItemId::new(1)).unwrap().quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_total_saturates_instead_of_overflowing() {
        let mut cart = Cart::new();
        let mut pricey = product(1, 0, true);
        pricey.price = Decimal::MAX;
        let mut also_pricey = product(2, 0, true);
        also_pricey.price = Decimal::MAX;

        cart.add(&pricey);
        cart.add(&also_pricey);
        cart.update_quantity(ItemId::new(1), 4_000_000_000);

        assert_eq!(cart.get(ItemId::new(1)).unwrap().line_total(), Decimal::MAX);
        assert_eq!(cart.total(), Decimal::MAX);
    }

    #[test]
    fn test_serde_round_trip_keeps_entries() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1999, true));
        cart.add(&product(1, 1999, true));

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
