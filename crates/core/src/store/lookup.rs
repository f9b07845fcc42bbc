//! Id lookups shared by the cart and wishlist.
//!
//! Both stores keep entries in insertion order in a `Vec`; shopper stores
//! hold a handful of items, so a linear scan beats maintaining an index.

use crate::product::Product;
use crate::types::ItemId;

/// Anything stored under a product's [`ItemId`].
pub(crate) trait Keyed {
    /// The id this entry is stored under.
    fn item_id(&self) -> ItemId;
}

impl Keyed for Product {
    fn item_id(&self) -> ItemId {
        self.item_id
    }
}

/// Index of the entry keyed by `id`, if any.
pub(crate) fn position<T: Keyed>(entries: &[T], id: ItemId) -> Option<usize> {
    entries.iter().position(|entry| entry.item_id() == id)
}

/// Shared reference to the entry keyed by `id`.
pub(crate) fn find<T: Keyed>(entries: &[T], id: ItemId) -> Option<&T> {
    entries.iter().find(|entry| entry.item_id() == id)
}

/// Mutable reference to the entry keyed by `id`.
pub(crate) fn find_mut<T: Keyed>(entries: &mut [T], id: ItemId) -> Option<&mut T> {
    entries.iter_mut().find(|entry| entry.item_id() == id)
}

/// Remove the entry keyed by `id`, preserving the order of the rest.
///
/// Returns `true` if an entry was removed.
pub(crate) fn remove<T: Keyed>(entries: &mut Vec<T>, id: ItemId) -> bool {
    position(entries, id).is_some_and(|index| {
        entries.remove(index);
        true
    })
}
