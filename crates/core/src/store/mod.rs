//! Session-scoped shopper stores.
//!
//! A [`Cart`] and a [`Wishlist`] are plain owned values. The web layer keeps
//! one of each per session, loads it at the start of a request, mutates it
//! and writes it back; nothing here is global.

pub mod cart;
mod lookup;
pub mod wishlist;

pub use cart::{Cart, CartEntry};
pub use wishlist::Wishlist;
