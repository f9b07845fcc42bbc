//! Bazaar Core - Shared marketplace types.
//!
//! This crate provides the types used across all Bazaar components:
//! - `storefront` - Public-facing marketplace site
//! - `integration-tests` - End-to-end tests against the storefront router
//!
//! # Architecture
//!
//! The core crate contains only types and in-memory data structures - no I/O,
//! no HTTP, no sessions. The cart and wishlist stores live here so they can be
//! serialized into whatever session backend the web layer chooses.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and item conditions
//! - [`product`] - The marketplace listing entity and image resolution
//! - [`store`] - Session-scoped cart and wishlist stores

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod product;
pub mod store;
pub mod types;

pub use product::{ImageSource, MAX_PRICE, Product};
pub use store::{Cart, CartEntry, Wishlist};
pub use types::*;
