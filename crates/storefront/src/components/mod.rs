//! Reusable view models rendered by template partials.

pub mod product_card;

pub use product_card::ProductCard;
