//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod condition;
pub mod email;
pub mod id;
pub mod price;

pub use condition::{Condition, ConditionError, NEUTRAL_BADGE_CLASS};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
