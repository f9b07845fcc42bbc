//! Bazaar storefront library.
//!
//! The marketplace site as a library: the router, its handlers, and the
//! in-memory catalog, accounts, and search index behind them. The binary in
//! `main.rs` wires it to configuration, logging, and Sentry.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod components;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod search;
pub mod services;
pub mod state;
