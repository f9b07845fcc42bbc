//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Auth gate (route layer on protected pages)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    Access, AuthRejection, GateDecision, OptionalAuth, RequireAuth, current_user, gate,
    require_auth, set_current_user, take_return_to,
};
pub use request_id::request_id_middleware;
pub use session::{
    SESSION_COOKIE_NAME, create_session_layer, load_cart, load_wishlist, save_cart, save_wishlist,
};
