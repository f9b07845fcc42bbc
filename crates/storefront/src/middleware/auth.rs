//! Authentication gate, middleware, and extractors.
//!
//! The gate decision itself is the pure function [`gate`]. The HTTP side
//! applies it in [`require_auth`] (a route layer for protected pages) and in
//! the [`RequireAuth`] / [`OptionalAuth`] extractors.

use axum::{
    extract::{FromRequestParts, Request},
    http::{Method, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};
use crate::routes::table;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Default landing page after sign-in.
pub const DEFAULT_RETURN_TO: &str = "/profile";

/// Access requirement for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone may view the page.
    Public,
    /// Only signed-in visitors may view the page.
    Authenticated,
}

/// Outcome of the auth gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the requested page.
    Render,
    /// Send the visitor to the login page.
    RedirectToLogin,
}

/// Decide whether a page with `access` may be rendered.
#[must_use]
pub const fn gate(access: Access, authenticated: bool) -> GateDecision {
    match access {
        Access::Authenticated if !authenticated => GateDecision::RedirectToLogin,
        Access::Public | Access::Authenticated => GateDecision::Render,
    }
}

/// Extractor that requires a signed-in account.
///
/// If nobody is signed in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is signed in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl AuthRejection {
    fn for_path(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => {
                AppError::Unauthorized("sign-in required".to_string()).into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user = current_user(session)
            .await
            .ok_or_else(|| AuthRejection::for_path(parts.uri.path()))?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the signed-in account.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Route layer guarding authenticated pages.
///
/// Resolves the request path against the route table and applies [`gate`]
/// to the session's sign-in state. Paths outside the table are treated as
/// authenticated. A rejected GET remembers the requested path so login can
/// return there.
pub async fn require_auth(session: Session, request: Request, next: Next) -> Response {
    let authenticated = current_user(&session).await.is_some();
    let decision = table::resolve(request.uri().path(), authenticated).map_or_else(
        || gate(Access::Authenticated, authenticated),
        |(_, decision)| decision,
    );

    match decision {
        GateDecision::Render => next.run(request).await,
        GateDecision::RedirectToLogin => {
            let rejection = AuthRejection::for_path(request.uri().path());

            if matches!(rejection, AuthRejection::RedirectToLogin) && request.method() == Method::GET {
                let target = request
                    .uri()
                    .path_and_query()
                    .map_or_else(|| request.uri().path().to_string(), ToString::to_string);
                if let Err(e) = session.insert(session_keys::RETURN_TO, target).await {
                    tracing::warn!(error = %e, "Failed to remember return path");
                }
            }

            tracing::debug!(path = %request.uri().path(), "Auth gate redirect");
            rejection.into_response()
        }
    }
}

/// Read the signed-in account from the session.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Helper to set the signed-in account in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Take the remembered return path, falling back to the profile page.
///
/// Only same-site paths are honored.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn take_return_to(session: &Session) -> Result<String, tower_sessions::session::Error> {
    let target = session
        .remove::<String>(session_keys::RETURN_TO)
        .await?
        .filter(|path| is_local_path(path));

    Ok(target.unwrap_or_else(|| DEFAULT_RETURN_TO.to_string()))
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_gate_public_always_renders() {
        assert_eq!(gate(Access::Public, false), GateDecision::Render);
        assert_eq!(gate(Access::Public, true), GateDecision::Render);
    }

    #[test]
    fn test_gate_authenticated() {
        assert_eq!(
            gate(Access::Authenticated, false),
            GateDecision::RedirectToLogin
        );
        assert_eq!(gate(Access::Authenticated, true), GateDecision::Render);
    }

    #[test]
    fn test_rejection_for_api_paths() {
        assert!(matches!(
            AuthRejection::for_path("/api/cart"),
            AuthRejection::Unauthorized
        ));
        assert!(matches!(
            AuthRejection::for_path("/sell"),
            AuthRejection::RedirectToLogin
        ));
    }

    #[test]
    fn test_rejection_redirects_to_login() {
        let response = AuthRejection::RedirectToLogin.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], LOGIN_PATH);
    }

    #[test]
    fn test_api_rejection_is_unauthorized() {
        let response = AuthRejection::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_is_local_path() {
        assert!(is_local_path("/sell"));
        assert!(is_local_path("/profile?tab=listings"));
        assert!(!is_local_path("//evil.example"));
        assert!(!is_local_path("https://evil.example"));
        assert!(!is_local_path("/\\evil.example"));
    }
}
