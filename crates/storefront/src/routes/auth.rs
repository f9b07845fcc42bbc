//! Authentication route handlers.
//!
//! Handles login, registration, and logout against the in-memory account
//! directory. Failures redirect back to the form with an error code in the
//! query string; the code maps to a fixed message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::DEFAULT_RETURN_TO;
use crate::middleware::{set_current_user, take_return_to};
use crate::models::User;
use crate::routes::LayoutView;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub layout: LayoutView,
    pub error: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate {
    pub layout: LayoutView,
    pub error: Option<&'static str>,
}

/// Message shown for an error code.
fn error_message(code: Option<&str>) -> Option<&'static str> {
    let message = match code? {
        "credentials" => "Invalid email or password.",
        "invalid_email" => "Please enter a valid email address.",
        "weak_password" => "Passwords must be at least 8 characters.",
        "mismatch" => "Passwords do not match.",
        "exists" => "An account with this email already exists.",
        "session" => "Something went wrong signing you in. Please try again.",
        _ => "Something went wrong. Please try again.",
    };
    Some(message)
}

/// Error code for a failed registration.
fn register_error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::InvalidEmail(_) => "invalid_email",
        AuthError::WeakPassword(_) => "weak_password",
        AuthError::PasswordMismatch => "mismatch",
        AuthError::UserAlreadyExists => "exists",
        AuthError::InvalidCredentials => "credentials",
        AuthError::PasswordHash => "internal",
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(session))]
pub async fn login_page(
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<LoginTemplate> {
    Ok(LoginTemplate {
        layout: LayoutView::load(&session).await?,
        error: error_message(query.error.as_deref()),
    })
}

/// Handle login form submission.
///
/// On success, returns to the page that sent the visitor to login.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let password = SecretString::from(form.password);

    match AuthService::new(state.accounts()).login_with_password(&form.email, &password) {
        Ok(user) => Ok(sign_in(&session, &user).await),
        Err(AuthError::PasswordHash) => Err(AuthError::PasswordHash.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(Redirect::to("/login?error=credentials").into_response())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip(session))]
pub async fn register_page(
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<RegisterTemplate> {
    Ok(RegisterTemplate {
        layout: LayoutView::load(&session).await?,
        error: error_message(query.error.as_deref()),
    })
}

/// Handle registration form submission.
///
/// A new account is signed in immediately.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let password = SecretString::from(form.password);
    let confirm = SecretString::from(form.password_confirm);

    match AuthService::new(state.accounts()).register_with_password(&form.email, &password, &confirm)
    {
        Ok(user) => Ok(sign_in(&session, &user).await),
        Err(AuthError::PasswordHash) => Err(AuthError::PasswordHash.into()),
        Err(e) => {
            tracing::info!(error = %e, "Registration rejected");
            Ok(Redirect::to(&format!("/register?error={}", register_error_code(&e))).into_response())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// Ends the session entirely, which also discards the cart and wishlist.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to end session: {e}");
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}

/// Store the account in a fresh session id and return to the remembered page.
async fn sign_in(session: &Session, user: &User) -> Response {
    if let Err(e) = session.cycle_id().await {
        tracing::error!("Failed to rotate session id: {e}");
        return Redirect::to("/login?error=session").into_response();
    }

    if let Err(e) = set_current_user(session, &user.to_current_user()).await {
        tracing::error!("Failed to set session: {e}");
        return Redirect::to("/login?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));

    let target = match take_return_to(session).await {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!("Failed to read return path: {e}");
            DEFAULT_RETURN_TO.to_string()
        }
    };

    Redirect::to(&target).into_response()
}
