//! Account domain types.

use chrono::{DateTime, Utc};

use bazaar_core::{Email, UserId};

use super::CurrentUser;

/// A marketplace account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique account id.
    pub id: UserId,
    /// Login email address.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The identity to store in the session after sign-in.
    #[must_use]
    pub fn to_current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}
