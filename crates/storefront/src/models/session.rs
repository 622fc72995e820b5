//! Session state.
//!
//! The only thing the session stores is the authenticated identity. There is
//! no separate logged-in flag anywhere: being logged in *is* the presence of
//! a [`CurrentUser`] in the session.

use serde::{Deserialize, Serialize};

use orchard_core::{Account, Email, UserId};

/// Well-known session keys.
pub mod session_keys {
    /// The authenticated identity, a [`super::CurrentUser`].
    pub const CURRENT_USER: &str = "current_user";
}

/// The identity stored in an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    /// From the profile document, when one was written at registration.
    pub full_name: Option<String>,
}

impl From<Account> for CurrentUser {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            full_name: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_round_trips_through_session_storage() {
        let user = CurrentUser {
            id: UserId::from("u-1"),
            email: Email::parse("ada@example.com").unwrap(),
            full_name: Some("Ada Lovelace".to_owned()),
        };
        let value = serde_json::to_value(&user).unwrap();
        let back: CurrentUser = serde_json::from_value(value).unwrap();
        assert_eq!(back, user);
    }
}
