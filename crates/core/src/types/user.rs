//! User entity types.
//!
//! Accounts live in the backend auth service; profiles are documents keyed
//! by the account's stable identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::email::Email;
use crate::types::id::UserId;

/// An account issued by the backend auth service.
///
/// The id is the stable identifier, durable across sign-ins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub email: Email,
}

/// A user's profile document.
///
/// Written at registration time and fetched on login. Keyed by the stable
/// account identifier, so the auth service stays the single source of user
/// identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable account identifier from the auth service.
    pub id: UserId,
    /// Email address used to sign in.
    pub email: Email,
    /// Full display name.
    pub full_name: String,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}
