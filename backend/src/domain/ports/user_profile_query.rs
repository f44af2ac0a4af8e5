//! Driving port for reading accounts and resolving session actors.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Actor, ClubId, ElectionId, Error, Role, UserAccount, UserId};

/// Account view returned to clients. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub department: Option<String>,
    pub year: Option<String>,
    pub joined_clubs: BTreeSet<ClubId>,
    pub voted_elections: BTreeSet<ElectionId>,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for UserProfile {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            username: account.username.into(),
            display_name: account.display_name.into(),
            role: account.role,
            department: account.department,
            year: account.year,
            joined_clubs: account.joined_clubs,
            voted_elections: account.voted_elections,
            created_at: account.created_at,
        }
    }
}

/// Domain use-case port for profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for the authenticated user.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, Error>;

    /// Resolve a session user id into an [`Actor`].
    ///
    /// A session that points at a missing account is `Unauthorized`.
    async fn resolve_actor(&self, user_id: &UserId) -> Result<Actor, Error>;
}
