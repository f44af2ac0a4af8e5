//! Port abstraction for user account persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ClubId, Role, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Username already taken, ignoring case.
        DuplicateUsername { username: String } => "username already exists: {username}",
    }
}

/// User account storage.
///
/// Back-reference updates are set operations: adding a club twice or
/// removing an absent one succeeds without change, and updates addressed to
/// a missing account are no-ops.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch an account by case-folded username key.
    async fn find_by_username(
        &self,
        username_key: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Store the failed-login counter and lock expiry.
    async fn update_login_state(
        &self,
        id: &UserId,
        failed_login_attempts: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), UserPersistenceError>;

    /// Change an account's role.
    async fn set_role(&self, id: &UserId, role: Role) -> Result<(), UserPersistenceError>;

    /// Add `club` to the user's joined clubs.
    async fn add_joined_club(&self, id: &UserId, club: &ClubId)
    -> Result<(), UserPersistenceError>;

    /// Remove `club` from the user's joined clubs.
    async fn remove_joined_club(
        &self,
        id: &UserId,
        club: &ClubId,
    ) -> Result<(), UserPersistenceError>;
}
