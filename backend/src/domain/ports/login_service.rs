//! Password login.
//!
//! The login handler only needs a user id to put in the session; failed
//! attempt counting and lockout stay behind this port.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Checks credentials against stored accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for an unknown username or wrong password.
    /// - `Forbidden` while the account is locked after repeated failures.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
