//! Driving port for self-service account registration.

use async_trait::async_trait;

use crate::domain::{Error, Registration};

use super::UserProfile;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRegistrationCommand: Send + Sync {
    /// Create a student account.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the username is taken, ignoring case.
    async fn register(&self, registration: Registration) -> Result<UserProfile, Error>;
}
