//! Account services: registration, login with lockout, profile reads and
//! session actor resolution.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    LoginService, PasswordHasher, UserProfile, UserProfileQuery, UserRegistrationCommand,
    UserRepository,
};
use crate::domain::service_support::{map_hasher_error, map_user_error};
use crate::domain::{
    Actor, Error, LockoutPolicy, LoginCredentials, Registration, Role, UserAccount, UserId,
};

/// Account service implementing the authentication and profile ports.
#[derive(Clone)]
pub struct AccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
    lockout: LockoutPolicy,
}

impl<U, H> AccountService<U, H> {
    /// Create a service with the default lockout policy.
    pub fn new(users: Arc<U>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
            lockout: LockoutPolicy::default(),
        }
    }

    /// Replace the lockout policy.
    pub fn with_lockout(mut self, lockout: LockoutPolicy) -> Self {
        self.lockout = lockout;
        self
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

fn unknown_session_user() -> Error {
    Error::unauthorized("session user no longer exists")
}

impl<U, H> AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn load(&self, user_id: &UserId) -> Result<UserAccount, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(unknown_session_user)
    }

    async fn store_login_state(&self, account: &UserAccount) -> Result<(), Error> {
        self.users
            .update_login_state(
                &account.id,
                account.failed_login_attempts,
                account.locked_until,
            )
            .await
            .map_err(map_user_error)
    }
}

#[async_trait]
impl<U, H> LoginService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let key = credentials.username().to_lowercase();
        let Some(mut account) = self
            .users
            .find_by_username(&key)
            .await
            .map_err(map_user_error)?
        else {
            return Err(invalid_credentials());
        };

        let now = self.clock.utc();
        if let Some(until) = account.locked_until.filter(|_| account.is_locked(now)) {
            return Err(Error::forbidden("account locked").with_details(json!({
                "code": "account_locked",
                "lockedUntil": until,
            })));
        }

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(map_hasher_error)?;
        if !matches {
            let locked = self.lockout.record_failure(&mut account, now);
            self.store_login_state(&account).await?;
            if locked {
                warn!(user_id = %account.id, "account locked after repeated login failures");
            }
            return Err(invalid_credentials());
        }

        if account.failed_login_attempts > 0 || account.locked_until.is_some() {
            self.lockout.record_success(&mut account);
            self.store_login_state(&account).await?;
        }
        Ok(account.id)
    }
}

#[async_trait]
impl<U, H> UserRegistrationCommand for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, registration: Registration) -> Result<UserProfile, Error> {
        let taken = self
            .users
            .find_by_username(&registration.username.key())
            .await
            .map_err(map_user_error)?
            .is_some();
        if taken {
            return Err(Error::conflict("Username already taken")
                .with_details(json!({ "field": "username", "code": "duplicate_username" })));
        }

        let password_hash = self
            .hasher
            .hash(registration.password.as_str())
            .await
            .map_err(map_hasher_error)?;
        let account = UserAccount {
            id: UserId::random(),
            username: registration.username,
            display_name: registration.display_name,
            role: Role::Student,
            department: registration.department,
            year: registration.year,
            password_hash,
            joined_clubs: BTreeSet::new(),
            voted_elections: BTreeSet::new(),
            failed_login_attempts: 0,
            locked_until: None,
            created_at: self.clock.utc(),
        };
        self.users.insert(&account).await.map_err(map_user_error)?;
        info!(user_id = %account.id, "registered account");
        Ok(account.into())
    }
}

#[async_trait]
impl<U, H> UserProfileQuery for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, Error> {
        self.load(user_id).await.map(UserProfile::from)
    }

    async fn resolve_actor(&self, user_id: &UserId) -> Result<Actor, Error> {
        self.load(user_id).await.map(|account| account.actor())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
