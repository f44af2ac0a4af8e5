//! Idempotent administrator bootstrap.
//!
//! Runs before the server binds (and from the `provision-admin` binary).
//! Ensures one account with the configured username holds the admin role.

use std::collections::BTreeSet;
use std::sync::Arc;

use mockable::Clock;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHasher, UserPersistenceError, UserRepository};
use crate::domain::service_support::{map_hasher_error, map_user_error};
use crate::domain::{
    DisplayName, Error, PASSWORD_MIN, RegistrationValidationError, Role, UserAccount, UserId,
    Username,
};

const ADMIN_DISPLAY_NAME: &str = "Administrator";

/// Validated provisioning credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    username: Username,
    password: Zeroizing<String>,
}

impl AdminCredentials {
    /// Validate a username and password using the registration rules.
    pub fn try_new(username: &str, password: &str) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Configured admin username.
    pub fn username(&self) -> &Username {
        &self.username
    }
}

/// What provisioning changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A new admin account was created.
    Created(UserId),
    /// An existing account was promoted; its password is unchanged.
    Promoted(UserId),
    /// The account was already an admin.
    Unchanged(UserId),
}

impl ProvisionOutcome {
    /// Account the outcome refers to.
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Created(id) | Self::Promoted(id) | Self::Unchanged(id) => *id,
        }
    }
}

/// Ensures the configured admin account exists.
pub struct AdminProvisioner<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, H> AdminProvisioner<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    /// Create a provisioner writing through `users`.
    pub fn new(users: Arc<U>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }

    /// Create or promote the admin account. Safe to run repeatedly.
    pub async fn ensure(&self, credentials: &AdminCredentials) -> Result<ProvisionOutcome, Error> {
        if let Some(existing) = self.find(credentials).await? {
            return self.promote(existing).await;
        }

        let account = self.build_account(credentials).await?;
        match self.users.insert(&account).await {
            Ok(()) => {
                info!(user_id = %account.id, username = %account.username, "created admin account");
                Ok(ProvisionOutcome::Created(account.id))
            }
            // Lost a race with another provisioner; promote whatever won.
            Err(UserPersistenceError::DuplicateUsername { .. }) => {
                let existing = self.find(credentials).await?.ok_or_else(|| {
                    Error::internal("admin account vanished during provisioning")
                })?;
                self.promote(existing).await
            }
            Err(err) => Err(map_user_error(err)),
        }
    }

    async fn find(&self, credentials: &AdminCredentials) -> Result<Option<UserAccount>, Error> {
        self.users
            .find_by_username(&credentials.username.key())
            .await
            .map_err(map_user_error)
    }

    async fn promote(&self, account: UserAccount) -> Result<ProvisionOutcome, Error> {
        if account.role == Role::Admin {
            return Ok(ProvisionOutcome::Unchanged(account.id));
        }
        self.users
            .set_role(&account.id, Role::Admin)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %account.id, "promoted existing account to admin");
        Ok(ProvisionOutcome::Promoted(account.id))
    }

    async fn build_account(&self, credentials: &AdminCredentials) -> Result<UserAccount, Error> {
        let password_hash = self
            .hasher
            .hash(credentials.password.as_str())
            .await
            .map_err(map_hasher_error)?;
        let display_name = DisplayName::new(ADMIN_DISPLAY_NAME)
            .map_err(|err| Error::internal(format!("invalid admin display name: {err}")))?;
        Ok(UserAccount {
            id: UserId::random(),
            username: credentials.username.clone(),
            display_name,
            role: Role::Admin,
            department: None,
            year: None,
            password_hash,
            joined_clubs: BTreeSet::new(),
            voted_elections: BTreeSet::new(),
            failed_login_attempts: 0,
            locked_until: None,
            created_at: self.clock.utc(),
        })
    }
}
