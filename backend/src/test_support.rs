//! Test doubles shared by the unit tests in `src/`.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{
    DisplayName, MemberProfile, PasswordHash, Role, UserAccount, UserId, Username,
};

/// Clock whose time only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed start time used across service tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("fixed test time must be valid"))
}

/// Build an account with a placeholder hash.
pub fn account(username: &str, role: Role) -> UserAccount {
    UserAccount {
        id: UserId::random(),
        username: Username::new(username)
            .unwrap_or_else(|err| panic!("test username {username}: {err}")),
        display_name: DisplayName::new("Test User")
            .unwrap_or_else(|err| panic!("test display name: {err}")),
        role,
        department: Some("Computing".to_owned()),
        year: Some("2".to_owned()),
        password_hash: PasswordHash::new("hash:secret-password"),
        joined_clubs: BTreeSet::new(),
        voted_elections: BTreeSet::new(),
        failed_login_attempts: 0,
        locked_until: None,
        created_at: fixed_now(),
    }
}

/// Applicant snapshot accepted by every club.
pub fn profile(full_name: &str) -> MemberProfile {
    MemberProfile::try_new(full_name, "Computing", "2", "")
        .unwrap_or_else(|err| panic!("test profile: {err}"))
}

/// Reversible "hash" so tests can skip Argon2's cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        Ok(PasswordHash::new(format!("hash:{password}")))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hash.as_str().strip_prefix("hash:") == Some(password))
    }
}
