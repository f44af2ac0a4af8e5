//! Authentication primitives: login credentials, registration input and the
//! failed-login lockout policy.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use zeroize::Zeroizing;

use super::{DisplayName, UserAccount, UserValidationError, Username};

/// Minimum accepted password length for new accounts.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use campus::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("admin", "password").unwrap();
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Errors raised while validating a registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error(transparent)]
    User(#[from] UserValidationError),
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

impl RegistrationValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::User(
                UserValidationError::EmptyUsername
                | UserValidationError::UsernameLength { .. }
                | UserValidationError::UsernameInvalidCharacters,
            ) => "username",
            Self::User(UserValidationError::UnknownRole(_)) => "role",
            Self::User(_) => "displayName",
            Self::PasswordTooShort { .. } => "password",
        }
    }
}

/// Validated self-service registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: Username,
    pub password: Zeroizing<String>,
    pub display_name: DisplayName,
    pub department: Option<String>,
    pub year: Option<String>,
}

impl Registration {
    /// Validate raw registration fields.
    ///
    /// Blank optional fields are treated as absent.
    pub fn try_new(
        username: &str,
        password: &str,
        display_name: &str,
        department: Option<&str>,
        year: Option<&str>,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let display_name = DisplayName::new(display_name)?;
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
            display_name,
            department: non_blank(department),
            year: non_blank(year),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Failed-login lockout rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lock_duration: Duration::hours(2),
        }
    }
}

impl LockoutPolicy {
    /// Count a failed attempt, locking the account once the limit is reached.
    ///
    /// Returns `true` when this failure locked the account.
    pub fn record_failure(&self, account: &mut UserAccount, now: DateTime<Utc>) -> bool {
        if account.locked_until.is_some_and(|until| until <= now) {
            // An expired lock starts a fresh window.
            account.locked_until = None;
            account.failed_login_attempts = 0;
        }
        account.failed_login_attempts = account.failed_login_attempts.saturating_add(1);
        if account.failed_login_attempts >= self.max_attempts {
            account.locked_until = Some(now + self.lock_duration);
            return true;
        }
        false
    }

    /// Clear the failure counter after a successful login.
    pub fn record_success(&self, account: &mut UserAccount) {
        account.failed_login_attempts = 0;
        account.locked_until = None;
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{PasswordHash, Role, UserId};
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use std::collections::BTreeSet;

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid time")
    }

    #[fixture]
    fn account(now: DateTime<Utc>) -> UserAccount {
        UserAccount {
            id: UserId::random(),
            username: Username::new("grace").expect("valid username"),
            display_name: DisplayName::new("Grace Hopper").expect("valid display name"),
            role: Role::Student,
            department: None,
            year: None,
            password_hash: PasswordHash::new("hash"),
            joined_clubs: BTreeSet::new(),
            voted_elections: BTreeSet::new(),
            failed_login_attempts: 0,
            locked_until: None,
            created_at: now,
        }
    }

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn valid_credentials_trim_username() {
        let creds =
            LoginCredentials::try_from_parts("  admin  ", " secret ").expect("valid inputs");
        assert_eq!(creds.username(), "admin");
        assert_eq!(creds.password(), " secret ");
    }

    #[rstest]
    #[case("ab", "long enough", "Ada", "username")]
    #[case("ada", "short", "Ada", "password")]
    #[case("ada", "long enough", " ", "displayName")]
    fn registration_reports_offending_field(
        #[case] username: &str,
        #[case] password: &str,
        #[case] display_name: &str,
        #[case] field: &str,
    ) {
        let err = Registration::try_new(username, password, display_name, None, None)
            .expect_err("invalid registration");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn registration_drops_blank_optional_fields() {
        let registration =
            Registration::try_new("ada", "long enough", "Ada", Some("  "), Some(" 3 "))
                .expect("valid registration");
        assert_eq!(registration.department, None);
        assert_eq!(registration.year.as_deref(), Some("3"));
    }

    #[rstest]
    fn fifth_failure_locks_for_two_hours(mut account: UserAccount, now: DateTime<Utc>) {
        let policy = LockoutPolicy::default();
        for _ in 0..4 {
            assert!(!policy.record_failure(&mut account, now));
        }
        assert!(policy.record_failure(&mut account, now));
        assert_eq!(account.locked_until, Some(now + Duration::hours(2)));
        assert!(account.is_locked(now + Duration::minutes(119)));
    }

    #[rstest]
    fn failure_after_expiry_starts_new_window(mut account: UserAccount, now: DateTime<Utc>) {
        let policy = LockoutPolicy::default();
        account.failed_login_attempts = 5;
        account.locked_until = Some(now);
        assert!(!policy.record_failure(&mut account, now + Duration::minutes(1)));
        assert_eq!(account.failed_login_attempts, 1);
        assert!(account.locked_until.is_none());
    }

    #[rstest]
    fn success_resets_counter(mut account: UserAccount) {
        let policy = LockoutPolicy::default();
        account.failed_login_attempts = 3;
        policy.record_success(&mut account);
        assert_eq!(account.failed_login_attempts, 0);
    }
}
