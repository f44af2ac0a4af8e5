//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Accounts are columnar. The `joined_clubs` set is maintained with
//! `array_append`/`array_remove` statements so concurrent membership
//! decisions never overwrite each other.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Uuid as SqlUuid;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    ClubId, DisplayName, ElectionId, PasswordHash, Role, UserAccount, UserId, Username,
};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, classify_pool_error};
use super::models::{LoginStateUpdate, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const ADD_JOINED_CLUB_SQL: &str = "UPDATE users \
    SET joined_clubs = array_append(joined_clubs, $2) \
    WHERE id = $1 AND NOT ($2 = ANY(joined_clubs))";

const REMOVE_JOINED_CLUB_SQL: &str = "UPDATE users \
    SET joined_clubs = array_remove(joined_clubs, $2) \
    WHERE id = $1";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DieselFailure, username: Option<&Username>) -> UserPersistenceError {
    match failure {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::UniqueViolation(_) => match username {
            Some(name) => UserPersistenceError::duplicate_username(name.to_string()),
            None => UserPersistenceError::query("unexpected unique violation"),
        },
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_failure(classify_pool_error(error), None)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_failure(classify_diesel_error(error), None)
}

fn attempts_to_db(attempts: u32) -> i32 {
    i32::try_from(attempts).unwrap_or(i32::MAX)
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let corrupt = |field: &str, err: &dyn std::fmt::Display| {
        UserPersistenceError::query(format!("invalid {field} in database: {err}"))
    };
    let username = Username::new(&row.username).map_err(|err| corrupt("username", &err))?;
    let display_name =
        DisplayName::new(row.display_name).map_err(|err| corrupt("display name", &err))?;
    let role = Role::from_str(&row.role).map_err(|err| corrupt("role", &err))?;
    let failed_login_attempts = u32::try_from(row.failed_login_attempts)
        .map_err(|err| corrupt("failed login count", &err))?;

    Ok(UserAccount {
        id: UserId::from_uuid(row.id),
        username,
        display_name,
        role,
        department: row.department,
        year: row.year,
        password_hash: PasswordHash::new(row.password_hash),
        joined_clubs: row.joined_clubs.into_iter().map(ClubId::from_uuid).collect(),
        voted_elections: row
            .voted_elections
            .into_iter()
            .map(ElectionId::from_uuid)
            .collect(),
        failed_login_attempts,
        locked_until: row.locked_until,
        created_at: row.created_at,
    })
}

fn account_to_row(account: &UserAccount) -> NewUserRow<'_> {
    NewUserRow {
        id: *account.id.as_uuid(),
        username: account.username.as_ref(),
        username_key: account.username.key(),
        display_name: account.display_name.as_ref(),
        role: account.role.as_str(),
        department: account.department.as_deref(),
        year: account.year.as_deref(),
        password_hash: account.password_hash.as_str(),
        joined_clubs: account.joined_clubs.iter().map(|id| *id.as_uuid()).collect(),
        voted_elections: account
            .voted_elections
            .iter()
            .map(|id| *id.as_uuid())
            .collect(),
        failed_login_attempts: attempts_to_db(account.failed_login_attempts),
        locked_until: account.locked_until,
        created_at: account.created_at,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&account_to_row(account))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_failure(classify_diesel_error(err), Some(&account.username)))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn find_by_username(
        &self,
        username_key: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username_key.eq(username_key))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn update_login_state(
        &self,
        id: &UserId,
        failed_login_attempts: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(&LoginStateUpdate {
                failed_login_attempts: attempts_to_db(failed_login_attempts),
                locked_until,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn set_role(&self, id: &UserId, role: Role) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::role.eq(role.as_str()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn add_joined_club(
        &self,
        id: &UserId,
        club: &ClubId,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sql_query(ADD_JOINED_CLUB_SQL)
            .bind::<SqlUuid, _>(*id.as_uuid())
            .bind::<SqlUuid, _>(*club.as_uuid())
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn remove_joined_club(
        &self,
        id: &UserId,
        club: &ClubId,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sql_query(REMOVE_JOINED_CLUB_SQL)
            .bind::<SqlUuid, _>(*id.as_uuid())
            .bind::<SqlUuid, _>(*club.as_uuid())
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row mapping and error translation.
    use super::*;
    use crate::test_support::account;
    use rstest::rstest;

    fn stored(account: &UserAccount) -> UserRow {
        let row = account_to_row(account);
        UserRow {
            id: row.id,
            username: row.username.to_owned(),
            username_key: row.username_key,
            display_name: row.display_name.to_owned(),
            role: row.role.to_owned(),
            department: row.department.map(str::to_owned),
            year: row.year.map(str::to_owned),
            password_hash: row.password_hash.to_owned(),
            joined_clubs: row.joined_clubs,
            voted_elections: row.voted_elections,
            failed_login_attempts: row.failed_login_attempts,
            locked_until: row.locked_until,
            created_at: row.created_at,
        }
    }

    #[rstest]
    fn accounts_survive_the_row_mapping() {
        let mut original = account("Ada.Lovelace", Role::Admin);
        original.joined_clubs.insert(ClubId::random());
        original.voted_elections.insert(ElectionId::random());
        original.failed_login_attempts = 2;

        let row = account_to_row(&original);
        assert_eq!(row.username_key, "ada.lovelace");
        assert_eq!(row.role, "admin");

        let decoded = row_to_account(stored(&original)).expect("decode");
        assert_eq!(decoded, original);
    }

    #[rstest]
    fn unknown_roles_are_corruption() {
        let mut row = stored(&account("ada", Role::Student));
        row.role = "superuser".to_owned();
        let err = row_to_account(row).expect_err("corrupt");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
        assert!(err.to_string().contains("invalid role"));
    }

    #[rstest]
    fn negative_counters_are_corruption() {
        let mut row = stored(&account("ada", Role::Student));
        row.failed_login_attempts = -1;
        assert!(row_to_account(row).is_err());
    }

    #[rstest]
    fn unique_violations_name_the_username() {
        let user = account("ada", Role::Student);
        let err = map_failure(
            DieselFailure::UniqueViolation(Some("users_username_key_unique".to_owned())),
            Some(&user.username),
        );
        assert_eq!(err, UserPersistenceError::duplicate_username("ada"));
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, UserPersistenceError::Connection { .. }));
    }
}
