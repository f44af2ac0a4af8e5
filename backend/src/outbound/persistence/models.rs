//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{clubs, elections, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    #[expect(dead_code, reason = "derived from username; only written")]
    pub username_key: String,
    pub display_name: String,
    pub role: String,
    pub department: Option<String>,
    pub year: Option<String>,
    pub password_hash: String,
    pub joined_clubs: Vec<Uuid>,
    pub voted_elections: Vec<Uuid>,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub username_key: String,
    pub display_name: &'a str,
    pub role: &'a str,
    pub department: Option<&'a str>,
    pub year: Option<&'a str>,
    pub password_hash: &'a str,
    pub joined_clubs: Vec<Uuid>,
    pub voted_elections: Vec<Uuid>,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Changeset for the lockout counters.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct LoginStateUpdate {
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

/// Row struct for reading club documents.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = clubs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClubRow {
    pub id: Uuid,
    pub document: serde_json::Value,
    pub revision: i32,
}

/// Insertable and updatable form of a club document.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = clubs)]
pub(crate) struct ClubDocumentRow {
    pub id: Uuid,
    pub name_key: String,
    pub member_ids: Vec<Uuid>,
    pub document: serde_json::Value,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading election documents.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = elections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ElectionRow {
    pub id: Uuid,
    pub document: serde_json::Value,
    pub revision: i32,
}

/// Insertable and updatable form of an election document.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = elections)]
pub(crate) struct ElectionDocumentRow {
    pub id: Uuid,
    pub document: serde_json::Value,
    pub revision: i32,
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
