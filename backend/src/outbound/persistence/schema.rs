//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Clubs and
//! elections are stored as JSONB documents guarded by a revision column;
//! users are fully columnar because their counters and sets are updated in
//! place.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        username -> Text,
        /// Lower-cased username; unique.
        username_key -> Text,
        display_name -> Text,
        role -> Text,
        department -> Nullable<Text>,
        year -> Nullable<Text>,
        password_hash -> Text,
        joined_clubs -> Array<Uuid>,
        voted_elections -> Array<Uuid>,
        failed_login_attempts -> Int4,
        locked_until -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Club documents with embedded memberships and leadership.
    clubs (id) {
        id -> Uuid,
        /// Case-folded club name; unique.
        name_key -> Text,
        /// Every user holding a membership record, for member lookups.
        member_ids -> Array<Uuid>,
        document -> Jsonb,
        revision -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Election documents with embedded candidates and counters.
    elections (id) {
        id -> Uuid,
        document -> Jsonb,
        revision -> Int4,
        start_date -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, clubs, elections);
