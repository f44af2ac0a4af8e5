//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories and ballot box using Diesel
//! - **memory**: a process-local store for tests and database-less runs
//! - **argon2_hasher**: Argon2id password hashing
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod argon2_hasher;
pub mod memory;
pub mod persistence;
