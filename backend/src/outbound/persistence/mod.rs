//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven persistence ports, backed by
//! PostgreSQL through `diesel-async` and a `bb8` pool.
//!
//! - **Documents with revisions**: clubs and elections are JSONB documents;
//!   every update is a compare-and-swap on the `revision` column.
//! - **Set updates in SQL**: user back-references use `array_append` and
//!   `array_remove` so they never race with each other.
//! - **Atomic ballots**: the ballot box locks the election and voter rows in
//!   one transaction.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//!
//! # Example
//!
//! ```no_run
//! use campus::outbound::persistence::{DbPool, DieselClubRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/campus")).await?;
//! let clubs = DieselClubRepository::new(pool);
//! # let _ = clubs;
//! # Ok(())
//! # }
//! ```

mod diesel_ballot_box;
mod diesel_club_repository;
mod diesel_election_repository;
mod diesel_helpers;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_ballot_box::DieselBallotBox;
pub use diesel_club_repository::DieselClubRepository;
pub use diesel_election_repository::DieselElectionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
