//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, `LoginService`) are implemented by
//! domain services and called by inbound adapters. Driven ports
//! (`*Repository`, `BallotBox`, `PasswordHasher`) are implemented by
//! outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod ballot_box;
mod club_command;
mod club_query;
mod club_repository;
mod election_command;
mod election_query;
mod election_repository;
mod login_service;
mod membership_command;
mod membership_query;
mod password_hasher;
mod user_profile_query;
mod user_registration_command;
mod user_repository;

#[cfg(test)]
pub use ballot_box::MockBallotBox;
pub use ballot_box::{Ballot, BallotBox, BallotBoxError};
#[cfg(test)]
pub use club_command::MockClubCommand;
pub use club_command::{ClubCommand, NewClub};
#[cfg(test)]
pub use club_query::MockClubQuery;
pub use club_query::ClubQuery;
#[cfg(test)]
pub use club_repository::MockClubRepository;
pub use club_repository::{ClubRepository, ClubRepositoryError};
#[cfg(test)]
pub use election_command::MockElectionCommand;
pub use election_command::{ElectionCommand, VoteReceipt};
#[cfg(test)]
pub use election_query::MockElectionQuery;
pub use election_query::ElectionQuery;
#[cfg(test)]
pub use election_repository::MockElectionRepository;
pub use election_repository::{ElectionRepository, ElectionRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use membership_command::MockMembershipCommand;
pub use membership_command::{JoinReceipt, MembershipCommand};
#[cfg(test)]
pub use membership_query::MockMembershipQuery;
pub use membership_query::{MembershipQuery, MembershipSummary};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::{UserProfile, UserProfileQuery};
#[cfg(test)]
pub use user_registration_command::MockUserRegistrationCommand;
pub use user_registration_command::UserRegistrationCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
