//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod auth;
pub mod clubs;
pub mod elections;
pub mod error;
pub mod health;
pub mod memberships;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// The caller owns the scope prefix and the session middleware.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::my_memberships)
        .service(clubs::list_clubs)
        .service(clubs::create_club)
        .service(clubs::get_club)
        .service(clubs::update_club_status)
        .service(clubs::assign_leadership)
        .service(memberships::join_club)
        .service(memberships::approve_member)
        .service(memberships::reject_member)
        .service(memberships::leave_club)
        .service(memberships::list_join_requests)
        .service(elections::list_elections)
        .service(elections::create_election)
        .service(elections::get_election)
        .service(elections::update_election_status)
        .service(elections::cast_vote)
        .service(elections::announce_results)
        .service(elections::election_results);
}
