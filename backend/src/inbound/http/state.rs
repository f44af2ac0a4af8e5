//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ClubCommand, ClubQuery, ElectionCommand, ElectionQuery, LoginService, MembershipCommand,
    MembershipQuery, UserProfileQuery, UserRegistrationCommand,
};

/// Parameter object bundling the account port implementations.
#[derive(Clone)]
pub struct AccountPorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn UserRegistrationCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
}

/// Parameter object bundling the club, membership and election ports.
#[derive(Clone)]
pub struct CampusPorts {
    pub clubs: Arc<dyn ClubCommand>,
    pub clubs_query: Arc<dyn ClubQuery>,
    pub memberships: Arc<dyn MembershipCommand>,
    pub memberships_query: Arc<dyn MembershipQuery>,
    pub elections: Arc<dyn ElectionCommand>,
    pub elections_query: Arc<dyn ElectionQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn UserRegistrationCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub clubs: Arc<dyn ClubCommand>,
    pub clubs_query: Arc<dyn ClubQuery>,
    pub memberships: Arc<dyn MembershipCommand>,
    pub memberships_query: Arc<dyn MembershipQuery>,
    pub elections: Arc<dyn ElectionCommand>,
    pub elections_query: Arc<dyn ElectionQuery>,
}

impl HttpState {
    /// Construct state from the account and campus port bundles.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use campus::domain::{AccountService, ClubService, ElectionService, MembershipService};
    /// use campus::inbound::http::state::{AccountPorts, CampusPorts, HttpState};
    /// use campus::outbound::argon2_hasher::Argon2Hasher;
    /// use campus::outbound::memory::MemoryStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// let clock: Arc<dyn mockable::Clock> = Arc::new(DefaultClock);
    /// let hasher = Arc::new(Argon2Hasher::new().expect("argon2 parameters"));
    /// let accounts = Arc::new(AccountService::new(store.clone(), hasher, clock.clone()));
    /// let clubs = Arc::new(ClubService::new(store.clone(), clock.clone()));
    /// let memberships = Arc::new(MembershipService::new(store.clone(), store.clone(), clock.clone()));
    /// let elections = Arc::new(ElectionService::new(store.clone(), store, clock));
    ///
    /// let state = HttpState::new(
    ///     AccountPorts {
    ///         login: accounts.clone(),
    ///         registration: accounts.clone(),
    ///         profile: accounts,
    ///     },
    ///     CampusPorts {
    ///         clubs: clubs.clone(),
    ///         clubs_query: clubs,
    ///         memberships: memberships.clone(),
    ///         memberships_query: memberships,
    ///         elections: elections.clone(),
    ///         elections_query: elections,
    ///     },
    /// );
    /// let _login = state.login.clone();
    /// ```
    pub fn new(accounts: AccountPorts, campus: CampusPorts) -> Self {
        let AccountPorts {
            login,
            registration,
            profile,
        } = accounts;
        let CampusPorts {
            clubs,
            clubs_query,
            memberships,
            memberships_query,
            elections,
            elections_query,
        } = campus;
        Self {
            login,
            registration,
            profile,
            clubs,
            clubs_query,
            memberships,
            memberships_query,
            elections,
            elections_query,
        }
    }
}
