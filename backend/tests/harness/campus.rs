//! In-memory campus services shared by the behaviour suites.
//!
//! Every service runs over one [`MemoryStore`] so that membership, ballot
//! and profile changes are visible across ports, exactly as in a server
//! started without a database URL.

use std::future::Future;
use std::sync::Arc;

use campus::domain::ports::{UserProfileQuery, UserRegistrationCommand};
use campus::domain::{
    AccountService, Actor, AdminCredentials, AdminProvisioner, ClubService, ElectionService,
    Error, MembershipService, ProvisionOutcome, Registration,
};
use campus::outbound::argon2_hasher::Argon2Hasher;
use campus::outbound::memory::MemoryStore;
use mockable::{Clock, DefaultClock};
use tokio::runtime::Runtime;

pub const ADMIN_USERNAME: &str = "registrar";
pub const ADMIN_PASSWORD: &str = "registrar-secret";
pub const STUDENT_PASSWORD: &str = "student-secret";

pub type Accounts = AccountService<MemoryStore, Argon2Hasher>;
pub type Clubs = ClubService<MemoryStore>;
pub type Memberships = MembershipService<MemoryStore, MemoryStore>;
pub type Elections = ElectionService<MemoryStore, MemoryStore>;

/// Services wired over a fresh store plus the runtime that drives them.
pub struct Campus {
    runtime: Runtime,
    store: Arc<MemoryStore>,
    hasher: Arc<Argon2Hasher>,
    clock: Arc<dyn Clock>,
    pub accounts: Accounts,
    pub clubs: Clubs,
    pub memberships: Memberships,
    pub elections: Elections,
}

impl Campus {
    pub fn new() -> Self {
        let runtime = Runtime::new().unwrap_or_else(|err| panic!("tokio runtime: {err}"));
        let store = Arc::new(MemoryStore::new());
        // Minimum Argon2 cost keeps the suites fast.
        let hasher = Arc::new(
            Argon2Hasher::with_cost(8, 1, 1).unwrap_or_else(|err| panic!("hasher: {err}")),
        );
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        Self {
            accounts: AccountService::new(store.clone(), hasher.clone(), clock.clone()),
            clubs: ClubService::new(store.clone(), clock.clone()),
            memberships: MembershipService::new(store.clone(), store.clone(), clock.clone()),
            elections: ElectionService::new(store.clone(), store.clone(), clock.clone()),
            runtime,
            store,
            hasher,
            clock,
        }
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn provision_admin(&self) -> Result<ProvisionOutcome, Error> {
        let credentials = AdminCredentials::try_new(ADMIN_USERNAME, ADMIN_PASSWORD)
            .unwrap_or_else(|err| panic!("admin credentials: {err}"));
        let provisioner =
            AdminProvisioner::new(self.store.clone(), self.hasher.clone(), self.clock.clone());
        self.block_on(provisioner.ensure(&credentials))
    }

    pub fn admin(&self) -> Actor {
        let outcome = self
            .provision_admin()
            .unwrap_or_else(|err| panic!("provision admin: {err}"));
        self.actor(&outcome.user_id())
    }

    pub fn register(&self, username: &str, password: &str) -> Actor {
        let registration =
            Registration::try_new(username, password, username, Some("Computing"), Some("2"))
                .unwrap_or_else(|err| panic!("registration for {username}: {err}"));
        let profile = self
            .block_on(self.accounts.register(registration))
            .unwrap_or_else(|err| panic!("register {username}: {err}"));
        self.actor(&profile.id)
    }

    pub fn student(&self, username: &str) -> Actor {
        self.register(username, STUDENT_PASSWORD)
    }

    pub fn actor(&self, user_id: &campus::domain::UserId) -> Actor {
        self.block_on(self.accounts.resolve_actor(user_id))
            .unwrap_or_else(|err| panic!("resolve actor {user_id}: {err}"))
    }
}

/// Wire form of an error code, as clients see it.
pub fn code_of(error: &Error) -> String {
    serde_json::to_value(error.code())
        .ok()
        .and_then(|value| value.as_str().map(str::to_owned))
        .unwrap_or_else(|| panic!("error code should serialise to a string"))
}
