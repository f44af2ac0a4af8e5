//! Builders wiring driven adapters into services and HTTP state.
//!
//! The same services run over either the in-memory store or the Diesel
//! adapters; only the concrete driven port types differ.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use campus::domain::ports::{BallotBox, ClubRepository, ElectionRepository, UserRepository};
use campus::domain::{
    AccountService, AdminCredentials, AdminProvisioner, ClubService, ElectionService,
    MembershipService, ProvisionOutcome,
};
use campus::inbound::http::state::{AccountPorts, CampusPorts, HttpState};
use campus::outbound::argon2_hasher::Argon2Hasher;
use campus::outbound::memory::MemoryStore;
use campus::outbound::persistence::{
    DbPool, DieselBallotBox, DieselClubRepository, DieselElectionRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Driven adapters shared by every service.
struct Stores<U, C, E, B> {
    users: Arc<U>,
    clubs: Arc<C>,
    elections: Arc<E>,
    ballots: Arc<B>,
}

impl Stores<MemoryStore, MemoryStore, MemoryStore, MemoryStore> {
    fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            clubs: store.clone(),
            elections: store.clone(),
            ballots: store,
        }
    }
}

impl Stores<DieselUserRepository, DieselClubRepository, DieselElectionRepository, DieselBallotBox> {
    fn diesel(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            clubs: Arc::new(DieselClubRepository::new(pool.clone())),
            elections: Arc::new(DieselElectionRepository::new(pool.clone())),
            ballots: Arc::new(DieselBallotBox::new(pool.clone())),
        }
    }
}

impl<U, C, E, B> Stores<U, C, E, B>
where
    U: UserRepository + 'static,
    C: ClubRepository + 'static,
    E: ElectionRepository + 'static,
    B: BallotBox + 'static,
{
    async fn provision(
        &self,
        hasher: &Arc<Argon2Hasher>,
        clock: &Arc<dyn Clock>,
        admin: Option<&AdminCredentials>,
    ) -> std::io::Result<()> {
        let Some(admin) = admin else {
            return Ok(());
        };
        let provisioner = AdminProvisioner::new(self.users.clone(), hasher.clone(), clock.clone());
        let outcome = provisioner
            .ensure(admin)
            .await
            .map_err(|err| std::io::Error::other(format!("admin provisioning failed: {err}")))?;
        match outcome {
            ProvisionOutcome::Created(id) => info!(user_id = %id, "admin account created"),
            ProvisionOutcome::Promoted(id) => info!(user_id = %id, "admin role granted"),
            ProvisionOutcome::Unchanged(id) => info!(user_id = %id, "admin account present"),
        }
        Ok(())
    }

    fn http_state(&self, hasher: Arc<Argon2Hasher>, clock: Arc<dyn Clock>) -> HttpState {
        let accounts = Arc::new(AccountService::new(
            self.users.clone(),
            hasher,
            clock.clone(),
        ));
        let clubs = Arc::new(ClubService::new(self.clubs.clone(), clock.clone()));
        let memberships = Arc::new(MembershipService::new(
            self.clubs.clone(),
            self.users.clone(),
            clock.clone(),
        ));
        let elections = Arc::new(ElectionService::new(
            self.elections.clone(),
            self.ballots.clone(),
            clock,
        ));
        HttpState::new(
            AccountPorts {
                login: accounts.clone(),
                registration: accounts.clone(),
                profile: accounts,
            },
            CampusPorts {
                clubs: clubs.clone(),
                clubs_query: clubs,
                memberships: memberships.clone(),
                memberships_query: memberships,
                elections: elections.clone(),
                elections_query: elections,
            },
        )
    }

    async fn build(
        self,
        config: &ServerConfig,
        clock: Arc<dyn Clock>,
    ) -> std::io::Result<HttpState> {
        let hasher = Arc::new(
            Argon2Hasher::new().map_err(|err| std::io::Error::other(err.to_string()))?,
        );
        self.provision(&hasher, &clock, config.admin.as_ref()).await?;
        Ok(self.http_state(hasher, clock))
    }
}

/// Build the shared HTTP state, provisioning the admin account first.
///
/// # Errors
///
/// Fails when the password hasher cannot be configured or provisioning
/// cannot reach the store.
pub(super) async fn build_http_state(
    config: &ServerConfig,
) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let state = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL persistence");
            Stores::diesel(pool).build(config, clock).await?
        }
        None => {
            info!("no database configured; using in-memory store");
            Stores::memory().build(config, clock).await?
        }
    };
    Ok(web::Data::new(state))
}
