//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test as actix_test, web};

use crate::domain::ports::{MockUserProfileQuery, UserRepository};
use crate::domain::{
    AccountService, ClubService, ElectionService, MembershipService, Role, UserAccount,
};
use crate::inbound::http::state::{AccountPorts, CampusPorts, HttpState};
use crate::inbound::http::users::LoginRequest;
use crate::outbound::memory::MemoryStore;
use crate::test_support::{MutableClock, PlainHasher, account, fixed_now};

/// Password accepted for every account created by [`TestCampus::seed_user`].
pub const TEST_PASSWORD: &str = "secret-password";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the `session` cookie set by a response.
pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .unwrap_or_else(|| panic!("session cookie set"))
        .into_owned()
}

/// Memory-backed services wired into an [`HttpState`].
pub struct TestCampus {
    pub state: HttpState,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<MutableClock>,
}

impl TestCampus {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MutableClock::new(fixed_now()));
        let accounts = Arc::new(AccountService::new(
            store.clone(),
            Arc::new(PlainHasher),
            clock.clone(),
        ));
        let clubs = Arc::new(ClubService::new(store.clone(), clock.clone()));
        let memberships = Arc::new(MembershipService::new(
            store.clone(),
            store.clone(),
            clock.clone(),
        ));
        let elections = Arc::new(ElectionService::new(
            store.clone(),
            store.clone(),
            clock.clone(),
        ));
        let state = HttpState::new(
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
        );
        Self {
            state,
            store,
            clock,
        }
    }

    /// Insert an account whose password is [`TEST_PASSWORD`].
    pub async fn seed_user(&self, username: &str, role: Role) -> UserAccount {
        let user = account(username, role);
        UserRepository::insert(self.store.as_ref(), &user)
            .await
            .unwrap_or_else(|err| panic!("seed {username}: {err}"));
        user
    }

    /// Application exposing every API handler under `/api/v1`.
    pub fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .wrap(test_session_middleware())
            .service(web::scope("/api/v1").configure(super::configure_api))
    }
}

/// State whose profile port is a mock; every other port is memory-backed.
pub fn state_with_profile(profile: MockUserProfileQuery) -> HttpState {
    let mut state = TestCampus::new().state;
    state.profile = Arc::new(profile);
    state
}

/// Log in through `POST /api/v1/login` and return the session cookie.
pub async fn login_cookie<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(&LoginRequest {
            username: username.to_owned(),
            password: TEST_PASSWORD.to_owned(),
        })
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(
        response.status().is_success(),
        "login for {username} failed with {}",
        response.status()
    );
    session_cookie(&response)
}

/// Send a request with an optional session cookie and JSON body and return
/// the status with the decoded body (`Value::Null` when empty).
pub async fn send<S>(
    app: &S,
    request: actix_test::TestRequest,
    cookie: Option<&Cookie<'static>>,
    body: Option<serde_json::Value>,
) -> (actix_web::http::StatusCode, serde_json::Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut request = request;
    if let Some(cookie) = cookie {
        request = request.cookie(cookie.clone());
    }
    if let Some(body) = body {
        request = request.set_json(body);
    }
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|err| panic!("JSON body: {err}"))
    };
    (status, value)
}

/// Create a club as `admin` and activate it, returning its id.
pub async fn active_club<S>(app: &S, admin: &Cookie<'static>, name: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, club) = send(
        app,
        actix_test::TestRequest::post().uri("/api/v1/clubs"),
        Some(admin),
        Some(serde_json::json!({
            "name": name,
            "description": "Weekly meetings",
            "category": "academic",
        })),
    )
    .await;
    assert_eq!(status, actix_web::http::StatusCode::CREATED, "{club}");
    let id = club["id"]
        .as_str()
        .unwrap_or_else(|| panic!("club id in {club}"))
        .to_owned();
    let (status, _) = send(
        app,
        actix_test::TestRequest::put().uri(&format!("/api/v1/clubs/{id}/status")),
        Some(admin),
        Some(serde_json::json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, actix_web::http::StatusCode::OK);
    id
}

/// Submit a join request as the cookie's user, returning the membership id.
pub async fn join<S>(app: &S, member: &Cookie<'static>, club_id: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, receipt) = send(
        app,
        actix_test::TestRequest::post().uri(&format!("/api/v1/clubs/{club_id}/join")),
        Some(member),
        Some(serde_json::json!({
            "fullName": "Grace Hopper",
            "department": "Computing",
            "year": "2",
        })),
    )
    .await;
    assert_eq!(status, actix_web::http::StatusCode::OK, "{receipt}");
    receipt["membershipId"]
        .as_str()
        .unwrap_or_else(|| panic!("membership id in {receipt}"))
        .to_owned()
}
