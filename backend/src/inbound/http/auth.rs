//! Authentication helpers used by HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! session-to-actor resolution here.

use crate::domain::Actor;

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Resolve the session cookie into the calling [`Actor`].
///
/// A missing or tampered cookie, or one naming a deleted account, is
/// `401 Unauthorized`.
pub async fn current_actor(state: &HttpState, session: &SessionContext) -> ApiResult<Actor> {
    let user_id = session.require_user_id()?;
    state.profile.resolve_actor(&user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockUserProfileQuery;
    use crate::domain::{Error, ErrorCode, Role, UserId};
    use crate::inbound::http::test_utils::{session_cookie, state_with_profile};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    async fn call_whoami(profile: MockUserProfileQuery, logged_in: bool) -> (StatusCode, String) {
        let state = state_with_profile(profile);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/login",
                    web::get().to(|session: SessionContext| async move {
                        session.persist_user(&UserId::new(USER_ID).expect("fixture id"))?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/whoami",
                    web::get().to(
                        |state: web::Data<HttpState>, session: SessionContext| async move {
                            let actor = current_actor(&state, &session).await?;
                            Ok::<_, Error>(HttpResponse::Ok().body(actor.role.to_string()))
                        },
                    ),
                ),
        )
        .await;

        let mut request = test::TestRequest::get().uri("/whoami");
        if logged_in {
            let login =
                test::call_service(&app, test::TestRequest::get().uri("/login").to_request())
                    .await;
            request = request.cookie(session_cookie(&login));
        }
        let response = test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let body = test::read_body(response).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[rstest]
    #[actix_web::test]
    async fn resolves_the_session_user() {
        let mut profile = MockUserProfileQuery::new();
        profile
            .expect_resolve_actor()
            .withf(|id| id.to_string() == USER_ID)
            .times(1)
            .returning(|id| Ok(Actor::new(*id, Role::Admin)));

        let (status, body) = call_whoami(profile, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin");
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_requests_never_reach_the_profile_port() {
        let mut profile = MockUserProfileQuery::new();
        profile.expect_resolve_actor().never();

        let (status, _) = call_whoami(profile, false).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn deleted_accounts_are_unauthorised() {
        let mut profile = MockUserProfileQuery::new();
        profile
            .expect_resolve_actor()
            .returning(|_| Err(Error::unauthorized("session user no longer exists")));

        let (status, body) = call_whoami(profile, true).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let payload: Error = serde_json::from_str(&body).expect("error payload");
        assert_eq!(payload.code(), ErrorCode::Unauthorized);
    }
}
