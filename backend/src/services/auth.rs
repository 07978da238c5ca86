//! # Auth Service
//!
//! Host sign-in against the accounts in `WELCOMETO_HOSTS`.
//!
//! *   **`POST /login`**: body `LoginRequest`; answers the new `Session`
//!     (its `token` goes into `Authorization: Bearer` on later calls).
//! *   **`GET /session`**: the session behind the bearer token, or `401`.
//! *   **`POST /logout`**: forgets the bearer token. Always `200`.

use actix_web::web::{get, post, scope};
use actix_web::{web, HttpRequest, HttpResponse, Responder, Scope};
use common::error::GatewayError;
use common::requests::LoginRequest;

use super::{current_session, error_response};
use crate::sessions::{bearer_token, LoginError, SessionState};

const API_PATH: &str = "/api/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/login", post().to(login))
        .route("/session", get().to(session))
        .route("/logout", post().to(logout))
}

pub async fn login(
    sessions: web::Data<SessionState>,
    payload: web::Json<LoginRequest>,
) -> impl Responder {
    match sessions.login(&payload.email, &payload.password).await {
        Ok(session) => HttpResponse::Ok().json(session),
        Err(e @ LoginError::NoHosts) => HttpResponse::ServiceUnavailable().body(e.to_string()),
        Err(e @ LoginError::InvalidCredentials) => {
            HttpResponse::Unauthorized().body(e.to_string())
        }
    }
}

pub async fn session(req: HttpRequest, sessions: web::Data<SessionState>) -> impl Responder {
    match current_session(&req, &sessions).await {
        Some(session) => HttpResponse::Ok().json(session),
        None => error_response(&GatewayError::Unauthorized),
    }
}

pub async fn logout(req: HttpRequest, sessions: web::Data<SessionState>) -> impl Responder {
    if let Some(token) = bearer_token(&req) {
        sessions.logout(&token).await;
    }
    HttpResponse::Ok().finish()
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use common::session::Session;
    use tempfile::TempDir;

    use crate::services::testing::*;
    use crate::sessions::SessionState;

    #[actix_web::test]
    async fn login_session_logout() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let sessions = SessionState::new(config.hosts.clone());
        let app = init_service(app(&config, &sessions)).await;

        let req = TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({ "email": EMAIL, "password": PASSWORD }))
            .to_request();
        let session: Session = read_body_json(call_service(&app, req).await).await;
        assert_eq!(session.email, EMAIL);

        let req = TestRequest::get()
            .uri("/api/auth/session")
            .insert_header(bearer(&session.token))
            .to_request();
        let restored: Session = read_body_json(call_service(&app, req).await).await;
        assert_eq!(restored, session);

        let req = TestRequest::post()
            .uri("/api/auth/logout")
            .insert_header(bearer(&session.token))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

        let req = TestRequest::get()
            .uri("/api/auth/session")
            .insert_header(bearer(&session.token))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let sessions = SessionState::new(config.hosts.clone());
        let app = init_service(app(&config, &sessions)).await;

        let req = TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({ "email": EMAIL, "password": "nope" }))
            .to_request();
        let response = call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(read_body(response).await, "invalid email or password".as_bytes());
    }
}
