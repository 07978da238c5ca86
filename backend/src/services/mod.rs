//! HTTP API.
//!
//! Every resource lives in its own sub-module with a `configure_routes()`
//! returning an Actix `Scope`. Handlers follow one pattern: a public
//! `process` function that calls an inner function returning
//! `Result<_, GatewayError>` and turns the outcome into a response with
//! [`error_response`].

pub mod auth;
pub mod favourites;
pub mod guides;
pub mod images;
pub mod properties;
pub mod sections;
pub mod storage;

use actix_web::{web, HttpRequest, HttpResponse};
use common::error::GatewayError;
use common::session::Session;
use rusqlite::Connection;

use crate::config::Config;
use crate::db;
use crate::sessions::{bearer_token, SessionState};

/// Registers every API scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::configure_routes())
        .service(properties::configure_routes())
        .service(sections::configure_routes())
        .service(images::configure_routes())
        .service(favourites::configure_routes())
        .service(guides::configure_routes())
        .service(storage::configure_routes());
}

/// Maps a gateway error to a status code. The body is the bare message so
/// the client can rebuild the same variant from status and text.
pub(crate) fn error_response(err: &GatewayError) -> HttpResponse {
    let body = match err {
        GatewayError::NotFound(msg) | GatewayError::Conflict(msg) | GatewayError::Backend(msg) => {
            msg.clone()
        }
        GatewayError::Unauthorized | GatewayError::NotConfigured => err.to_string(),
    };
    match err {
        GatewayError::NotFound(_) => HttpResponse::NotFound(),
        GatewayError::Unauthorized => HttpResponse::Unauthorized(),
        GatewayError::Conflict(_) => HttpResponse::Conflict(),
        GatewayError::NotConfigured | GatewayError::Backend(_) => {
            HttpResponse::ServiceUnavailable()
        }
    }
    .content_type("text/plain; charset=utf-8")
    .body(body)
}

pub(crate) async fn current_session(req: &HttpRequest, sessions: &SessionState) -> Option<Session> {
    let token = bearer_token(req)?;
    sessions.lookup(&token).await
}

pub(crate) async fn require_session(
    req: &HttpRequest,
    sessions: &SessionState,
) -> Result<Session, GatewayError> {
    current_session(req, sessions)
        .await
        .ok_or(GatewayError::Unauthorized)
}

pub(crate) fn connect(config: &Config) -> Result<Connection, GatewayError> {
    db::open(&config.db_path).map_err(db::gateway::db_error)
}

#[cfg(test)]
pub(crate) mod testing {
    use actix_web::body::MessageBody;
    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::{test, web, App, Error};
    use tempfile::TempDir;

    use crate::config::{Config, HostAccount};
    use crate::db;
    use crate::sessions::SessionState;
    use crate::storage::LocalStorage;

    pub const EMAIL: &str = "host@example.com";
    pub const PASSWORD: &str = "secret";

    /// A config pointing at a fresh database inside `dir`.
    pub fn config(dir: &TempDir) -> Config {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 0,
            db_path: dir.path().join("test.sqlite"),
            upload_dir: dir.path().join("uploads"),
            hosts: vec![HostAccount {
                email: EMAIL.into(),
                password: PASSWORD.into(),
            }],
            open_browser: false,
        };
        db::init(&config.db_path).unwrap();
        std::fs::create_dir_all(&config.upload_dir).unwrap();
        config
    }

    pub fn app(
        config: &Config,
        sessions: &SessionState,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = Error,
            InitError = (),
        >,
    > {
        let storage = LocalStorage::new(config.upload_dir.clone()).unwrap();
        let files = storage.files_service();
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .app_data(web::Data::new(storage))
            .configure(super::configure)
            .service(files)
    }

    pub async fn sign_in(sessions: &SessionState) -> String {
        sessions.login(EMAIL, PASSWORD).await.unwrap().token
    }

    pub fn bearer(token: &str) -> (String, String) {
        ("Authorization".to_string(), format!("Bearer {}", token))
    }

    pub use test::{call_service, init_service, read_body, read_body_json, TestRequest};
}
