//! # Property Service
//!
//! *   **`GET /`**: the signed-in host's properties, oldest first.
//! *   **`GET /by-slug/{slug}`**: one property or JSON `null`. Public, the
//!     guest view starts here.
//! *   **`POST /upsert`**: body `PropertyPayload`. Inserts without `id`,
//!     updates with one. A slug used by another property answers `409`.

use actix_web::web::{get, post, scope};
use actix_web::{web, HttpRequest, HttpResponse, Responder, Scope};
use common::error::GatewayError;
use common::gateway::Gateway;
use common::model::property::Property;
use common::requests::PropertyPayload;
use log::warn;

use super::{connect, error_response, require_session};
use crate::config::Config;
use crate::db::SqliteGateway;
use crate::sessions::SessionState;

const API_PATH: &str = "/api/properties";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/by-slug/{slug}", get().to(by_slug))
        .route("/upsert", post().to(upsert))
}

pub async fn list(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
) -> impl Responder {
    match list_properties(&req, &config, &sessions).await {
        Ok(properties) => HttpResponse::Ok().json(properties),
        Err(e) => error_response(&e),
    }
}

async fn list_properties(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionState,
) -> Result<Vec<Property>, GatewayError> {
    let session = require_session(req, sessions).await?;
    let conn = connect(config)?;
    let gateway = SqliteGateway::new(&conn, Some(&session.user_id));
    gateway.list_properties().await
}

pub async fn by_slug(slug: web::Path<String>, config: web::Data<Config>) -> impl Responder {
    match find_by_slug(&config, &slug).await {
        Ok(property) => HttpResponse::Ok().json(property),
        Err(e) => error_response(&e),
    }
}

async fn find_by_slug(config: &Config, slug: &str) -> Result<Option<Property>, GatewayError> {
    let conn = connect(config)?;
    let gateway = SqliteGateway::new(&conn, None);
    gateway.find_property_by_slug(slug).await
}

pub async fn upsert(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
    payload: web::Json<PropertyPayload>,
) -> impl Responder {
    match upsert_property(&req, &config, &sessions, &payload).await {
        Ok(property) => HttpResponse::Ok().json(property),
        Err(e) => {
            warn!("property upsert for `{}` failed: {}", payload.slug, e);
            error_response(&e)
        }
    }
}

async fn upsert_property(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionState,
    payload: &PropertyPayload,
) -> Result<Property, GatewayError> {
    let session = require_session(req, sessions).await?;
    let conn = connect(config)?;
    let gateway = SqliteGateway::new(&conn, Some(&session.user_id));
    gateway.upsert_property(payload).await
}
