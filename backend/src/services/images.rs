//! # Section Image Service
//!
//! *   **`POST /list`**: body `ListImagesRequest`; images of those sections.
//!     Public.
//! *   **`POST /delete`**: body `DeleteImagesRequest`; drops the listed URLs
//!     from one section. The files themselves stay in storage.
//! *   **`POST /upsert`**: body `Vec<ImagePayload>`; insert or update keyed
//!     on `(section_id, image_url)`.

use actix_web::web::{post, scope};
use actix_web::{web, HttpRequest, HttpResponse, Responder, Scope};
use common::error::GatewayError;
use common::gateway::Gateway;
use common::model::image::ImageRow;
use common::requests::{DeleteImagesRequest, ImagePayload, ListImagesRequest};
use log::warn;

use super::{connect, error_response, require_session};
use crate::config::Config;
use crate::db::SqliteGateway;
use crate::sessions::SessionState;

const API_PATH: &str = "/api/images";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/list", post().to(list))
        .route("/delete", post().to(delete))
        .route("/upsert", post().to(upsert))
}

pub async fn list(config: web::Data<Config>, payload: web::Json<ListImagesRequest>) -> impl Responder {
    match list_images(&config, &payload.section_ids).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => error_response(&e),
    }
}

async fn list_images(config: &Config, section_ids: &[String]) -> Result<Vec<ImageRow>, GatewayError> {
    let conn = connect(config)?;
    let gateway = SqliteGateway::new(&conn, None);
    gateway.list_images(section_ids).await
}

pub async fn delete(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
    payload: web::Json<DeleteImagesRequest>,
) -> impl Responder {
    match delete_images(&req, &config, &sessions, &payload).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => {
            warn!("image delete in section {} failed: {}", payload.section_id, e);
            error_response(&e)
        }
    }
}

async fn delete_images(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionState,
    payload: &DeleteImagesRequest,
) -> Result<(), GatewayError> {
    let session = require_session(req, sessions).await?;
    let conn = connect(config)?;
    let gateway = SqliteGateway::new(&conn, Some(&session.user_id));
    gateway.delete_images(&payload.section_id, &payload.image_urls).await
}

pub async fn upsert(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
    payload: web::Json<Vec<ImagePayload>>,
) -> impl Responder {
    match upsert_images(&req, &config, &sessions, &payload).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => {
            warn!("image upsert failed: {}", e);
            error_response(&e)
        }
    }
}

async fn upsert_images(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionState,
    payload: &[ImagePayload],
) -> Result<(), GatewayError> {
    let session = require_session(req, sessions).await?;
    let conn = connect(config)?;
    let gateway = SqliteGateway::new(&conn, Some(&session.user_id));
    gateway.upsert_images(payload).await
}
