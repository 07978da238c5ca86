//! # Local Favourites Service
//!
//! *   **`GET /{property_id}`**: favourites in display order. Public.
//! *   **`POST /delete`**: body `DeleteFavouritesRequest`; removes all of a
//!     property's favourites.
//! *   **`POST /insert`**: body `InsertFavouritesRequest`.

use actix_web::web::{get, post, scope};
use actix_web::{web, HttpRequest, HttpResponse, Responder, Scope};
use common::error::GatewayError;
use common::gateway::Gateway;
use common::model::favourite::FavouriteRow;
use common::requests::{DeleteFavouritesRequest, InsertFavouritesRequest};
use log::warn;

use super::{connect, error_response, require_session};
use crate::config::Config;
use crate::db::SqliteGateway;
use crate::sessions::SessionState;

const API_PATH: &str = "/api/favourites";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/delete", post().to(delete))
        .route("/insert", post().to(insert))
        .route("/{property_id}", get().to(list))
}

pub async fn list(property_id: web::Path<String>, config: web::Data<Config>) -> impl Responder {
    match list_favourites(&config, &property_id).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => error_response(&e),
    }
}

async fn list_favourites(config: &Config, property_id: &str) -> Result<Vec<FavouriteRow>, GatewayError> {
    let conn = connect(config)?;
    let gateway = SqliteGateway::new(&conn, None);
    gateway.list_favourites(property_id).await
}

pub async fn delete(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
    payload: web::Json<DeleteFavouritesRequest>,
) -> impl Responder {
    match delete_favourites(&req, &config, &sessions, &payload).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => {
            warn!("favourites delete for {} failed: {}", payload.property_id, e);
            error_response(&e)
        }
    }
}

async fn delete_favourites(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionState,
    payload: &DeleteFavouritesRequest,
) -> Result<(), GatewayError> {
    let session = require_session(req, sessions).await?;
    let conn = connect(config)?;
    let gateway = SqliteGateway::new(&conn, Some(&session.user_id));
    gateway.delete_favourites(&payload.property_id).await
}

pub async fn insert(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
    payload: web::Json<InsertFavouritesRequest>,
) -> impl Responder {
    match insert_favourites(&req, &config, &sessions, &payload).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => {
            warn!("favourites insert failed: {}", e);
            error_response(&e)
        }
    }
}

async fn insert_favourites(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionState,
    payload: &InsertFavouritesRequest,
) -> Result<(), GatewayError> {
    let session = require_session(req, sessions).await?;
    let conn = connect(config)?;
    let gateway = SqliteGateway::new(&conn, Some(&session.user_id));
    gateway.insert_favourites(&payload.favourites).await
}
