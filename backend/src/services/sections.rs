//! # Section Service
//!
//! *   **`GET /{property_id}`**: sections ordered by display order. Public.
//! *   **`POST /upsert`**: body `SectionPayload`; answers the stored row.
//! *   **`POST /order`**: body `UpdateSectionOrdersRequest`; rewrites the
//!     display order of the listed sections.

use actix_web::web::{get, post, scope};
use actix_web::{web, HttpRequest, HttpResponse, Responder, Scope};
use common::error::GatewayError;
use common::gateway::Gateway;
use common::model::section::SectionRow;
use common::requests::{SectionPayload, UpdateSectionOrdersRequest};
use log::warn;

use super::{connect, error_response, require_session};
use crate::config::Config;
use crate::db::SqliteGateway;
use crate::sessions::SessionState;

const API_PATH: &str = "/api/sections";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upsert", post().to(upsert))
        .route("/order", post().to(order))
        .route("/{property_id}", get().to(list))
}

pub async fn list(property_id: web::Path<String>, config: web::Data<Config>) -> impl Responder {
    match list_sections(&config, &property_id).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => error_response(&e),
    }
}

async fn list_sections(config: &Config, property_id: &str) -> Result<Vec<SectionRow>, GatewayError> {
    let conn = connect(config)?;
    let gateway = SqliteGateway::new(&conn, None);
    gateway.list_sections(property_id).await
}

pub async fn upsert(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
    payload: web::Json<SectionPayload>,
) -> impl Responder {
    match upsert_section(&req, &config, &sessions, &payload).await {
        Ok(row) => HttpResponse::Ok().json(row),
        Err(e) => {
            warn!("section upsert `{}` failed: {}", payload.title, e);
            error_response(&e)
        }
    }
}

async fn upsert_section(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionState,
    payload: &SectionPayload,
) -> Result<SectionRow, GatewayError> {
    let session = require_session(req, sessions).await?;
    let conn = connect(config)?;
    let gateway = SqliteGateway::new(&conn, Some(&session.user_id));
    gateway.upsert_section(payload).await
}

pub async fn order(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
    payload: web::Json<UpdateSectionOrdersRequest>,
) -> impl Responder {
    match update_orders(&req, &config, &sessions, &payload).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => {
            warn!("reorder of property {} failed: {}", payload.property_id, e);
            error_response(&e)
        }
    }
}

async fn update_orders(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionState,
    payload: &UpdateSectionOrdersRequest,
) -> Result<(), GatewayError> {
    let session = require_session(req, sessions).await?;
    let mut conn = connect(config)?;
    // All or nothing, so a half-applied order never reaches a guest.
    let tx = conn.transaction().map_err(crate::db::gateway::db_error)?;
    SqliteGateway::new(&tx, Some(&session.user_id))
        .update_section_orders(&payload.property_id, &payload.orders)
        .await?;
    tx.commit().map_err(crate::db::gateway::db_error)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use common::model::property::Property;
    use common::model::section::SectionRow;
    use common::requests::{PropertyPayload, SectionOrder, SectionPayload, UpdateSectionOrdersRequest};
    use tempfile::TempDir;

    use crate::services::testing::*;
    use crate::sessions::SessionState;

    #[actix_web::test]
    async fn upsert_list_and_reorder() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let sessions = SessionState::new(config.hosts.clone());
        let token = sign_in(&sessions).await;
        let app = init_service(app(&config, &sessions)).await;

        let req = TestRequest::post()
            .uri("/api/properties/upsert")
            .insert_header(bearer(&token))
            .set_json(PropertyPayload {
                id: None,
                title: "Acme".into(),
                slug: "acme".into(),
                welcome_message: String::new(),
                hero_image_url: String::new(),
            })
            .to_request();
        let property: Property = read_body_json(call_service(&app, req).await).await;

        let mut ids = Vec::new();
        for (order, title) in ["Welcome", "Laundry"].into_iter().enumerate() {
            let req = TestRequest::post()
                .uri("/api/sections/upsert")
                .insert_header(bearer(&token))
                .set_json(SectionPayload {
                    id: None,
                    property_id: property.id.clone(),
                    title: title.into(),
                    icon_name: String::new(),
                    content: String::new(),
                    display_order: order as i64,
                })
                .to_request();
            let row: SectionRow = read_body_json(call_service(&app, req).await).await;
            ids.push(row.id);
        }

        let req = TestRequest::post()
            .uri("/api/sections/order")
            .insert_header(bearer(&token))
            .set_json(UpdateSectionOrdersRequest {
                property_id: property.id.clone(),
                orders: vec![
                    SectionOrder { id: ids[1].clone(), display_order: 0 },
                    SectionOrder { id: ids[0].clone(), display_order: 1 },
                ],
            })
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

        let req = TestRequest::get()
            .uri(&format!("/api/sections/{}", property.id))
            .to_request();
        let rows: Vec<SectionRow> = read_body_json(call_service(&app, req).await).await;
        assert_eq!(
            rows.into_iter().map(|r| r.title).collect::<Vec<_>>(),
            vec!["Laundry", "Welcome"]
        );
    }

    #[actix_web::test]
    async fn unknown_property_is_not_found() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let sessions = SessionState::new(config.hosts.clone());
        let token = sign_in(&sessions).await;
        let app = init_service(app(&config, &sessions)).await;

        let req = TestRequest::post()
            .uri("/api/sections/upsert")
            .insert_header(bearer(&token))
            .set_json(SectionPayload {
                id: None,
                property_id: "missing".into(),
                title: "Welcome".into(),
                icon_name: String::new(),
                content: String::new(),
                display_order: 0,
            })
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
