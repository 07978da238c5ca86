//! # Guide Save Service
//!
//! `POST /api/guides/save` takes a whole `GuideWrite` and runs the same save
//! sequence the client would run call by call, but inside one SQLite
//! transaction. A failure at any step rolls back everything, so a guide is
//! never left half saved. The answer is the `SaveReport`; a failure answers
//! the status of the underlying gateway error with a body naming the step.

use actix_web::web::{post, scope};
use actix_web::{web, HttpRequest, HttpResponse, Responder, Scope};
use common::error::{GatewayError, SaveError};
use common::requests::GuideWrite;
use common::save::{save_guide, SaveReport};
use log::{info, warn};
use thiserror::Error;

use super::{connect, error_response, require_session};
use crate::config::Config;
use crate::db::gateway::db_error;
use crate::db::SqliteGateway;
use crate::sessions::SessionState;

const API_PATH: &str = "/api/guides";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/save", post().to(process))
}

#[derive(Debug, Error)]
enum GuideSaveError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

impl GuideSaveError {
    fn response(&self) -> HttpResponse {
        match self {
            GuideSaveError::Gateway(e) => error_response(e),
            GuideSaveError::Save(e) => {
                let status = error_response(&e.source).status();
                HttpResponse::build(status)
                    .content_type("text/plain; charset=utf-8")
                    .body(e.to_string())
            }
        }
    }
}

pub async fn process(
    req: HttpRequest,
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
    payload: web::Json<GuideWrite>,
) -> impl Responder {
    match save_in_transaction(&req, &config, &sessions, &payload).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            warn!("guide save for `{}` rolled back: {}", payload.property.slug, e);
            e.response()
        }
    }
}

async fn save_in_transaction(
    req: &HttpRequest,
    config: &Config,
    sessions: &SessionState,
    guide: &GuideWrite,
) -> Result<SaveReport, GuideSaveError> {
    let session = require_session(req, sessions).await?;
    let mut conn = connect(config)?;
    let tx = conn.transaction().map_err(db_error)?;

    let report = {
        let gateway = SqliteGateway::new(&tx, Some(&session.user_id));
        save_guide(&gateway, guide).await?
    };

    tx.commit().map_err(db_error)?;
    info!(
        "guide `{}` saved atomically ({} sections)",
        report.property.slug,
        report.section_ids.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use common::model::favourite::{Favourite, FavouriteRow};
    use common::model::image::ImageRow;
    use common::model::property::Property;
    use common::requests::{GuideWrite, ImageWrite, PropertyPayload, SectionWrite};
    use common::save::SaveReport;
    use tempfile::TempDir;

    use crate::services::testing::*;
    use crate::sessions::SessionState;

    fn guide(section_id: Option<&str>) -> GuideWrite {
        GuideWrite {
            property: PropertyPayload {
                id: None,
                title: "Acme Lodge".into(),
                slug: "acmelodge".into(),
                welcome_message: "Welcome!".into(),
                hero_image_url: String::new(),
            },
            sections: vec![SectionWrite {
                id: section_id.map(str::to_string),
                title: "Welcome".into(),
                icon_name: "home".into(),
                content: "Make yourself at home.".into(),
                display_order: 0,
                images: vec![ImageWrite {
                    image_url: "/uploads/acme/door.png".into(),
                    caption: "Front door".into(),
                    display_order: 0,
                }],
            }],
            favourites: vec![Favourite {
                name: "Beach".into(),
                ..Default::default()
            }],
        }
    }

    #[actix_web::test]
    async fn saves_everything_and_reads_back_over_http() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let sessions = SessionState::new(config.hosts.clone());
        let token = sign_in(&sessions).await;
        let app = init_service(app(&config, &sessions)).await;

        let req = TestRequest::post()
            .uri("/api/guides/save")
            .insert_header(bearer(&token))
            .set_json(guide(None))
            .to_request();
        let response = call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        let report: SaveReport = read_body_json(response).await;
        assert_eq!(report.section_ids.len(), 1);
        assert_eq!(report.images_written, 1);
        assert_eq!(report.favourites_written, 1);

        let req = TestRequest::post()
            .uri("/api/images/list")
            .set_json(serde_json::json!({ "section_ids": report.section_ids }))
            .to_request();
        let images: Vec<ImageRow> = read_body_json(call_service(&app, req).await).await;
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].caption, "Front door");

        let req = TestRequest::get()
            .uri(&format!("/api/favourites/{}", report.property.id))
            .to_request();
        let favourites: Vec<FavouriteRow> = read_body_json(call_service(&app, req).await).await;
        assert_eq!(favourites.len(), 1);
        assert_eq!(favourites[0].favourite.name, "Beach");
    }

    #[actix_web::test]
    async fn a_failing_step_rolls_back_the_whole_guide() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let sessions = SessionState::new(config.hosts.clone());
        let token = sign_in(&sessions).await;
        let app = init_service(app(&config, &sessions)).await;

        let req = TestRequest::post()
            .uri("/api/guides/save")
            .insert_header(bearer(&token))
            .set_json(guide(Some("no-such-section")))
            .to_request();
        let response = call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = read_body(response).await;
        assert!(String::from_utf8_lossy(&body).contains("saving a section (Welcome)"));

        let req = TestRequest::get().uri("/api/properties/by-slug/acmelodge").to_request();
        let property: Option<Property> = read_body_json(call_service(&app, req).await).await;
        assert_eq!(property, None);
    }

    #[actix_web::test]
    async fn anonymous_saves_are_rejected() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let sessions = SessionState::new(config.hosts.clone());
        let app = init_service(app(&config, &sessions)).await;

        let req = TestRequest::post()
            .uri("/api/guides/save")
            .set_json(guide(None))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
