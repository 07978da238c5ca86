//! # Image Upload Service
//!
//! `POST /api/storage/upload` takes `multipart/form-data` with two parts:
//!
//! - `path`: optional target path such as `acme/hero.png`. Without it the
//!   file is named after the MD5 of its bytes.
//! - `file`: the image. Only `image/*` content is accepted.
//!
//! The answer is an `UploadResponse` whose `url` points under `/uploads/`.
//! Sign-in is required.

use actix_multipart::{Multipart, MultipartError};
use actix_web::web::{post, scope};
use actix_web::{web, HttpRequest, HttpResponse, Responder, Scope};
use common::error::GatewayError;
use common::gateway::ObjectStorage;
use common::requests::UploadResponse;
use futures_util::StreamExt;
use log::warn;
use md5::Context;
use thiserror::Error;

use super::{error_response, require_session};
use crate::sessions::SessionState;
use crate::storage::{content_addressed_path, LocalStorage};

const API_PATH: &str = "/api/storage";

/// Largest accepted image.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/upload", post().to(process))
}

#[derive(Debug, Error)]
enum UploadError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("{0}")]
    Invalid(String),
}

pub async fn process(
    req: HttpRequest,
    sessions: web::Data<SessionState>,
    storage: web::Data<LocalStorage>,
    payload: Multipart,
) -> impl Responder {
    match upload_image(&req, &sessions, &storage, payload).await {
        Ok(url) => HttpResponse::Ok().json(UploadResponse { url }),
        Err(UploadError::Gateway(e)) => {
            warn!("upload failed: {}", e);
            error_response(&e)
        }
        Err(e) => HttpResponse::BadRequest().body(format!("Error: {}", e)),
    }
}

async fn upload_image(
    req: &HttpRequest,
    sessions: &SessionState,
    storage: &LocalStorage,
    mut payload: Multipart,
) -> Result<String, UploadError> {
    require_session(req, sessions).await?;

    let mut path: Option<String> = None;
    let mut file: Option<(Vec<u8>, String, String)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match name.as_deref() {
            Some("path") => {
                let mut raw = Vec::new();
                while let Some(chunk) = field.next().await {
                    raw.extend_from_slice(&chunk?);
                }
                let text = String::from_utf8(raw)
                    .map_err(|_| UploadError::Invalid("path is not valid UTF-8".into()))?;
                let text = text.trim();
                if !text.is_empty() {
                    path = Some(text.to_string());
                }
            }
            Some("file") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&filename)
                            .first_or_octet_stream()
                            .essence_str()
                            .to_string()
                    });
                if !content_type.starts_with("image/") {
                    return Err(UploadError::Invalid(format!(
                        "only images can be uploaded, got {}",
                        content_type
                    )));
                }

                let mut hasher = Context::new();
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk?;
                    if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                        return Err(UploadError::Invalid("image is larger than 10 MB".into()));
                    }
                    hasher.consume(&chunk);
                    bytes.extend_from_slice(&chunk);
                }
                let digest = format!("{:x}", hasher.finalize());
                file = Some((bytes, content_type, digest));
            }
            _ => {
                // Drain unknown parts so the stream can advance.
                while let Some(chunk) = field.next().await {
                    chunk?;
                }
            }
        }
    }

    let Some((bytes, content_type, digest)) = file else {
        return Err(UploadError::Invalid("missing `file` part".into()));
    };
    if bytes.is_empty() {
        return Err(UploadError::Invalid("uploaded file is empty".into()));
    }

    let path = path.unwrap_or_else(|| content_addressed_path(&digest, &content_type));
    if !storage.is_valid_path(&path) {
        return Err(UploadError::Invalid(format!("invalid upload path `{}`", path)));
    }
    Ok(storage.upload(&path, bytes, &content_type).await?)
}
