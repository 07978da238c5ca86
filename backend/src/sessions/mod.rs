//! Host sign-in and bearer-token sessions.

pub mod state;

use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;

pub use state::{LoginError, SessionState};

/// The token of an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
