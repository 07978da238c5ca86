use async_trait::async_trait;
use common::error::GatewayError;
use common::requests::LoginRequest;
use common::session::{Session, SessionStore};
use gloo_console::log;
use gloo_net::http::Request;
use web_sys::Storage;

use super::http::{error_from, read_json, transport_error, with_bearer};

const TOKEN_KEY: &str = "welcometo.session_token";

/// Session store backed by the backend's `/api/auth` endpoints. The token
/// survives reloads in `localStorage`.
pub struct HttpSessionStore {
    base: String,
}

impl HttpSessionStore {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok()?
}

fn stored_token() -> Option<String> {
    local_storage()?.get_item(TOKEN_KEY).ok()?
}

fn store_token(token: Option<&str>) {
    let Some(storage) = local_storage() else {
        return;
    };
    let _ = match token {
        Some(token) => storage.set_item(TOKEN_KEY, token),
        None => storage.remove_item(TOKEN_KEY),
    };
}

#[async_trait(?Send)]
impl SessionStore for HttpSessionStore {
    async fn current_session(&self) -> Result<Option<Session>, GatewayError> {
        let Some(token) = stored_token() else {
            return Ok(None);
        };
        let response = with_bearer(Request::get(&self.url("/api/auth/session")), Some(token.as_str()))
            .send()
            .await
            .map_err(transport_error)?;
        match read_json::<Session>(response).await {
            Ok(session) => Ok(Some(session)),
            Err(GatewayError::Unauthorized) => {
                log!("stored session expired");
                store_token(None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = Request::post(&self.url("/api/auth/login"))
            .json(&body)
            .map_err(transport_error)?
            .send()
            .await
            .map_err(transport_error)?;
        let session: Session = read_json(response).await?;
        store_token(Some(session.token.as_str()));
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), GatewayError> {
        store_token(None);
        let response = with_bearer(Request::post(&self.url("/api/auth/logout")), Some(session.token.as_str()))
            .send()
            .await
            .map_err(transport_error)?;
        if response.ok() {
            Ok(())
        } else {
            Err(error_from(response).await)
        }
    }
}
