//! The backend as seen from the browser.
//!
//! [`Services`] bundles the three handles every screen needs. It is rebuilt
//! whenever the session changes so the gateway always carries the current
//! bearer token. The [`SessionWatch`] outlives those rebuilds and reports a
//! token the backend no longer accepts.

pub mod http;
pub mod session;

use std::rc::Rc;

use common::gateway::{Gateway, ObjectStorage, Unconfigured};
use common::requests::GuideWrite;
use common::save::{save_guide, SaveReport};
use common::session::{Session, SessionStore, SessionWatch};

use crate::config;
use http::HttpGateway;
use session::HttpSessionStore;

#[derive(Clone)]
pub struct Services {
    pub gateway: Rc<dyn Gateway>,
    pub storage: Rc<dyn ObjectStorage>,
    pub sessions: Rc<dyn SessionStore>,
    http: Option<Rc<HttpGateway>>,
}

impl Services {
    pub fn for_session(session: Option<&Session>, watch: &SessionWatch) -> Self {
        match config::api_base() {
            Some(base) => {
                let token = session.map(|s| s.token.clone());
                let http = Rc::new(HttpGateway::new(base, token, watch.clone()));
                Self {
                    gateway: http.clone(),
                    storage: http.clone(),
                    sessions: Rc::new(HttpSessionStore::new(base)),
                    http: Some(http),
                }
            }
            None => {
                let unconfigured = Rc::new(Unconfigured);
                Self {
                    gateway: unconfigured.clone(),
                    storage: unconfigured.clone(),
                    sessions: unconfigured,
                    http: None,
                }
            }
        }
    }

    /// Saves an edited guide, either in one backend transaction or as a
    /// sequence of gateway calls. The error text names the failed step.
    pub async fn save(&self, guide: &GuideWrite) -> Result<SaveReport, String> {
        match &self.http {
            Some(http) if config::atomic_save() => http.save_guide_atomic(guide).await,
            _ => save_guide(self.gateway.as_ref(), guide)
                .await
                .map_err(|e| e.to_string()),
        }
    }
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.gateway, &other.gateway)
    }
}
