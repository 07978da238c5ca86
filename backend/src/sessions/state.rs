//! Shared table of signed-in hosts.
//!
//! `SessionState` is created in `main.rs` and handed to every handler as
//! `web::Data`. Tokens live in memory only, so restarting the server signs
//! everybody out; the client then falls back to the login screen.

use std::{collections::HashMap, sync::Arc};

use common::session::Session;
use log::{info, warn};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::HostAccount;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("no host accounts are configured on this server (set WELCOMETO_HOSTS)")]
    NoHosts,
    #[error("invalid email or password")]
    InvalidCredentials,
}

#[derive(Clone)]
pub struct SessionState {
    /// Active sessions keyed by bearer token.
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
    hosts: Arc<Vec<HostAccount>>,
}

/// Stable owner id for a host, so properties survive a restart.
pub fn owner_id_for(email: &str) -> String {
    format!("{:x}", md5::compute(email.trim().to_lowercase()))
}

impl SessionState {
    pub fn new(hosts: Vec<HostAccount>) -> Self {
        if hosts.is_empty() {
            warn!("no host accounts configured, sign-in is disabled");
        }
        SessionState {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            hosts: Arc::new(hosts),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, LoginError> {
        if self.hosts.is_empty() {
            return Err(LoginError::NoHosts);
        }
        let email = email.trim().to_lowercase();
        let known = self
            .hosts
            .iter()
            .any(|host| host.email == email && host.password == password);
        if !known {
            warn!("rejected sign-in for {}", email);
            return Err(LoginError::InvalidCredentials);
        }

        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: owner_id_for(&email),
            email,
        };
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        info!("host {} signed in", session.email);
        Ok(session)
    }

    pub async fn lookup(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Returns whether the token was active.
    pub async fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        if let Some(session) = &removed {
            info!("host {} signed out", session.email);
        }
        removed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SessionState {
        SessionState::new(vec![HostAccount {
            email: "host@example.com".into(),
            password: "secret".into(),
        }])
    }

    #[actix_web::test]
    async fn login_lookup_logout() {
        let state = state();
        let session = state.login(" Host@Example.com ", "secret").await.unwrap();
        assert_eq!(session.email, "host@example.com");
        assert_eq!(session.user_id, owner_id_for("host@example.com"));

        assert_eq!(state.lookup(&session.token).await, Some(session.clone()));
        assert!(state.logout(&session.token).await);
        assert!(!state.logout(&session.token).await);
        assert_eq!(state.lookup(&session.token).await, None);
    }

    #[actix_web::test]
    async fn rejects_bad_credentials() {
        assert_eq!(
            state().login("host@example.com", "wrong").await,
            Err(LoginError::InvalidCredentials)
        );
        assert_eq!(
            SessionState::new(vec![]).login("a@b.c", "x").await,
            Err(LoginError::NoHosts)
        );
    }

    #[test]
    fn owner_id_ignores_case() {
        assert_eq!(owner_id_for("A@B.C"), owner_id_for("a@b.c"));
    }
}
