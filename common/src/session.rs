use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// The signed-in host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub email: String,
}

/// Holds the current authenticated identity.
///
/// Sign in and sign out return the new state to the caller. A session that
/// the backend stops accepting mid-use is reported through [`SessionWatch`].
#[async_trait(?Send)]
pub trait SessionStore {
    /// Restores the persisted session, if it is still valid.
    async fn current_session(&self) -> Result<Option<Session>, GatewayError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError>;

    async fn sign_out(&self, session: &Session) -> Result<(), GatewayError>;
}

type Listener = Rc<dyn Fn()>;

/// Tells subscribers that the backend rejected the session's token.
///
/// Clones share one listener list, so the gateway that sees the `401` and
/// the component that owns the session can hold separate handles.
#[derive(Clone, Default)]
pub struct SessionWatch {
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl SessionWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn expired(&self) {
        warn!("session rejected by the backend");
        // Listeners may subscribe again while being called.
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }

    /// Passes `result` through, firing [`SessionWatch::expired`] first when it
    /// is an authorization failure.
    pub fn observe<T>(&self, result: Result<T, GatewayError>) -> Result<T, GatewayError> {
        if matches!(result, Err(GatewayError::Unauthorized)) {
            self.expired();
        }
        result
    }
}
