//! Shared model and client logic for the WelcomeTo guide editor.
//!
//! Both the `backend` and the `frontend` crates depend on this crate. It owns
//! everything that is independent of where it runs: the record types, the
//! section template and its merge engine, the path router, the save
//! orchestration and the gateway traits the two sides implement.

pub mod error;
pub mod gateway;
pub mod guide;
pub mod model;
pub mod reorder;
pub mod requests;
pub mod router;
pub mod save;
pub mod session;
pub mod template;

#[cfg(test)]
pub(crate) mod mock;
