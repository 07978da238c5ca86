//! Build-time configuration.
//!
//! - `WELCOMETO_API_URL`: base URL of the backend. An empty value means the
//!   page is served by the backend itself and requests stay same-origin.
//!   When the variable is not set at all the app runs without a backend:
//!   screens render, every data operation fails with "backend not
//!   configured".
//! - `WELCOMETO_ATOMIC_SAVE`: `1` or `true` sends a whole guide to the
//!   transactional save endpoint instead of saving it call by call.

pub fn api_base() -> Option<&'static str> {
    option_env!("WELCOMETO_API_URL").map(|base| base.trim().trim_end_matches('/'))
}

pub fn atomic_save() -> bool {
    matches!(
        option_env!("WELCOMETO_ATOMIC_SAVE").map(str::trim),
        Some("1") | Some("true")
    )
}
