//! Screens. Each one is a Yew `Component` mounted by `App` for a single
//! router `Screen`.

pub mod dashboard;
pub mod editor;
pub mod guest;
pub mod landing;
pub mod login;
