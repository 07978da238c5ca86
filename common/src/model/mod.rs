//! Records exchanged with the data gateway and the editor view model built
//! from them.

pub mod favourite;
pub mod guide;
pub mod image;
pub mod property;
pub mod section;
