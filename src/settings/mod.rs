//! Runtime settings
//!
//! Hot-reloaded settings consumed on every request: ignore rules and the
//! file name codec marker.

mod store;

pub use store::{ConfigStore, MediaSettings};
